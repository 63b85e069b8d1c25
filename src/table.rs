//! Column-oriented tables assembled from extracted records.
//!
//! Columns are the union of every field name seen across the records, in
//! order of first appearance. A record without a given field leaves a null
//! cell in that column. Each column's type is inferred from its non-null
//! cells once all rows are in.

use crate::model::{Record, Value};
use crate::Result;
use ahash::AHashMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

pub type Cell = Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// Every cell is null
    Null,
    Text,
    Dimensions,
    Measures,
    Mixed,
}

impl ColumnType {
    fn of(cell: &Cell) -> Option<Self> {
        match cell {
            Value::Null => None,
            Value::Text(_) => Some(ColumnType::Text),
            Value::Dimensions(_) => Some(ColumnType::Dimensions),
            Value::Measures(_) => Some(ColumnType::Measures),
        }
    }

    fn infer(cells: &[Cell]) -> Self {
        let mut types = cells.iter().filter_map(Self::of);
        let Some(first) = types.next() else {
            return ColumnType::Null;
        };
        if types.all(|t| t == first) {
            first
        } else {
            ColumnType::Mixed
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: ColumnType,
    cells: Vec<Cell>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ColumnType {
        self.dtype
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, row: usize) -> Option<&Cell> {
        self.cells.get(row)
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    /// Text cells only; other cells read as `None`.
    pub fn texts(&self) -> impl Iterator<Item = Option<&str>> {
        self.cells.iter().map(Value::as_text)
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    index: AHashMap<String, usize>,
    height: usize,
}

impl Table {
    pub fn from_records<R: Record>(name: impl Into<String>, records: &[R]) -> Self {
        let rows: Vec<Vec<(&str, Value)>> = records.iter().map(Record::fields).collect();
        let height = rows.len();

        // schema inference
        let mut index: AHashMap<String, usize> = AHashMap::new();
        let mut columns: Vec<Column> = Vec::new();
        for (key, _) in rows.iter().flatten() {
            if !index.contains_key(*key) {
                index.insert(key.to_string(), columns.len());
                columns.push(Column {
                    name: key.to_string(),
                    dtype: ColumnType::Null,
                    cells: vec![Value::Null; height],
                });
            }
        }

        for (row, fields) in rows.into_iter().enumerate() {
            for (key, value) in fields {
                if let Some(&col) = index.get(key) {
                    columns[col].cells[row] = value;
                }
            }
        }

        for column in &mut columns {
            column.dtype = ColumnType::infer(&column.cells);
        }

        Self {
            name: name.into(),
            columns,
            index,
            height,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column)?.get(row)
    }

    /// One row as cells aligned with `columns()`.
    pub fn row(&self, row: usize) -> Option<Vec<&Cell>> {
        (row < self.height).then(|| self.columns.iter().map(|c| &c.cells[row]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.height).filter_map(move |row| self.row(row))
    }

    /// Rows as a JSON array of objects, nulls included.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

struct RowRef<'a> {
    table: &'a Table,
    row: usize,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.width()))?;
        for column in &self.table.columns {
            map.serialize_entry(&column.name, &column.cells[self.row])?;
        }
        map.end()
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.height))?;
        for row in 0..self.height {
            seq.serialize_element(&RowRef { table: self, row })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Context, Dimension, LinkArc, Unit};
    use pretty_assertions::assert_eq;

    fn arc(pairs: &[(&str, &str)]) -> LinkArc {
        LinkArc {
            attributes: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_union_of_columns_with_null_fill() {
        let records = vec![
            arc(&[("from", "a"), ("to", "b"), ("weight", "1")]),
            arc(&[("from", "a"), ("to", "c"), ("priority", "2")]),
            arc(&[("order", "3.0")]),
        ];
        let table = Table::from_records("calculations", &records);

        assert_eq!(table.height(), 3);
        assert_eq!(table.column_names(), vec!["from", "to", "weight", "priority", "order"]);
        assert_eq!(table.cell(1, "weight"), Some(&Value::Null));
        assert_eq!(table.cell(1, "priority"), Some(&Value::Text("2".into())));
        assert_eq!(table.column("order").unwrap().null_count(), 2);
        assert_eq!(table.column("to").unwrap().dtype(), ColumnType::Text);
        assert_eq!(table.cell(0, "missing"), None);
    }

    #[test]
    fn test_empty_input_has_no_columns() {
        let table = Table::from_records::<LinkArc>("definitions", &[]);
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
        assert_eq!(table.to_json().unwrap(), "[]");
    }

    #[test]
    fn test_nested_column_types() {
        let contexts = vec![
            Context {
                id: "c1".into(),
                dimensions: vec![Dimension::new("srt:ProductOrServiceAxis", "Widgets")],
                start_date: Some("2023-01-01".into()),
                end_date: Some("2023-12-31".into()),
                ..Context::default()
            },
            Context {
                id: "c2".into(),
                instant: Some("2023-12-31".into()),
                ..Context::default()
            },
        ];
        let table = Table::from_records("contexts", &contexts);

        assert_eq!(
            table.column_names(),
            vec!["id", "dimensions", "instant", "startDate", "endDate"]
        );
        assert_eq!(table.column("dimensions").unwrap().dtype(), ColumnType::Dimensions);
        assert_eq!(table.column("instant").unwrap().null_count(), 1);

        let units = vec![Unit {
            id: "USD".into(),
            measures: vec!["iso4217:USD".into()],
        }];
        let table = Table::from_records("units", &units);
        assert_eq!(table.column("measures").unwrap().dtype(), ColumnType::Measures);
    }

    #[test]
    fn test_json_keeps_column_order_and_nulls() {
        let records = vec![arc(&[("to", "b"), ("from", "a")]), arc(&[("order", "1")])];
        let table = Table::from_records("calculations", &records);

        assert_eq!(
            table.to_json().unwrap(),
            r#"[{"to":"b","from":"a","order":null},{"to":null,"from":null,"order":"1"}]"#
        );
    }

    #[test]
    fn test_rows_align_with_columns() {
        let records = vec![arc(&[("a", "1")]), arc(&[("b", "2")])];
        let table = Table::from_records("t", &records);
        let rows: Vec<_> = table.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec![&Value::Null, &Value::Text("2".into())]);
        assert_eq!(table.row(2), None);
    }
}
