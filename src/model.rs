use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

// ============================================================================
// Extracted XBRL records
// ============================================================================

/// A single field value as it lands in a table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Dimensions(Vec<Dimension>),
    Measures(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Value::Null, Value::Text)
    }
}

/// A record kind that can be laid out as a table row.
///
/// Fields come back in insertion order; that order decides column
/// discovery order when a table is assembled.
pub trait Record {
    fn fields(&self) -> Vec<(&str, Value)>;
}

/// Axis/member pair from an `explicitMember` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub dimension: String,
    pub value: String,
}

impl Dimension {
    pub fn new(dimension: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            value: value.into(),
        }
    }
}

// Linkbase records

/// A `calculationArc` or `definitionArc`, keyed by attribute local name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkArc {
    pub attributes: IndexMap<String, String>,
}

impl LinkArc {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Record for LinkArc {
    fn fields(&self) -> Vec<(&str, Value)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), Value::Text(v.clone())))
            .collect()
    }
}

/// A `label` resource with its trimmed text (null when blank)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub text: Option<String>,
    pub attributes: IndexMap<String, String>,
}

impl Label {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.attributes.is_empty()
    }
}

impl Record for Label {
    fn fields(&self) -> Vec<(&str, Value)> {
        let mut fields = Vec::with_capacity(self.attributes.len() + 1);
        fields.push(("text", Value::from(self.text.clone())));
        fields.extend(
            self.attributes
                .iter()
                .map(|(k, v)| (k.as_str(), Value::Text(v.clone()))),
        );
        fields
    }
}

// Facts

/// Fields a fact record can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactAttr {
    Name,
    ContextRef,
    UnitRef,
    Sign,
    Scale,
    Format,
    Value,
}

impl FactAttr {
    /// Attributes copied from a fact element; `Value` comes from its text.
    pub const RECOGNIZED: [FactAttr; 6] = [
        FactAttr::Name,
        FactAttr::ContextRef,
        FactAttr::UnitRef,
        FactAttr::Sign,
        FactAttr::Scale,
        FactAttr::Format,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactAttr::Name => "name",
            FactAttr::ContextRef => "contextRef",
            FactAttr::UnitRef => "unitRef",
            FactAttr::Sign => "sign",
            FactAttr::Scale => "scale",
            FactAttr::Format => "format",
            FactAttr::Value => "value",
        }
    }

    pub fn from_attribute(local_name: &str) -> Option<Self> {
        Self::RECOGNIZED
            .into_iter()
            .find(|attr| attr.as_str() == local_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactKind {
    Numeric,
    NonNumeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    pub kind: FactKind,
    pub fields: IndexMap<FactAttr, String>,
}

impl Fact {
    pub fn new(kind: FactKind) -> Self {
        Self {
            kind,
            fields: IndexMap::new(),
        }
    }

    pub fn get(&self, attr: FactAttr) -> Option<&str> {
        self.fields.get(&attr).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(FactAttr::Name)
    }

    pub fn value(&self) -> Option<&str> {
        self.get(FactAttr::Value)
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == FactKind::Numeric
    }
}

impl Record for Fact {
    fn fields(&self) -> Vec<(&str, Value)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), Value::Text(v.clone())))
            .collect()
    }
}

// Contexts and units

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Period {
    Instant(String),
    Duration { start: String, end: String },
    Forever,
}

impl Period {
    /// Parsed `(start, end)`; an instant has no start.
    pub fn dates(&self) -> Option<(Option<NaiveDate>, NaiveDate)> {
        match self {
            Period::Instant(date) => Some((None, parse_date(date)?)),
            Period::Duration { start, end } => Some((Some(parse_date(start)?), parse_date(end)?)),
            Period::Forever => None,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // dateTime periods are reported as `2023-09-30T00:00:00`
    let date = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub id: String,
    pub dimensions: Vec<Dimension>,
    pub instant: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl Context {
    /// `None` when only one bound of a duration is present.
    pub fn period(&self) -> Option<Period> {
        match (&self.instant, &self.start_date, &self.end_date) {
            (Some(instant), None, None) => Some(Period::Instant(instant.clone())),
            (None, Some(start), Some(end)) => Some(Period::Duration {
                start: start.clone(),
                end: end.clone(),
            }),
            (None, None, None) => Some(Period::Forever),
            _ => None,
        }
    }

    pub fn is_dimensional(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

impl Record for Context {
    fn fields(&self) -> Vec<(&str, Value)> {
        vec![
            ("id", Value::Text(self.id.clone())),
            ("dimensions", Value::Dimensions(self.dimensions.clone())),
            ("instant", Value::from(self.instant.clone())),
            ("startDate", Value::from(self.start_date.clone())),
            ("endDate", Value::from(self.end_date.clone())),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unit {
    pub id: String,
    pub measures: Vec<String>,
}

impl Unit {
    /// Ratio or product units such as `iso4217:USD / xbrli:shares`
    pub fn is_composite(&self) -> bool {
        self.measures.len() > 1
    }
}

impl Record for Unit {
    fn fields(&self) -> Vec<(&str, Value)> {
        vec![
            ("id", Value::Text(self.id.clone())),
            ("measures", Value::Measures(self.measures.clone())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text_leads_fields() {
        let mut label = Label {
            text: None,
            ..Label::default()
        };
        label.attributes.insert("label".into(), "lab_Revenues".into());

        let fields = label.fields();
        assert_eq!(fields[0], ("text", Value::Null));
        assert_eq!(fields[1], ("label", Value::Text("lab_Revenues".into())));
        assert!(!label.is_empty());
    }

    #[test]
    fn test_context_period_variants() {
        let mut ctx = Context {
            id: "c1".into(),
            instant: Some("2023-09-30".into()),
            ..Context::default()
        };
        let period = ctx.period().unwrap();
        assert_eq!(period, Period::Instant("2023-09-30".into()));
        assert_eq!(
            period.dates(),
            Some((None, NaiveDate::from_ymd_opt(2023, 9, 30).unwrap()))
        );

        ctx.instant = None;
        ctx.start_date = Some("2022-10-01".into());
        assert_eq!(ctx.period(), None);

        ctx.end_date = Some("2023-09-30T00:00:00".into());
        let (start, end) = ctx.period().unwrap().dates().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2022, 10, 1));
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());

        let forever = Context::default();
        assert_eq!(forever.period(), Some(Period::Forever));
    }

    #[test]
    fn test_fact_attr_lookup() {
        assert_eq!(FactAttr::from_attribute("unitRef"), Some(FactAttr::UnitRef));
        assert_eq!(FactAttr::from_attribute("decimals"), None);
        assert_eq!(FactAttr::from_attribute("value"), None);
    }

    #[test]
    fn test_unit_composite() {
        let unit = Unit {
            id: "usdPerShare".into(),
            measures: vec!["iso4217:USD".into(), "xbrli:shares".into()],
        };
        assert!(unit.is_composite());
        assert_eq!(unit.fields()[1].1, Value::Measures(unit.measures.clone()));
    }
}
