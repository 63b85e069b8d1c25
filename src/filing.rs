// Filing-level pipeline: linkbases, instance, then tables
use crate::diagnostics::Diagnostics;
use crate::instance::{extract_instance_file, InstanceSource};
use crate::linkbase::extract_linkbases;
use crate::table::Table;
use crate::{Error, ExtractOptions, Result};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// The five documents of a filing. Empty paths count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    pub instance: Option<PathBuf>,
    pub inline_html: Option<PathBuf>,
    pub calculation: Option<PathBuf>,
    pub definition: Option<PathBuf>,
    pub label: Option<PathBuf>,
}

fn present<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    (!path.as_os_str().is_empty()).then(|| path.to_path_buf())
}

// Fields are public and deserializable, so `Some("")` can still reach here.
fn given(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|path| !path.as_os_str().is_empty())
}

impl Sources {
    /// Sources reading facts from an inline XBRL rendition
    pub fn new<P: AsRef<Path>>(inline_html: P) -> Self {
        Self {
            inline_html: present(inline_html),
            ..Self::default()
        }
    }

    /// All five locations at once; pass `""` for a missing instance document.
    pub fn from_paths<P: AsRef<Path>>(instance: P, inline_html: P, calculation: P, definition: P, label: P) -> Self {
        Self {
            instance: present(instance),
            inline_html: present(inline_html),
            calculation: present(calculation),
            definition: present(definition),
            label: present(label),
        }
    }

    pub fn with_instance<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.instance = present(path);
        self
    }

    pub fn with_calculation<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.calculation = present(path);
        self
    }

    pub fn with_definition<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.definition = present(path);
        self
    }

    pub fn with_label<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.label = present(path);
        self
    }

    /// The document facts are read from. A supplied instance document wins
    /// outright; the HTML rendition is never consulted alongside it.
    pub fn fact_source(&self) -> Result<(&Path, InstanceSource)> {
        match (given(&self.instance), given(&self.inline_html)) {
            (Some(path), _) => Ok((path, InstanceSource::Instance)),
            (None, Some(path)) => Ok((path, InstanceSource::InlineHtml)),
            (None, None) => Err(Error::MissingSource(
                "an instance document or an inline XBRL document is required",
            )),
        }
    }
}

/// The seven tables of one extraction
#[derive(Debug, Clone)]
pub struct Tables {
    calculations: Table,
    definitions: Table,
    labels: Table,
    non_numeric_facts: Table,
    numeric_facts: Table,
    contexts: Table,
    units: Table,
    source: InstanceSource,
    diagnostics: Diagnostics,
}

impl Tables {
    pub fn calculations(&self) -> &Table {
        &self.calculations
    }

    pub fn definitions(&self) -> &Table {
        &self.definitions
    }

    pub fn labels(&self) -> &Table {
        &self.labels
    }

    pub fn non_numeric_facts(&self) -> &Table {
        &self.non_numeric_facts
    }

    pub fn numeric_facts(&self) -> &Table {
        &self.numeric_facts
    }

    pub fn contexts(&self) -> &Table {
        &self.contexts
    }

    pub fn units(&self) -> &Table {
        &self.units
    }

    /// Which document the facts, contexts and units came from
    pub fn source(&self) -> InstanceSource {
        self.source
    }

    /// Elements the instance walk skipped
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// All seven tables in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        [
            &self.calculations,
            &self.definitions,
            &self.labels,
            &self.non_numeric_facts,
            &self.numeric_facts,
            &self.contexts,
            &self.units,
        ]
        .into_iter()
    }
}

/// Run the whole pipeline. Any document that cannot be read or parsed
/// fails the extraction.
pub fn extract(sources: &Sources, options: &ExtractOptions) -> Result<Tables> {
    let linkbases = extract_linkbases(
        given(&sources.calculation),
        given(&sources.definition),
        given(&sources.label),
        options,
    )?;

    let (path, source) = sources.fact_source()?;
    let instance = extract_instance_file(path, source, options)?;

    let tables = Tables {
        calculations: Table::from_records("calculations", &linkbases.calculations),
        definitions: Table::from_records("definitions", &linkbases.definitions),
        labels: Table::from_records("labels", &linkbases.labels),
        non_numeric_facts: Table::from_records("non_numeric_facts", &instance.non_numeric),
        numeric_facts: Table::from_records("numeric_facts", &instance.numeric),
        contexts: Table::from_records("contexts", &instance.contexts),
        units: Table::from_records("units", &instance.units),
        source,
        diagnostics: instance.diagnostics,
    };

    tracing::debug!(
        source = ?tables.source,
        skipped = tables.diagnostics.skipped(),
        "filing extracted"
    );
    Ok(tables)
}

/// A filing extracted once, on construction, and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Filing {
    tables: Tables,
}

impl Filing {
    pub fn open(sources: &Sources) -> Result<Self> {
        Self::with_options(sources, &ExtractOptions::default())
    }

    pub fn with_options(sources: &Sources, options: &ExtractOptions) -> Result<Self> {
        Ok(Self {
            tables: extract(sources, options)?,
        })
    }

    pub fn into_tables(self) -> Tables {
        self.tables
    }
}

impl Deref for Filing {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.tables
    }
}
