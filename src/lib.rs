//! xbrl-tables - Extract XBRL filings into normalized tables
//!
//! Licensed under AGPL-3.0
//!
//! A filing is read from an instance document (or, when none is supplied,
//! from its inline XBRL HTML rendition) plus the calculation, definition
//! and label linkbases. The result is seven column-oriented [`Table`]s:
//! calculations, definitions, labels, non-numeric facts, numeric facts,
//! contexts and units.
//!
//! ```no_run
//! use xbrl_tables::{Filing, Sources};
//!
//! let sources = Sources::new("aapl-20230930.htm")
//!     .with_calculation("aapl-20230930_cal.xml")
//!     .with_definition("aapl-20230930_def.xml")
//!     .with_label("aapl-20230930_lab.xml");
//!
//! let filing = Filing::open(&sources)?;
//! println!("numeric facts: {}", filing.numeric_facts().height());
//! # Ok::<(), xbrl_tables::Error>(())
//! ```

pub mod diagnostics;
pub mod document;
pub mod filing;
pub mod instance;
pub mod linkbase;
pub mod model;
pub mod table;
pub mod taxonomy;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use diagnostics::{Diagnostics, SkipReason};
pub use filing::{extract, Filing, Sources, Tables};
pub use instance::{InstanceExtract, InstanceSource};
pub use linkbase::{LinkbaseExtract, LinkbaseKind};
pub use model::{Context, Dimension, Fact, FactAttr, FactKind, Label, LinkArc, Period, Unit, Value};
pub use table::{Cell, Column, ColumnType, Table};

/// How element tags are classified during the instance walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagMatching {
    /// Containment test on the full `{namespace}local` tag, so any tag
    /// whose text includes `unit` is treated as a unit.
    #[default]
    Substring,
    /// Exact comparison against the tag's local name.
    LocalName,
}

impl TagMatching {
    pub fn matches(self, clark_tag: &str, local_name: &str, needle: &str) -> bool {
        match self {
            TagMatching::Substring => clark_tag.contains(needle),
            TagMatching::LocalName => local_name == needle,
        }
    }
}

/// Extraction settings shared by every stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub tag_matching: TagMatching,
    /// Keep labels whose text is blank (with a null `text` cell)
    pub keep_blank_labels: bool,
}

impl ExtractOptions {
    pub fn strict() -> Self {
        Self {
            tag_matching: TagMatching::LocalName,
            ..Self::default()
        }
    }

    pub fn with_tag_matching(mut self, tag_matching: TagMatching) -> Self {
        self.tag_matching = tag_matching;
        self
    }

    pub fn with_blank_labels(mut self, keep: bool) -> Self {
        self.keep_blank_labels = keep;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tag_matching: TagMatching::Substring,
            keep_blank_labels: true,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("XML parse error in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Missing source: {0}")]
    MissingSource(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Path of the document that failed, if the error came from one
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Error::Io { path, .. } | Error::Encoding { path } | Error::Xml { path, .. } => {
                Some(path.as_path())
            }
            Error::MissingSource(_) | Error::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_matching_is_loose() {
        let tag = "{http://example.org/acme/2023}unitPrice";
        assert!(TagMatching::Substring.matches(tag, "unitPrice", "unit"));
        assert!(!TagMatching::LocalName.matches(tag, "unitPrice", "unit"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: ExtractOptions = serde_json::from_str(r#"{"tag_matching":"local-name"}"#).unwrap();
        assert_eq!(opts.tag_matching, TagMatching::LocalName);
        assert!(opts.keep_blank_labels);
        assert_eq!(ExtractOptions::strict(), opts);
    }
}
