//! Accounting for elements the instance walk could not turn into records

use std::collections::BTreeMap;
use std::fmt;

const SAMPLE_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// A required attribute (`id`, `dimension`) is absent
    MissingAttribute(&'static str),
    /// An element whose text is read has no text at all
    MissingText,
    /// A fact whose value trims to nothing
    BlankValue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingAttribute(name) => write!(f, "missing attribute `{name}`"),
            SkipReason::MissingText => f.write_str("missing text"),
            SkipReason::BlankValue => f.write_str("blank value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    pub tag: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    counts: BTreeMap<SkipReason, usize>,
    sample: Vec<SkippedElement>,
    filtered: usize,
}

impl Diagnostics {
    pub fn record_skip(&mut self, tag: &str, reason: SkipReason) {
        tracing::trace!(tag, %reason, "skipped element");
        *self.counts.entry(reason).or_default() += 1;
        if self.sample.len() < SAMPLE_LIMIT {
            self.sample.push(SkippedElement {
                tag: tag.to_string(),
                reason,
            });
        }
    }

    /// A candidate that carried no usable field
    pub fn record_filtered(&mut self) {
        self.filtered += 1;
    }

    pub fn skipped(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn filtered(&self) -> usize {
        self.filtered
    }

    /// First few skipped elements, in walk order
    pub fn sample(&self) -> &[SkippedElement] {
        &self.sample
    }

    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }
}
