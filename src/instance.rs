//! Fact, context and unit extraction from an instance document or its
//! inline XBRL rendition.
//!
//! Both sources are walked depth-first over every element. Each element is
//! classified by its tag and turned into at most one record per category;
//! an element that cannot be turned into a record is skipped on its own and
//! the walk carries on. Skips are counted in [`Diagnostics`].

use crate::diagnostics::{Diagnostics, SkipReason};
use crate::document::{clark_tag, trimmed_text, Source};
use crate::model::{Context, Dimension, Fact, FactAttr, FactKind, Unit};
use crate::taxonomy::qualified_name;
use crate::{ExtractOptions, Result, TagMatching};
use roxmltree::{Document, Node};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSource {
    /// Standalone `.xml` instance document
    Instance,
    /// `.htm` filing with embedded `ix:` facts
    InlineHtml,
}

#[derive(Debug, Clone, Default)]
pub struct InstanceExtract {
    pub non_numeric: Vec<Fact>,
    pub numeric: Vec<Fact>,
    pub contexts: Vec<Context>,
    pub units: Vec<Unit>,
    pub diagnostics: Diagnostics,
}

/// What became of a single element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementOutcome<T> {
    Extracted(T),
    /// Not a record: no usable field
    Filtered,
    Skipped(SkipReason),
}

use ElementOutcome::{Extracted, Filtered, Skipped};

macro_rules! require {
    ($opt:expr, $reason:expr) => {
        match $opt {
            Some(value) => value,
            None => return Skipped($reason),
        }
    };
}

pub fn extract_instance_file<P: AsRef<Path>>(
    path: P,
    source: InstanceSource,
    options: &ExtractOptions,
) -> Result<InstanceExtract> {
    let document = Source::load(path)?;
    let extract = extract_instance(&document.parse()?, source, options);
    tracing::debug!(
        path = %document.path().display(),
        ?source,
        non_numeric = extract.non_numeric.len(),
        numeric = extract.numeric.len(),
        contexts = extract.contexts.len(),
        units = extract.units.len(),
        skipped = extract.diagnostics.skipped(),
        "instance extracted"
    );
    Ok(extract)
}

pub fn extract_instance(
    doc: &Document<'_>,
    source: InstanceSource,
    options: &ExtractOptions,
) -> InstanceExtract {
    let mut walk = Walk {
        matching: options.tag_matching,
        out: InstanceExtract::default(),
    };

    for node in doc.root_element().descendants().filter(Node::is_element) {
        let tag = clark_tag(node);
        match source {
            InstanceSource::Instance => walk.instance_element(node, &tag),
            InstanceSource::InlineHtml => walk.inline_element(node, &tag),
        }
    }

    walk.out
}

struct Walk {
    matching: TagMatching,
    out: InstanceExtract,
}

impl Walk {
    fn is(&self, node: Node<'_, '_>, tag: &str, needle: &str) -> bool {
        self.matching.matches(tag, node.tag_name().name(), needle)
    }

    fn instance_element(&mut self, node: Node<'_, '_>, tag: &str) {
        if self.is(node, tag, "context") {
            let outcome = build_context(node, self.matching);
            settle(outcome, tag, &mut self.out.contexts, &mut self.out.diagnostics);
        } else if self.is(node, tag, "unit") {
            let outcome = build_unit(node, self.matching);
            settle(outcome, tag, &mut self.out.units, &mut self.out.diagnostics);
        } else {
            let kind = if node.has_attribute("decimals") || node.has_attribute("unitRef") {
                FactKind::Numeric
            } else {
                FactKind::NonNumeric
            };
            let name = qualified_name(node.tag_name().namespace(), node.tag_name().name());
            let outcome = build_fact(node, kind, Some(name));
            self.settle_fact(outcome, tag);
        }
    }

    // Categories are tested independently here.
    fn inline_element(&mut self, node: Node<'_, '_>, tag: &str) {
        if self.is(node, tag, "context") {
            let outcome = build_context(node, self.matching);
            settle(outcome, tag, &mut self.out.contexts, &mut self.out.diagnostics);
        }
        if self.is(node, tag, "unit") {
            let outcome = build_unit(node, self.matching);
            settle(outcome, tag, &mut self.out.units, &mut self.out.diagnostics);
        }
        if self.is(node, tag, "nonNumeric") {
            let outcome = build_fact(node, FactKind::NonNumeric, None);
            self.settle_fact(outcome, tag);
        }
        if self.is(node, tag, "nonFraction") {
            let outcome = build_fact(node, FactKind::Numeric, None);
            self.settle_fact(outcome, tag);
        }
    }

    fn settle_fact(&mut self, outcome: ElementOutcome<Fact>, tag: &str) {
        let list = match &outcome {
            Extracted(fact) if fact.is_numeric() => &mut self.out.numeric,
            _ => &mut self.out.non_numeric,
        };
        settle(outcome, tag, list, &mut self.out.diagnostics);
    }
}

fn settle<T>(outcome: ElementOutcome<T>, tag: &str, list: &mut Vec<T>, diagnostics: &mut Diagnostics) {
    match outcome {
        Extracted(record) => list.push(record),
        Filtered => diagnostics.record_filtered(),
        Skipped(reason) => diagnostics.record_skip(tag, reason),
    }
}

fn build_context(node: Node<'_, '_>, matching: TagMatching) -> ElementOutcome<Context> {
    let id = require!(node.attribute("id"), SkipReason::MissingAttribute("id"));
    let mut context = Context {
        id: id.to_string(),
        ..Context::default()
    };

    for child in node.descendants().filter(Node::is_element) {
        let tag = clark_tag(child);
        let is = |needle: &str| matching.matches(&tag, child.tag_name().name(), needle);

        if is("explicitMember") {
            let dimension = require!(
                child.attribute("dimension"),
                SkipReason::MissingAttribute("dimension")
            );
            let member = require!(trimmed_text(child), SkipReason::MissingText);
            context.dimensions.push(Dimension::new(dimension, member));
        } else if is("instant") {
            let instant = require!(trimmed_text(child), SkipReason::MissingText);
            context.instant = Some(instant.to_string());
            context.start_date = None;
            context.end_date = None;
        } else {
            if is("startDate") {
                let start = require!(trimmed_text(child), SkipReason::MissingText);
                context.start_date = Some(start.to_string());
                context.instant = None;
            }
            if is("endDate") {
                let end = require!(trimmed_text(child), SkipReason::MissingText);
                context.end_date = Some(end.to_string());
                context.instant = None;
            }
        }
    }

    Extracted(context)
}

fn build_unit(node: Node<'_, '_>, matching: TagMatching) -> ElementOutcome<Unit> {
    let id = require!(node.attribute("id"), SkipReason::MissingAttribute("id"));
    let mut unit = Unit {
        id: id.to_string(),
        measures: Vec::new(),
    };

    for child in node.descendants().filter(Node::is_element) {
        if matching.matches(&clark_tag(child), child.tag_name().name(), "measure") {
            let measure = require!(trimmed_text(child), SkipReason::MissingText);
            unit.measures.push(measure.to_string());
        }
    }

    Extracted(unit)
}

/// Copy the recognized attributes; the element's own text becomes
/// `value`, placed right after the first recognized attribute.
fn build_fact(node: Node<'_, '_>, kind: FactKind, name: Option<String>) -> ElementOutcome<Fact> {
    let mut fact = Fact::new(kind);
    if let Some(name) = name {
        fact.fields.insert(FactAttr::Name, name);
    }

    for attr in node.attributes() {
        let Some(field) = FactAttr::from_attribute(attr.name()) else {
            continue;
        };
        fact.fields.insert(field, attr.value().to_string());
        if !fact.fields.contains_key(&FactAttr::Value) {
            let value = require!(trimmed_text(node), SkipReason::MissingText);
            fact.fields.insert(FactAttr::Value, value.to_string());
        }
    }

    match fact.value() {
        None => Filtered,
        Some("") => Skipped(SkipReason::BlankValue),
        Some(_) => Extracted(fact),
    }
}
