// Linkbase processing for XBRL
use crate::document::{trimmed_text, Source};
use crate::model::{Label, LinkArc};
use crate::{ExtractOptions, Result};
use indexmap::IndexMap;
use roxmltree::{Document, Node};
use std::path::Path;

pub const LINKBASE_NS: &str = "http://www.xbrl.org/2003/linkbase";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkbaseKind {
    Calculation,
    Definition,
    Label,
}

impl LinkbaseKind {
    /// Extended link element, a direct child of the `linkbase` root
    pub fn link_element(self) -> &'static str {
        match self {
            LinkbaseKind::Calculation => "calculationLink",
            LinkbaseKind::Definition => "definitionLink",
            LinkbaseKind::Label => "labelLink",
        }
    }

    /// Descendant of the link element that becomes a record
    pub fn record_element(self) -> &'static str {
        match self {
            LinkbaseKind::Calculation => "calculationArc",
            LinkbaseKind::Definition => "definitionArc",
            LinkbaseKind::Label => "label",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkbaseExtract {
    pub calculations: Vec<LinkArc>,
    pub definitions: Vec<LinkArc>,
    pub labels: Vec<Label>,
}

/// Read the three linkbases. An absent path yields an empty list; a path
/// that cannot be read or parsed fails the whole extraction.
pub fn extract_linkbases(
    calculation: Option<&Path>,
    definition: Option<&Path>,
    label: Option<&Path>,
    options: &ExtractOptions,
) -> Result<LinkbaseExtract> {
    let mut extract = LinkbaseExtract::default();

    if let Some(path) = calculation {
        let source = Source::load(path)?;
        extract.calculations = extract_arcs(&source.parse()?, LinkbaseKind::Calculation);
    }
    if let Some(path) = definition {
        let source = Source::load(path)?;
        extract.definitions = extract_arcs(&source.parse()?, LinkbaseKind::Definition);
    }
    if let Some(path) = label {
        let source = Source::load(path)?;
        extract.labels = extract_labels(&source.parse()?, options);
    }

    tracing::debug!(
        calculations = extract.calculations.len(),
        definitions = extract.definitions.len(),
        labels = extract.labels.len(),
        "linkbases extracted"
    );
    Ok(extract)
}

/// Collect `calculationArc` or `definitionArc` records in document order.
pub fn extract_arcs(doc: &Document<'_>, kind: LinkbaseKind) -> Vec<LinkArc> {
    debug_assert!(kind != LinkbaseKind::Label, "labels carry text, use extract_labels");

    record_elements(doc, kind)
        .map(|node| LinkArc {
            attributes: local_attributes(node),
        })
        .filter(|arc| !arc.is_empty())
        .collect()
}

/// Collect `label` resources; `labelArc` elements are not labels.
pub fn extract_labels(doc: &Document<'_>, options: &ExtractOptions) -> Vec<Label> {
    record_elements(doc, LinkbaseKind::Label)
        .map(|node| Label {
            text: trimmed_text(node)
                .filter(|text| !text.is_empty())
                .map(|text| text.into_owned()),
            attributes: local_attributes(node),
        })
        .filter(|label| !label.is_empty())
        .filter(|label| options.keep_blank_labels || label.text.is_some())
        .collect()
}

fn record_elements<'a, 'input>(
    doc: &'a Document<'input>,
    kind: LinkbaseKind,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.root_element()
        .children()
        .filter(move |node| {
            let tag = node.tag_name();
            node.is_element()
                && tag.namespace() == Some(LINKBASE_NS)
                && tag.name() == kind.link_element()
        })
        .flat_map(|link| link.descendants())
        .filter(move |node| node.is_element() && node.tag_name().name() == kind.record_element())
}

/// Attribute local names mapped to their values. A local name that
/// appears twice keeps its first position and its last value.
fn local_attributes(node: Node<'_, '_>) -> IndexMap<String, String> {
    node.attributes()
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CALCULATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:roleRef roleURI="http://acme.com/role/Income" xlink:type="simple" xlink:href="acme.xsd#Income"/>
  <link:calculationLink xlink:role="http://acme.com/role/Income" xlink:type="extended">
    <link:loc xlink:type="locator" xlink:href="acme.xsd#us-gaap_Revenues" xlink:label="loc_Revenues"/>
    <link:calculationArc xlink:type="arc" xlink:arcrole="http://www.xbrl.org/2003/arcrole/summation-item" xlink:from="loc_GrossProfit" xlink:to="loc_Revenues" weight="1" order="1.0"/>
    <link:calculationArc xlink:type="arc" xlink:arcrole="http://www.xbrl.org/2003/arcrole/summation-item" xlink:from="loc_GrossProfit" xlink:to="loc_CostOfRevenue" weight="-1" order="2.0"/>
  </link:calculationLink>
</link:linkbase>"#;

    fn parse(text: &str) -> Source {
        Source::from_bytes("test.xml", text.as_bytes().to_vec())
    }

    #[test]
    fn test_calculation_arcs_only() {
        let source = parse(CALCULATION);
        let arcs = extract_arcs(&source.parse().unwrap(), LinkbaseKind::Calculation);

        assert_eq!(arcs.len(), 2);
        let keys: Vec<&str> = arcs[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["type", "arcrole", "from", "to", "weight", "order"]);
        assert_eq!(arcs[1].get("weight"), Some("-1"));
        assert_eq!(arcs[1].get("to"), Some("loc_CostOfRevenue"));
    }

    #[test]
    fn test_wrong_kind_finds_nothing() {
        let source = parse(CALCULATION);
        let arcs = extract_arcs(&source.parse().unwrap(), LinkbaseKind::Definition);
        assert!(arcs.is_empty());
    }

    #[test]
    fn test_link_must_be_in_linkbase_namespace() {
        let text = r#"<linkbase xmlns="http://example.com/other">
  <calculationLink><calculationArc weight="1"/></calculationLink>
</linkbase>"#;
        let source = parse(text);
        assert!(extract_arcs(&source.parse().unwrap(), LinkbaseKind::Calculation).is_empty());
    }

    #[test]
    fn test_labels_skip_label_arcs_and_null_blank_text() {
        let text = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:labelLink xlink:type="extended">
    <link:label xlink:type="resource" xlink:label="lab_Revenues" xlink:role="http://www.xbrl.org/2003/role/label" xml:lang="en-US">  Revenues
    </link:label>
    <link:label xlink:type="resource" xlink:label="lab_Blank" xml:lang="en-US">   </link:label>
    <link:label xlink:type="resource" xlink:label="lab_Empty" xml:lang="en-US"/>
    <link:labelArc xlink:type="arc" xlink:from="loc_Revenues" xlink:to="lab_Revenues"/>
  </link:labelLink>
</link:linkbase>"#;
        let source = parse(text);
        let doc = source.parse().unwrap();
        let labels = extract_labels(&doc, &ExtractOptions::default());

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0].text.as_deref(), Some("Revenues"));
        assert_eq!(labels[0].get("lang"), Some("en-US"));
        assert_eq!(labels[0].get("role"), Some("http://www.xbrl.org/2003/role/label"));
        assert_eq!(labels[1].text, None);
        assert_eq!(labels[2].text, None);

        let strict = ExtractOptions::default().with_blank_labels(false);
        assert_eq!(extract_labels(&doc, &strict).len(), 1);
    }

    #[test]
    fn test_label_text_after_comment() {
        let text = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase" xmlns:xlink="http://www.w3.org/1999/xlink">
  <link:labelLink xlink:type="extended">
    <link:label xlink:label="lab_Revenues"><!-- generated -->Revenues</link:label>
  </link:labelLink>
</link:linkbase>"#;
        let source = parse(text);
        let labels = extract_labels(&source.parse().unwrap(), &ExtractOptions::default());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text.as_deref(), Some("Revenues"));
    }

    #[test]
    fn test_arc_without_attributes_is_dropped() {
        let text = r#"<link:linkbase xmlns:link="http://www.xbrl.org/2003/linkbase">
  <link:definitionLink>
    <link:definitionArc/>
    <link:definitionArc order="1"/>
  </link:definitionLink>
</link:linkbase>"#;
        let source = parse(text);
        let arcs = extract_arcs(&source.parse().unwrap(), LinkbaseKind::Definition);
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].get("order"), Some("1"));
    }
}
