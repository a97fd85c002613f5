//! Loading persisted XML back into a [`Document`].

use roxmltree::Node;

use super::document::{Attribute, Document, Element, QName};
use crate::error::Result;

/// Parse XML text into an arena document.
///
/// Namespace declarations are resolved into the element and attribute names,
/// and whitespace-only text between elements is dropped, so a document
/// written by [`to_string`](super::to_string) loads back to the same tree.
///
/// Only elements, attributes and text are kept. Comments, processing
/// instructions and the DOCTYPE are dropped, so a document loaded, amended
/// and written back in place loses them.
///
/// # Examples
/// ```
/// use sip_mets::xml::parse_document;
///
/// let doc = parse_document(r#"<mets xmlns="http://www.loc.gov/METS/" TYPE="audio"/>"#).unwrap();
/// assert_eq!(doc.local_name(doc.root()), "mets");
/// assert_eq!(doc.attribute(doc.root(), "TYPE"), Some("audio"));
/// ```
pub fn parse_document(xml: &str) -> Result<Document> {
    let parsed = roxmltree::Document::parse(xml)?;
    Ok(Document::new(to_element(parsed.root_element())))
}

fn to_element(node: Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::with_name(QName::with_uri(
        tag.namespace().map(str::to_string),
        tag.name(),
    ));

    element.attributes = node
        .attributes()
        .map(|a| Attribute {
            name: QName::with_uri(a.namespace().map(str::to_string), a.name()),
            value: a.value().to_string(),
        })
        .collect();

    let text: String = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();
    if !text.trim().is_empty() {
        element.text = Some(text);
    }

    element.children = node
        .children()
        .filter(|c| c.is_element())
        .map(to_element)
        .collect();
    element
}
