//! Serialization of a [`Document`] to XML text.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::document::{Document, NodeId, QName};
use crate::error::{MetsError, Result};
use crate::namespace::Namespace;

/// Namespace bound to the reserved `xml` prefix. It is never declared.
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace URI to prefix mapping, in declaration order.
struct Prefixes {
    declared: Vec<(String, String)>,
}

impl Prefixes {
    /// Collect every namespace used by an element or attribute in `doc`.
    ///
    /// Registered namespaces get their conventional prefix and come first;
    /// any other URI gets `ns0`, `ns1`, … in order of first use. The
    /// reserved `xml` namespace is left out.
    fn collect(doc: &Document) -> Self {
        let mut used: Vec<String> = Vec::new();
        for id in doc.descendants(doc.root()) {
            let names = std::iter::once(doc.name(id)).chain(doc.attributes(id).iter().map(|a| &a.name));
            for name in names {
                if let Some(uri) = name.namespace_uri().filter(|uri| *uri != XML_NAMESPACE) {
                    if !used.iter().any(|u| u == uri) {
                        used.push(uri.to_string());
                    }
                }
            }
        }

        let mut declared: Vec<(String, String)> = Namespace::ALL
            .iter()
            .filter(|ns| used.iter().any(|u| u == ns.uri()))
            .map(|ns| (ns.uri().to_string(), ns.prefix().to_string()))
            .collect();
        let unknown = used.into_iter().filter(|u| Namespace::from_uri(u).is_none());
        for (n, uri) in unknown.enumerate() {
            declared.push((uri, format!("ns{n}")));
        }

        Self { declared }
    }

    fn qualify(&self, name: &QName) -> String {
        let prefix = name.namespace_uri().and_then(|uri| {
            if uri == XML_NAMESPACE {
                return Some("xml");
            }
            self.declared
                .iter()
                .find(|(u, _)| u == uri)
                .map(|(_, p)| p.as_str())
        });
        match prefix {
            Some(p) => format!("{p}:{}", name.local_name()),
            None => name.local_name().to_string(),
        }
    }
}

/// Serialize a document to a UTF-8 string with two-space indentation.
///
/// # Examples
/// ```
/// use sip_mets::namespace::Namespace;
/// use sip_mets::xml::{to_string, Document, Element};
///
/// let doc = Document::new(Element::new(Namespace::Mets, "mets").attr("TYPE", "audio"));
/// let xml = to_string(&doc).unwrap();
/// assert!(xml.contains(r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" TYPE="audio"/>"#));
/// ```
pub fn to_string(doc: &Document) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    write_document(doc, &mut buffer)?;
    String::from_utf8(buffer.into_inner())
        .map_err(|e| MetsError::XmlWrite(format!("Invalid UTF-8 in generated XML: {e}")))
}

/// Serialize a document into any writer.
pub fn write_document<W: Write>(doc: &Document, out: W) -> Result<()> {
    let prefixes = Prefixes::collect(doc);
    let mut writer = Writer::new_with_indent(out, b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(|e| MetsError::XmlWrite(format!("Failed to write XML declaration: {e}")))?;
    write_node(&mut writer, doc, doc.root(), &prefixes, true)?;
    writer
        .get_mut()
        .flush()
        .map_err(MetsError::Io)
}

fn write_node<W: Write>(
    writer: &mut Writer<W>,
    doc: &Document,
    id: NodeId,
    prefixes: &Prefixes,
    is_root: bool,
) -> Result<()> {
    let qname = prefixes.qualify(doc.name(id));
    let mut start = BytesStart::new(qname.as_str());

    if is_root {
        for (uri, prefix) in &prefixes.declared {
            let key = format!("xmlns:{prefix}");
            start.push_attribute((key.as_str(), uri.as_str()));
        }
    }
    for attribute in doc.attributes(id) {
        let key = prefixes.qualify(&attribute.name);
        start.push_attribute((key.as_str(), attribute.value.as_str()));
    }

    let children = doc.children(id);
    let text = doc.text(id);
    if children.is_empty() && text.is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| MetsError::XmlWrite(format!("Failed to write <{qname}/>: {e}")));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| MetsError::XmlWrite(format!("Failed to write <{qname}>: {e}")))?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| MetsError::XmlWrite(format!("Failed to write text of <{qname}>: {e}")))?;
    }
    for child in children {
        write_node(writer, doc, *child, prefixes, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(qname.as_str())))
        .map_err(|e| MetsError::XmlWrite(format!("Failed to close <{qname}>: {e}")))
}
