//! Search primitives over a [`Document`].
//!
//! Element and attribute names are matched on their local name only, so the
//! same queries work on documents written by this crate and on documents
//! loaded from disk with whatever prefixes they carried. Searches include
//! the scope node itself and run in document order.

use crate::error::{MetsError, Result};
use crate::ids::base_id;
use crate::xml::{Document, NodeId};

/// First element named `local` at or below `scope`.
///
/// # Arguments
/// * `doc` - Document to search
/// * `scope` - Node to start from (included in the search)
/// * `local` - Local element name, e.g. `"amdSec"`
///
/// # Examples
/// ```
/// use sip_mets::query::find_element_by_name;
/// use sip_mets::xml::parse_document;
///
/// let doc = parse_document("<mets><amdSec ID='amd1'/><amdSec ID='amd2'/></mets>").unwrap();
/// let amd = find_element_by_name(&doc, doc.root(), "amdSec").unwrap();
/// assert_eq!(doc.attribute(amd, "ID"), Some("amd1"));
/// ```
#[must_use]
pub fn find_element_by_name(doc: &Document, scope: NodeId, local: &str) -> Option<NodeId> {
    doc.descendants(scope).find(|id| doc.local_name(*id) == local)
}

/// All elements named `local` at or below `scope`.
#[must_use]
pub fn find_elements_by_name(doc: &Document, scope: NodeId, local: &str) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|id| doc.local_name(*id) == local)
        .collect()
}

/// First attribute with local name `local` at or below `scope`, ignoring its
/// namespace (`href` finds `xlink:href`).
///
/// # Returns
/// The element carrying the attribute and the attribute value
#[must_use]
pub fn find_attribute_by_name<'a>(
    doc: &'a Document,
    scope: NodeId,
    local: &str,
) -> Option<(NodeId, &'a str)> {
    doc.descendants(scope)
        .find_map(|id| doc.attribute(id, local).map(|value| (id, value)))
}

fn has_attribute_value(doc: &Document, id: NodeId, attribute: &str, value: &str) -> bool {
    doc.attribute(id, attribute)
        .is_some_and(|v| v.to_lowercase() == value.to_lowercase())
}

/// First element whose `attribute` equals `value`, ignoring case of the value.
#[must_use]
pub fn find_element_by_attribute(
    doc: &Document,
    scope: NodeId,
    attribute: &str,
    value: &str,
) -> Option<NodeId> {
    doc.descendants(scope)
        .find(|id| has_attribute_value(doc, *id, attribute, value))
}

/// All elements whose `attribute` equals `value`, ignoring case of the value.
#[must_use]
pub fn find_elements_by_attribute(
    doc: &Document,
    scope: NodeId,
    attribute: &str,
    value: &str,
) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|id| has_attribute_value(doc, *id, attribute, value))
        .collect()
}

/// First element named `element` whose `attribute` equals `value` (case-insensitive).
///
/// # Examples
/// ```
/// use sip_mets::query::find_element_by_name_and_attribute;
/// use sip_mets::xml::parse_document;
///
/// let doc = parse_document("<mets><structMap TYPE='PHYSICAL'/><structMap TYPE='LOGICAL'/></mets>").unwrap();
/// let map = find_element_by_name_and_attribute(&doc, doc.root(), "structMap", "TYPE", "logical");
/// assert!(map.is_some());
/// ```
#[must_use]
pub fn find_element_by_name_and_attribute(
    doc: &Document,
    scope: NodeId,
    element: &str,
    attribute: &str,
    value: &str,
) -> Option<NodeId> {
    doc.descendants(scope).find(|id| {
        doc.local_name(*id) == element && has_attribute_value(doc, *id, attribute, value)
    })
}

/// All elements named `element` whose `attribute` equals `value` (case-insensitive).
#[must_use]
pub fn find_elements_by_name_and_attribute(
    doc: &Document,
    scope: NodeId,
    element: &str,
    attribute: &str,
    value: &str,
) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|id| {
            doc.local_name(*id) == element && has_attribute_value(doc, *id, attribute, value)
        })
        .collect()
}

/// Elements named `element` whose first child element is named `child`.
#[must_use]
pub fn find_elements_by_name_and_child(
    doc: &Document,
    scope: NodeId,
    element: &str,
    child: &str,
) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|id| doc.local_name(*id) == element)
        .filter(|id| {
            doc.children(*id)
                .first()
                .is_some_and(|first| doc.local_name(*first) == child)
        })
        .collect()
}

/// Parents of every element named `local`, one entry per match.
#[must_use]
pub fn find_parents_by_child_name(doc: &Document, scope: NodeId, local: &str) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|id| doc.local_name(*id) == local)
        .filter_map(|id| doc.parent(id))
        .collect()
}

/// The `structMap` with the given `TYPE`.
#[must_use]
pub fn struct_map_by_type(doc: &Document, type_label: &str) -> Option<NodeId> {
    find_element_by_name_and_attribute(doc, doc.root(), "structMap", "TYPE", type_label)
}

/// The `fileGrp` with the given `USE`.
#[must_use]
pub fn file_group_by_use(doc: &Document, use_label: &str) -> Option<NodeId> {
    find_element_by_name_and_attribute(doc, doc.root(), "fileGrp", "USE", use_label)
}

/// Workflow (collection) name recorded as the root `TYPE`.
#[must_use]
pub fn workflow_name(doc: &Document) -> Option<&str> {
    doc.attribute(doc.root(), "TYPE")
}

/// Document-level identifier from `metsHdr/metsDocumentID`.
#[must_use]
pub fn document_identifier(doc: &Document) -> Option<&str> {
    find_element_by_name(doc, doc.root(), "metsHdr")
        .and_then(|hdr| find_element_by_name(doc, hdr, "metsDocumentID"))
        .and_then(|id| doc.text(id))
        .map(str::trim)
}

/// Content identifier of the root division of the logical structMap.
#[must_use]
pub fn logical_root_identifier(doc: &Document) -> Option<&str> {
    struct_map_by_type(doc, "LOGICAL")
        .and_then(|map| find_element_by_name(doc, map, "div"))
        .and_then(|div| doc.attribute(div, "CONTENTIDS"))
}

/// PREMIS object identifier of the amdSec a nested entry ID belongs to.
///
/// # Arguments
/// * `entry_id` - Nested entry ID such as `amd00000002-object01`
///
/// # Returns
/// The `objectIdentifierValue` of that amdSec
pub fn ark_from_amd_sec(doc: &Document, entry_id: &str) -> Result<String> {
    let amd_id = base_id(entry_id);
    let amd_sec = doc
        .element_by_id(amd_id)
        .filter(|id| doc.local_name(*id) == "amdSec")
        .ok_or_else(|| MetsError::ElementNotFound {
            element: format!("amdSec ID={amd_id}"),
            context: "document".to_string(),
        })?;

    find_element_by_name(doc, amd_sec, "objectIdentifierValue")
        .and_then(|id| doc.text(id))
        .map(|text| text.trim().to_string())
        .ok_or_else(|| MetsError::ElementNotFound {
            element: "objectIdentifierValue".to_string(),
            context: format!("amdSec {amd_id}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/"
        xmlns:premis="info:lc/xmlns/premis-v2" xmlns:xlink="http://www.w3.org/1999/xlink" TYPE="audio">
      <mets:metsHdr><mets:metsDocumentID>ark:/81055/doc</mets:metsDocumentID></mets:metsHdr>
      <mets:amdSec ID="amd00000002">
        <mets:digiprovMD ID="amd00000002-object01"><mets:mdWrap MDTYPE="PREMIS:OBJECT"><mets:xmlData>
          <premis:object><premis:objectIdentifier>
            <premis:objectIdentifierType>ARK</premis:objectIdentifierType>
            <premis:objectIdentifierValue>f1</premis:objectIdentifierValue>
          </premis:objectIdentifier></premis:object>
        </mets:xmlData></mets:mdWrap></mets:digiprovMD>
      </mets:amdSec>
      <mets:fileSec><mets:fileGrp USE="Original"><mets:fileGrp USE="Audio">
        <mets:file ID="file00000001" ADMID="amd00000002-object01">
          <mets:FLocat LOCTYPE="URL" xlink:href="/data/a.wav"/>
        </mets:file>
      </mets:fileGrp></mets:fileGrp></mets:fileSec>
      <mets:structMap TYPE="LOGICAL"><mets:div ID="log00000001" CONTENTIDS="ark:/81055/sub" TYPE="Work"/></mets:structMap>
    </mets:mets>"#;

    fn sample() -> Document {
        parse_document(SAMPLE).unwrap()
    }

    #[test]
    fn test_find_by_name_includes_scope() {
        let doc = sample();
        assert_eq!(find_element_by_name(&doc, doc.root(), "mets"), Some(doc.root()));
        assert_eq!(find_elements_by_name(&doc, doc.root(), "fileGrp").len(), 2);
    }

    #[test]
    fn test_find_attribute_ignores_namespace() {
        let doc = sample();
        let file = doc.element_by_id("file00000001").unwrap();
        let (_, href) = find_attribute_by_name(&doc, file, "href").unwrap();
        assert_eq!(href, "/data/a.wav");
    }

    #[test]
    fn test_attribute_value_is_case_insensitive() {
        let doc = sample();
        assert!(find_element_by_attribute(&doc, doc.root(), "USE", "audio").is_some());
        assert_eq!(
            find_elements_by_attribute(&doc, doc.root(), "ID", "AMD00000002").len(),
            1
        );
        assert!(find_element_by_name_and_attribute(&doc, doc.root(), "file", "USE", "audio").is_none());
    }

    #[test]
    fn test_find_elements_by_name_and_child() {
        let doc = sample();
        let wrappers = find_elements_by_name_and_child(&doc, doc.root(), "fileGrp", "fileGrp");
        assert_eq!(wrappers.len(), 1);
        assert_eq!(doc.attribute(wrappers[0], "USE"), Some("Original"));
    }

    #[test]
    fn test_find_parents_by_child_name() {
        let doc = sample();
        let parents = find_parents_by_child_name(&doc, doc.root(), "FLocat");
        assert_eq!(parents, vec![doc.element_by_id("file00000001").unwrap()]);
    }

    #[test]
    fn test_document_readers() {
        let doc = sample();
        assert_eq!(workflow_name(&doc), Some("audio"));
        assert_eq!(document_identifier(&doc), Some("ark:/81055/doc"));
        assert_eq!(logical_root_identifier(&doc), Some("ark:/81055/sub"));
        assert!(file_group_by_use(&doc, "Image").is_none());
    }

    #[test]
    fn test_ark_from_amd_sec() {
        let doc = sample();
        assert_eq!(ark_from_amd_sec(&doc, "amd00000002-object01").unwrap(), "f1");
        assert!(matches!(
            ark_from_amd_sec(&doc, "amd00000009-object01"),
            Err(MetsError::ElementNotFound { .. })
        ));
    }
}
