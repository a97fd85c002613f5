//! File inventory of a package document.
//!
//! An inventory lists every file below a file group, keyed by file ID. It can
//! be read straight off the `file` elements, or through the PREMIS object of
//! the amdSec each file references. For a freshly assembled document both
//! readings agree.

use std::collections::BTreeMap;

use crate::error::{MetsError, Result};
use crate::query::{file_group_by_use, find_attribute_by_name, find_element_by_name, find_elements_by_name};
use crate::types::InventoryEntry;
use crate::xml::{Document, NodeId};

/// File group holding every content file of an assembled package.
pub const ORIGINAL_GROUP: &str = "Original";

/// Build the inventory of the file group with the given `USE`.
///
/// # Arguments
/// * `doc` - Document to read
/// * `use_label` - `USE` of the file group; nested groups are included
/// * `linked` - Read checksum, size, format and identifier from the linked
///   PREMIS object instead of the file element
///
/// # Errors
/// The group is missing, holds no files, or a file lacks its ADMID.
pub fn inventory(doc: &Document, use_label: &str, linked: bool) -> Result<BTreeMap<String, InventoryEntry>> {
    let group = file_group_by_use(doc, use_label)
        .ok_or_else(|| MetsError::FileGroupNotFound(use_label.to_string()))?;

    let files = find_elements_by_name(doc, group, "file");
    if files.is_empty() {
        return Err(MetsError::EmptyFileGroup(use_label.to_string()));
    }

    let mut entries = BTreeMap::new();
    for file in files {
        let entry = if linked {
            linked_entry(doc, file)?
        } else {
            direct_entry(doc, file)?
        };
        entries.insert(entry.id.clone(), entry);
    }

    tracing::debug!(group = use_label, linked, files = entries.len(), "Inventory read");
    Ok(entries)
}

/// ID, location and first ADMID token of a file element.
fn file_identity(doc: &Document, file: NodeId) -> Result<(String, String, String)> {
    let id = doc.attribute(file, "ID").unwrap_or_default().to_string();
    let adm_id = doc
        .attribute(file, "ADMID")
        .and_then(|value| value.split_whitespace().next())
        .ok_or_else(|| MetsError::AdmIdMissing { file_id: id.clone() })?
        .to_string();
    let location = find_attribute_by_name(doc, file, "href")
        .map(|(_, href)| href.to_string())
        .unwrap_or_default();
    Ok((id, location, adm_id))
}

fn parse_size(value: &str, context: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| MetsError::InvalidNumber {
        value: value.to_string(),
        context: context.to_string(),
    })
}

fn direct_entry(doc: &Document, file: NodeId) -> Result<InventoryEntry> {
    let (id, location, adm_id) = file_identity(doc, file)?;
    let attr = |name: &str| doc.attribute(file, name).unwrap_or_default().to_string();

    let size = match doc.attribute(file, "SIZE") {
        Some(value) => parse_size(value, &format!("SIZE of {id}"))?,
        None => 0,
    };

    Ok(InventoryEntry {
        checksum: attr("CHECKSUM"),
        checksum_type: attr("CHECKSUMTYPE"),
        mime_type: attr("MIMETYPE"),
        ark: attr("OWNERID"),
        size,
        id,
        location,
        adm_id,
    })
}

fn linked_entry(doc: &Document, file: NodeId) -> Result<InventoryEntry> {
    let (id, location, adm_id) = file_identity(doc, file)?;
    let object = doc.element_by_id(&adm_id).ok_or_else(|| MetsError::ElementNotFound {
        element: format!("ID={adm_id}"),
        context: format!("file {id}"),
    })?;

    let text = |name: &str| {
        find_element_by_name(doc, object, name)
            .and_then(|node| doc.text(node))
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    };

    let size_text = text("size");
    let size = if size_text.is_empty() {
        0
    } else {
        parse_size(&size_text, &format!("premis:size of {adm_id}"))?
    };

    Ok(InventoryEntry {
        checksum: text("messageDigest"),
        checksum_type: text("messageDigestAlgorithm"),
        mime_type: text("formatName"),
        ark: text("objectIdentifierValue"),
        size,
        id,
        location,
        adm_id,
    })
}
