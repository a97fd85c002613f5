//! Builders for METS sections.
//!
//! Every builder takes one parameter struct, validates it and returns a new
//! detached [`Element`]. Builders never look anything up and never touch a
//! document; numeric IDs are rendered in their eight-digit space here, so
//! callers deal in ordinals only.

use chrono::{DateTime, Utc};

use crate::config::{validate_id, validate_required, CREATE_DATE_FORMAT};
use crate::error::Result;
use crate::ids::{local_id, IdSpace, LocalKind};
use crate::namespace::Namespace;
use crate::types::{DescriptiveMetadata, MetadataReference};
use crate::xml::Element;

/// Root `mets` element.
#[derive(Debug, Clone)]
pub struct MetsRootInfo {
    /// Collection label, written as the root `TYPE`.
    pub collection: String,
    /// Namespace URI / schema URL pairs for `xsi:schemaLocation`.
    pub schema_locations: Vec<(String, String)>,
}

/// Document header.
#[derive(Debug, Clone)]
pub struct HeaderInfo {
    /// Name (and version) of the software creating the document.
    pub agent_name: String,
    /// Document-level persistent identifier.
    pub document_id: String,
    pub adm_id: Option<String>,
    pub create_date: DateTime<Utc>,
}

/// Descriptive metadata section.
#[derive(Debug, Clone)]
pub struct DmdSecInfo {
    pub id: u64,
    pub metadata: DescriptiveMetadata,
}

/// Element name of a section nested in an amdSec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdSectionKind {
    TechMd,
    RightsMd,
    SourceMd,
    DigiprovMd,
}

impl MdSectionKind {
    #[must_use]
    pub fn element_name(self) -> &'static str {
        match self {
            MdSectionKind::TechMd => "techMD",
            MdSectionKind::RightsMd => "rightsMD",
            MdSectionKind::SourceMd => "sourceMD",
            MdSectionKind::DigiprovMd => "digiprovMD",
        }
    }
}

/// Metadata wrapper (`mdWrap` with an `xmlData` payload).
#[derive(Debug, Clone)]
pub struct MdWrapInfo {
    pub md_type: String,
    /// Only written when `md_type` is `OTHER`.
    pub other_md_type: Option<String>,
    pub content: Vec<Element>,
}

impl MdWrapInfo {
    /// Wrapper of a given type around a single payload element.
    pub fn wrapping(md_type: impl Into<String>, payload: Element) -> Self {
        Self {
            md_type: md_type.into(),
            other_md_type: None,
            content: vec![payload],
        }
    }
}

/// Section nested in an amdSec, e.g. `digiprovMD ID="amd00000002-event01"`.
#[derive(Debug, Clone)]
pub struct MdSection {
    pub kind: MdSectionKind,
    pub id: String,
    pub wrap: Option<MdWrapInfo>,
}

/// Administrative metadata section.
#[derive(Debug, Clone)]
pub struct AmdSecInfo {
    pub id: u64,
    pub section: Option<MdSection>,
}

/// File node of the file section.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub id: u64,
    /// Ordinal of the amdSec describing this file.
    pub amd_id: u64,
    /// Also reference the acquisition event of that amdSec.
    pub reference_event: bool,
    pub loc_type: String,
    /// Only written when `loc_type` is `OTHER`.
    pub other_loc_type: Option<String>,
    pub href: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub checksum: Option<String>,
    pub checksum_type: Option<String>,
    /// Persistent identifier of the file.
    pub owner_id: Option<String>,
}

/// File group, optionally wrapped in a `fileSec`.
#[derive(Debug, Clone)]
pub struct FileGrpInfo {
    pub use_label: String,
    pub wrap_in_file_sec: bool,
    /// Nested `file` or `fileGrp` elements.
    pub children: Vec<Element>,
}

/// Structural division of a structMap.
#[derive(Debug, Clone)]
pub struct DivInfo {
    pub id: u64,
    pub content_ids: String,
    pub type_label: String,
    pub dmd_id: Option<u64>,
    pub adm_id: Option<String>,
    pub children: Vec<Element>,
}

/// Time range of an `area` file pointer.
#[derive(Debug, Clone)]
pub struct TimeRange {
    pub betype: String,
    pub begin: String,
    pub end: String,
}

fn mets(local: &str) -> Element {
    Element::new(Namespace::Mets, local)
}

/// Build the root `mets` element.
pub fn create_mets_root(info: &MetsRootInfo) -> Result<Element> {
    validate_required(&info.collection, "collection", "mets root")?;

    let mut root = mets("mets");
    if !info.schema_locations.is_empty() {
        let value = info
            .schema_locations
            .iter()
            .map(|(ns, url)| format!("{ns} {url}"))
            .collect::<Vec<_>>()
            .join(" ");
        root = root.ns_attr(Namespace::Xsi, "schemaLocation", value);
    }
    Ok(root.attr("TYPE", info.collection.as_str()))
}

/// Build the `metsHdr` element.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use sip_mets::builders::{create_header, HeaderInfo};
///
/// let header = create_header(&HeaderInfo {
///     agent_name: "sip-mets 0.1.0".into(),
///     document_id: "ark:/81055/doc1".into(),
///     adm_id: None,
///     create_date: Utc::now(),
/// })
/// .unwrap();
/// assert_eq!(header.find("metsDocumentID").and_then(|e| e.text.as_deref()), Some("ark:/81055/doc1"));
/// ```
pub fn create_header(info: &HeaderInfo) -> Result<Element> {
    validate_required(&info.agent_name, "agent_name", "metsHdr")?;
    validate_required(&info.document_id, "document_id", "metsHdr")?;

    let mut header = mets("metsHdr").attr(
        "CREATEDATE",
        info.create_date.format(CREATE_DATE_FORMAT).to_string(),
    );
    if let Some(adm_id) = info.adm_id.as_deref().filter(|a| !a.is_empty()) {
        header = header.attr("ADMID", adm_id);
    }

    let agent = mets("agent")
        .attr("ROLE", "CREATOR")
        .attr("TYPE", "OTHER")
        .attr("OTHERTYPE", "SOFTWARE")
        .child(mets("name").text(info.agent_name.as_str()));

    Ok(header
        .child(agent)
        .child(mets("metsDocumentID").text(info.document_id.as_str())))
}

/// Build a `dmdSec` for one of the descriptive metadata kinds.
pub fn create_dmd_sec(info: &DmdSecInfo) -> Result<Element> {
    validate_id("dmdSec.id", info.id)?;
    let dmd_sec = mets("dmdSec").attr("ID", IdSpace::Dmd.format(info.id));

    let content = match &info.metadata {
        DescriptiveMetadata::Marc => mets("mdWrap").attr("MDTYPE", "MARC").child(mets("xmlData")),
        DescriptiveMetadata::Mods => mets("mdWrap").attr("MDTYPE", "MODS").child(mets("xmlData")),
        DescriptiveMetadata::Other { other_md_type } => {
            let mut wrap = mets("mdWrap").attr("MDTYPE", "OTHER");
            if let Some(other) = other_md_type.as_deref().filter(|o| !o.is_empty()) {
                wrap = wrap.attr("OTHERMDTYPE", other);
            }
            wrap.child(mets("xmlData"))
        }
        DescriptiveMetadata::External(reference) => create_md_ref(reference)?,
    };

    Ok(dmd_sec.child(content))
}

fn create_md_ref(reference: &MetadataReference) -> Result<Element> {
    validate_required(&reference.md_type, "md_type", "mdRef")?;
    validate_required(&reference.loc_type, "loc_type", "mdRef")?;
    validate_required(&reference.href, "href", "mdRef")?;

    let mut md_ref = mets("mdRef")
        .attr("MDTYPE", reference.md_type.as_str())
        .attr("LOCTYPE", reference.loc_type.as_str());
    if reference.loc_type == "OTHER" {
        if let Some(other) = reference.other_loc_type.as_deref().filter(|o| !o.is_empty()) {
            md_ref = md_ref.attr("OTHERLOCTYPE", other);
        }
    }
    md_ref = md_ref.ns_attr(Namespace::XLink, "href", reference.href.as_str());
    if let Some(other) = reference.other_md_type.as_deref().filter(|o| !o.is_empty()) {
        md_ref = md_ref.attr("OTHERMDTYPE", other);
    }
    Ok(md_ref)
}

/// Build an `mdWrap` with its `xmlData` payload.
pub fn create_md_wrap(info: &MdWrapInfo) -> Result<Element> {
    validate_required(&info.md_type, "md_type", "mdWrap")?;

    let mut wrap = mets("mdWrap").attr("MDTYPE", info.md_type.as_str());
    if info.md_type == "OTHER" {
        if let Some(other) = info.other_md_type.as_deref().filter(|o| !o.is_empty()) {
            wrap = wrap.attr("OTHERMDTYPE", other);
        }
    }

    let mut xml_data = mets("xmlData");
    for element in &info.content {
        xml_data.push(element.clone());
    }
    Ok(wrap.child(xml_data))
}

/// Build a section nested in an amdSec (`digiprovMD`, `rightsMD`, …).
pub fn create_md_section(section: &MdSection) -> Result<Element> {
    validate_required(&section.id, "id", section.kind.element_name())?;

    let mut element = mets(section.kind.element_name()).attr("ID", section.id.as_str());
    if let Some(wrap) = &section.wrap {
        element.push(create_md_wrap(wrap)?);
    }
    Ok(element)
}

/// Build an `amdSec`, optionally holding one nested section.
pub fn create_amd_sec(info: &AmdSecInfo) -> Result<Element> {
    validate_id("amdSec.id", info.id)?;

    let mut amd_sec = mets("amdSec").attr("ID", IdSpace::Amd.format(info.id));
    if let Some(section) = &info.section {
        amd_sec.push(create_md_section(section)?);
    }
    Ok(amd_sec)
}

/// Build a `file` element with its `FLocat`.
///
/// The ADMID always names the amdSec's PREMIS object and, when
/// `reference_event` is set, its first event as well.
pub fn create_file(info: &FileInfo) -> Result<Element> {
    validate_id("file.id", info.id)?;
    validate_id("file.amd_id", info.amd_id)?;
    validate_required(&info.loc_type, "loc_type", "FLocat")?;
    validate_required(&info.href, "href", "FLocat")?;

    let amd = IdSpace::Amd.format(info.amd_id);
    let mut adm_id = local_id(&amd, LocalKind::Object, 1)?;
    if info.reference_event {
        adm_id.push(' ');
        adm_id.push_str(&local_id(&amd, LocalKind::Event, 1)?);
    }

    let mut file = mets("file").attr("ID", IdSpace::File.format(info.id));
    if let Some(mime) = info.mime_type.as_deref().filter(|m| !m.is_empty()) {
        file = file.attr("MIMETYPE", mime);
    }
    if let Some(size) = info.size {
        file = file.attr("SIZE", size.to_string());
    }
    if let (Some(checksum), Some(checksum_type)) = (
        info.checksum.as_deref().filter(|c| !c.is_empty()),
        info.checksum_type.as_deref().filter(|c| !c.is_empty()),
    ) {
        file = file
            .attr("CHECKSUM", checksum)
            .attr("CHECKSUMTYPE", checksum_type);
    }
    if let Some(owner) = info.owner_id.as_deref().filter(|o| !o.is_empty()) {
        file = file.attr("OWNERID", owner);
    }
    file = file.attr("ADMID", adm_id);

    let mut location = mets("FLocat").attr("LOCTYPE", info.loc_type.as_str());
    if info.loc_type == "OTHER" {
        if let Some(other) = info.other_loc_type.as_deref().filter(|o| !o.is_empty()) {
            location = location.attr("OTHERLOCTYPE", other);
        }
    }
    location = location.ns_attr(Namespace::XLink, "href", info.href.as_str());

    Ok(file.child(location))
}

/// Build a `fileGrp`, or a `fileSec` holding it when `wrap_in_file_sec` is set.
pub fn create_file_group(info: &FileGrpInfo) -> Result<Element> {
    validate_required(&info.use_label, "use", "fileGrp")?;

    let mut group = mets("fileGrp").attr("USE", info.use_label.as_str());
    for child in &info.children {
        group.push(child.clone());
    }

    if info.wrap_in_file_sec {
        Ok(mets("fileSec").child(group))
    } else {
        Ok(group)
    }
}

/// Build a `structMap` of the given type around its divisions.
pub fn create_struct_map(type_label: &str, divisions: Vec<Element>) -> Result<Element> {
    validate_required(type_label, "type", "structMap")?;

    let mut struct_map = mets("structMap").attr("TYPE", type_label);
    for division in divisions {
        struct_map.push(division);
    }
    Ok(struct_map)
}

/// Build a structural `div`.
pub fn create_div(info: &DivInfo) -> Result<Element> {
    validate_id("div.id", info.id)?;
    validate_required(&info.content_ids, "content_ids", "div")?;
    validate_required(&info.type_label, "type", "div")?;
    if let Some(dmd_id) = info.dmd_id {
        validate_id("div.dmd_id", dmd_id)?;
    }

    let mut div = mets("div")
        .attr("ID", IdSpace::Log.format(info.id))
        .attr("CONTENTIDS", info.content_ids.as_str())
        .attr("TYPE", info.type_label.as_str());
    if let Some(dmd_id) = info.dmd_id {
        div = div.attr("DMDID", IdSpace::Dmd.format(dmd_id));
    }
    if let Some(adm_id) = info.adm_id.as_deref().filter(|a| !a.is_empty()) {
        div = div.attr("ADMID", adm_id);
    }
    for child in &info.children {
        div.push(child.clone());
    }
    Ok(div)
}

/// Build an `fptr`, with an `area` time range when one is given.
pub fn create_file_pointer(file_id: u64, range: Option<&TimeRange>) -> Result<Element> {
    validate_id("fptr.file_id", file_id)?;
    let file_ref = IdSpace::File.format(file_id);

    Ok(match range {
        Some(range) => mets("fptr").child(
            mets("area")
                .attr("FILEID", file_ref)
                .attr("BETYPE", range.betype.as_str())
                .attr("BEGIN", range.begin.as_str())
                .attr("END", range.end.as_str()),
        ),
        None => mets("fptr").attr("FILEID", file_ref),
    })
}
