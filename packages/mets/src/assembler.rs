//! Package assembly.
//!
//! Builds the complete package document for one submission in a single pass:
//! header, descriptive metadata references, the rights section, one amdSec
//! and file node per content file, the file section and the logical
//! structMap. Identifiers are minted in batches before anything that needs
//! them is built, and any failure abandons the whole document.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::builders::{
    create_amd_sec, create_dmd_sec, create_div, create_file, create_file_group, create_file_pointer,
    create_header, create_md_section, create_mets_root, create_premis_event, create_premis_object,
    create_rights_policy, create_struct_map, AmdSecInfo, DivInfo, DmdSecInfo, FileGrpInfo, FileInfo,
    HeaderInfo, MdSection, MdSectionKind, MdWrapInfo, MetsRootInfo, PremisEventInfo, PremisObjectInfo,
    RightsPolicyInfo, TimeRange,
};
use crate::config::{EVENT_DATE_FORMAT, TIME_RANGE_BEGIN, TIME_RANGE_BETYPE, TIME_RANGE_END};
use crate::error::{MetsError, Result};
use crate::ids::{local_id, IdAllocator, IdSpace, LocalKind};
use crate::inventory::ORIGINAL_GROUP;
use crate::mime::{division_type, resolve_mime_type};
use crate::minter::{mint_exact, IdentifierMinter};
use crate::namespace::Namespace;
use crate::types::{Ark, ContentFile, DescriptiveMetadata, MetadataReference};
use crate::xml::{Document, Element};

/// Schema locations written on the root element.
const SCHEMA_LOCATIONS: [(Namespace, &str); 2] = [
    (Namespace::Mets, "http://www.loc.gov/standards/mets/mets.xsd"),
    (Namespace::Premis, "http://www.loc.gov/standards/premis/v2/premis-v2-2.xsd"),
];

/// A submission to package.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    /// Collection label, e.g. `audio`.
    pub collection: String,
    /// Software agent recorded in the header.
    pub agent_name: String,
    /// Detail note of every acquisition event.
    pub acquisition_note: String,
    /// Submission-level identifier, used for the root division and rights.
    pub submission_id: Ark,
    /// Document-level identifier, recorded in the header.
    pub document_id: Ark,
    pub donor: String,
    /// Content files that each get their own described division.
    pub primary_files: Vec<ContentFile>,
    #[serde(default)]
    pub associated_files: Vec<ContentFile>,
}

impl Submission {
    /// Load a submission manifest from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }
}

/// Result of a successful assembly.
#[derive(Debug)]
pub struct AssembledPackage {
    pub document: Document,
    /// Identifier minted for the recording as a whole.
    pub recording_root: Ark,
    /// ID of the rights entry, e.g. `amd00000001-rights01`.
    pub rights_id: String,
}

/// Which group a content file belongs to, with the identifiers minted for it.
enum Role<'a> {
    Primary { dmd_id: u64, division_ark: &'a Ark },
    Associated { division_ark: &'a Ark },
}

/// Assembles package documents, drawing identifiers from a minter.
pub struct PackageAssembler<'m> {
    minter: &'m dyn IdentifierMinter,
    create_date: Option<DateTime<Utc>>,
}

impl<'m> PackageAssembler<'m> {
    pub fn new(minter: &'m dyn IdentifierMinter) -> Self {
        Self {
            minter,
            create_date: None,
        }
    }

    /// Fix the creation timestamp instead of reading the clock.
    pub fn with_create_date(mut self, create_date: DateTime<Utc>) -> Self {
        self.create_date = Some(create_date);
        self
    }

    /// Build the package document for a submission.
    ///
    /// # Errors
    /// No primary files, an invalid content file, a minting failure or an
    /// exhausted ID space. Nothing is returned on failure.
    pub fn assemble(&self, submission: &Submission) -> Result<AssembledPackage> {
        if submission.primary_files.is_empty() {
            return Err(MetsError::NoPrimaryFiles);
        }
        let primary_mimes = prepare_files(&submission.primary_files)?;
        let associated_mimes = prepare_files(&submission.associated_files)?;

        let created = self.create_date.unwrap_or_else(Utc::now);
        let event_date = created.format(EVENT_DATE_FORMAT).to_string();
        let k = submission.primary_files.len();
        let m = submission.associated_files.len();

        tracing::info!(
            submission = %submission.submission_id,
            primary = k,
            associated = m,
            "Assembling package"
        );

        let dmd_arks = mint_exact(self.minter, k + 1)?;
        let division_arks = mint_exact(self.minter, k + 1)?;
        let associated_arks = mint_exact(self.minter, m)?;

        let mut ids = IdAllocator::new();
        let mut doc = Document::new(create_mets_root(&MetsRootInfo {
            collection: submission.collection.clone(),
            schema_locations: SCHEMA_LOCATIONS
                .iter()
                .map(|(ns, url)| (ns.uri().to_string(), (*url).to_string()))
                .collect(),
        })?);
        let root = doc.root();

        doc.append(
            root,
            create_header(&HeaderInfo {
                agent_name: submission.agent_name.clone(),
                document_id: submission.document_id.to_string(),
                adm_id: None,
                create_date: created,
            })?,
        );

        let mut dmd_ids = Vec::with_capacity(dmd_arks.len());
        for ark in &dmd_arks {
            let id = ids.next(IdSpace::Dmd)?;
            doc.append(
                root,
                create_dmd_sec(&DmdSecInfo {
                    id,
                    metadata: DescriptiveMetadata::External(MetadataReference::sami(ark)),
                })?,
            );
            dmd_ids.push(id);
        }
        tracing::debug!(count = dmd_ids.len(), "Descriptive metadata sections added");

        let rights_id = self.append_rights(&mut doc, &mut ids, submission)?;

        let root_log = ids.next(IdSpace::Log)?;
        let mut audio_files = Vec::with_capacity(k);
        let mut image_files = Vec::with_capacity(m);
        let mut divisions = Vec::with_capacity(k + m);

        let primaries = submission.primary_files.iter().zip(primary_mimes).enumerate().map(
            |(i, (file, mime))| {
                let role = Role::Primary {
                    dmd_id: dmd_ids[i + 1],
                    division_ark: &division_arks[i + 1],
                };
                (file, mime, role)
            },
        );
        let associated = submission
            .associated_files
            .iter()
            .zip(associated_mimes)
            .zip(&associated_arks)
            .map(|((file, mime), ark)| (file, mime, Role::Associated { division_ark: ark }));

        for (file, mime, role) in primaries.chain(associated) {
            let (file_node, division) = self.append_content_file(
                &mut doc,
                &mut ids,
                file,
                &mime,
                &role,
                &submission.acquisition_note,
                &event_date,
            )?;
            match role {
                Role::Primary { .. } => audio_files.push(file_node),
                Role::Associated { .. } => image_files.push(file_node),
            }
            divisions.push(division);
        }

        let file_sec = create_file_group(&FileGrpInfo {
            use_label: ORIGINAL_GROUP.to_string(),
            wrap_in_file_sec: true,
            children: vec![
                create_file_group(&FileGrpInfo {
                    use_label: "Audio".to_string(),
                    wrap_in_file_sec: false,
                    children: audio_files,
                })?,
                create_file_group(&FileGrpInfo {
                    use_label: "Image".to_string(),
                    wrap_in_file_sec: false,
                    children: image_files,
                })?,
            ],
        })?;
        doc.append(root, file_sec);

        let work = create_div(&DivInfo {
            id: root_log,
            content_ids: submission.submission_id.to_string(),
            type_label: "Work".to_string(),
            dmd_id: dmd_ids.first().copied(),
            adm_id: Some(rights_id.clone()),
            children: divisions,
        })?;
        doc.append(root, create_struct_map("LOGICAL", vec![work])?);

        tracing::info!(
            submission = %submission.submission_id,
            files = k + m,
            nodes = doc.len(),
            "Package assembled"
        );

        Ok(AssembledPackage {
            document: doc,
            recording_root: division_arks[0].clone(),
            rights_id,
        })
    }

    fn append_rights(&self, doc: &mut Document, ids: &mut IdAllocator, submission: &Submission) -> Result<String> {
        let amd = ids.next(IdSpace::Amd)?;
        let rights_id = local_id(&IdSpace::Amd.format(amd), LocalKind::Rights, 1)?;
        let policy = create_rights_policy(&RightsPolicyInfo {
            uid: submission.submission_id.clone(),
            donor: submission.donor.clone(),
        })?;

        let root = doc.root();
        doc.append(
            root,
            create_amd_sec(&AmdSecInfo {
                id: amd,
                section: Some(MdSection {
                    kind: MdSectionKind::RightsMd,
                    id: rights_id.clone(),
                    wrap: Some(MdWrapInfo::wrapping("METSRIGHTS", policy)),
                }),
            })?,
        );
        tracing::debug!(rights_id = %rights_id, "Rights section added");
        Ok(rights_id)
    }

    /// Append the amdSec of one content file and return its file node and
    /// structural division, both still detached.
    #[allow(clippy::too_many_arguments)]
    fn append_content_file(
        &self,
        doc: &mut Document,
        ids: &mut IdAllocator,
        file: &ContentFile,
        mime: &str,
        role: &Role<'_>,
        acquisition_note: &str,
        event_date: &str,
    ) -> Result<(Element, Element)> {
        let (amd, file_ordinal) = ids.next_file_pair()?;
        let amd_id = IdSpace::Amd.format(amd);
        let full_path = file.full_path();

        let object = create_premis_object(&PremisObjectInfo {
            object_type: "premis:file".to_string(),
            identifier_type: "ARK".to_string(),
            identifier_value: file.id.clone(),
            composition_level: "0".to_string(),
            message_digest_algorithm: file.hash_algorithm.clone(),
            message_digest: file.hash.clone(),
            size: Some(file.file_size),
            format_name: mime.to_string(),
            original_name: full_path.clone(),
        })?;
        let event = create_premis_event(&PremisEventInfo {
            identifier_type: "local".to_string(),
            identifier_value: LocalKind::Event.value(1),
            event_type: "Acquisition".to_string(),
            date_time: event_date.to_string(),
            outcome: "Success".to_string(),
            outcome_detail_note: Some(acquisition_note.to_string()),
            linking_agents: Vec::new(),
        })?;

        let mut amd_sec = create_amd_sec(&AmdSecInfo {
            id: amd,
            section: Some(MdSection {
                kind: MdSectionKind::DigiprovMd,
                id: local_id(&amd_id, LocalKind::Object, 1)?,
                wrap: Some(MdWrapInfo::wrapping("PREMIS:OBJECT", object)),
            }),
        })?;
        amd_sec.push(create_md_section(&MdSection {
            kind: MdSectionKind::DigiprovMd,
            id: local_id(&amd_id, LocalKind::Event, 1)?,
            wrap: Some(MdWrapInfo::wrapping("PREMIS:EVENT", event)),
        })?);
        let root = doc.root();
        doc.append(root, amd_sec);

        let file_node = create_file(&FileInfo {
            id: file_ordinal,
            amd_id: amd,
            reference_event: true,
            loc_type: "URL".to_string(),
            other_loc_type: None,
            href: full_path,
            mime_type: Some(mime.to_string()),
            size: Some(file.file_size),
            checksum: Some(file.hash.clone()),
            checksum_type: Some(file.hash_algorithm.clone()),
            owner_id: Some(file.id.clone()),
        })?;

        let (pointer, content_ids, dmd_id) = match role {
            Role::Primary { dmd_id, division_ark } => {
                let range = TimeRange {
                    betype: TIME_RANGE_BETYPE.to_string(),
                    begin: TIME_RANGE_BEGIN.to_string(),
                    end: TIME_RANGE_END.to_string(),
                };
                (create_file_pointer(file_ordinal, Some(&range))?, division_ark, Some(*dmd_id))
            }
            Role::Associated { division_ark } => (create_file_pointer(file_ordinal, None)?, division_ark, None),
        };
        let division = create_div(&DivInfo {
            id: ids.next(IdSpace::Log)?,
            content_ids: content_ids.to_string(),
            type_label: division_type(mime).to_string(),
            dmd_id,
            adm_id: None,
            children: vec![pointer],
        })?;

        tracing::debug!(
            amd_id = %amd_id,
            file_id = %IdSpace::File.format(file_ordinal),
            filename = %file.filename,
            "Content file added"
        );
        Ok((file_node, division))
    }
}

/// Validate content files and resolve their MIME types.
fn prepare_files(files: &[ContentFile]) -> Result<Vec<String>> {
    files
        .iter()
        .map(|file| {
            file.validate()?;
            resolve_mime_type(file)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minter::SequentialMinter;
    use crate::query::{find_element_by_name, find_elements_by_name, struct_map_by_type};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn submission(primary: Vec<ContentFile>, associated: Vec<ContentFile>) -> Submission {
        Submission {
            collection: "audio".into(),
            agent_name: "sip-mets".into(),
            acquisition_note: "Received from donor".into(),
            submission_id: Ark::from("ark:/81055/sub1"),
            document_id: Ark::from("ark:/81055/doc1"),
            donor: "Jane Donor".into(),
            primary_files: primary,
            associated_files: associated,
        }
    }

    fn wav(name: &str) -> ContentFile {
        ContentFile::new(format!("id-{name}"), "/data", name)
            .with_size(1000)
            .with_hash("SHA256", "abc123")
    }

    struct CountingMinter {
        calls: Cell<usize>,
    }

    impl IdentifierMinter for CountingMinter {
        fn mint_batch(&self, count: usize) -> Result<Vec<Ark>> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..count).map(|n| Ark::new(format!("ark{n}"))).collect())
        }
    }

    struct FailingMinter;

    impl IdentifierMinter for FailingMinter {
        fn mint_batch(&self, _count: usize) -> Result<Vec<Ark>> {
            Err(MetsError::MinterService {
                url: "http://pii".into(),
                messages: vec!["500 - down".into()],
            })
        }
    }

    #[test]
    fn test_empty_primary_fails_before_minting() {
        let minter = CountingMinter { calls: Cell::new(0) };
        let err = PackageAssembler::new(&minter)
            .assemble(&submission(vec![], vec![wav("a.wav")]))
            .unwrap_err();
        assert!(matches!(err, MetsError::NoPrimaryFiles));
        assert_eq!(minter.calls.get(), 0);
    }

    #[test]
    fn test_invalid_file_fails_before_minting() {
        let minter = CountingMinter { calls: Cell::new(0) };
        let unhashed = ContentFile::new("f1", "/data", "a.wav");
        let err = PackageAssembler::new(&minter)
            .assemble(&submission(vec![unhashed], vec![]))
            .unwrap_err();
        assert!(matches!(err, MetsError::MissingField { ref field, .. } if field == "hash"));
        assert_eq!(minter.calls.get(), 0);
    }

    #[test]
    fn test_manifest_without_hash_algorithm_is_rejected() {
        let manifest = "\
collection: audio
agent_name: sip-mets
acquisition_note: Deposited
submission_id: sub
document_id: doc
donor: Jane Donor
primary_files:
  - id: f1
    filename: a.wav
    location: /data
    file_size: 1000
    hash: abc123
";
        let submission: Submission = serde_yaml_ng::from_str(manifest).unwrap();
        let minter = CountingMinter { calls: Cell::new(0) };
        let err = PackageAssembler::new(&minter).assemble(&submission).unwrap_err();

        assert!(matches!(err, MetsError::MissingField { ref field, .. } if field == "hash_algorithm"));
        assert_eq!(minter.calls.get(), 0);
    }

    #[test]
    fn test_no_associated_files_skips_third_batch() {
        let minter = CountingMinter { calls: Cell::new(0) };
        PackageAssembler::new(&minter)
            .assemble(&submission(vec![wav("a.wav")], vec![]))
            .unwrap();
        assert_eq!(minter.calls.get(), 2);
    }

    #[test]
    fn test_minter_failure_aborts() {
        let err = PackageAssembler::new(&FailingMinter)
            .assemble(&submission(vec![wav("a.wav")], vec![]))
            .unwrap_err();
        assert!(matches!(err, MetsError::MinterService { .. }));
    }

    #[test]
    fn test_single_track_layout() {
        let minter = SequentialMinter::new("ark");
        let package = PackageAssembler::new(&minter)
            .with_create_date(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
            .assemble(&submission(vec![wav("track.wav")], vec![]))
            .unwrap();
        let doc = &package.document;

        // dmd batch: ark1, ark2; division batch: ark3, ark4
        assert_eq!(package.recording_root, Ark::from("ark3"));
        assert_eq!(package.rights_id, "amd00000001-rights01");

        let top: Vec<&str> = doc.children(doc.root()).iter().map(|id| doc.local_name(*id)).collect();
        assert_eq!(
            top,
            vec!["metsHdr", "dmdSec", "dmdSec", "amdSec", "amdSec", "fileSec", "structMap"]
        );

        let file = doc.element_by_id("file00000001").unwrap();
        assert_eq!(
            doc.attribute(file, "ADMID"),
            Some("amd00000002-object01 amd00000002-event01")
        );
        assert_eq!(doc.attribute(file, "OWNERID"), Some("id-track.wav"));

        let event = doc.element_by_id("amd00000002-event01").unwrap();
        let date = find_element_by_name(doc, event, "eventDateTime").unwrap();
        assert_eq!(doc.text(date), Some("2024-03-01T12:00:00"));

        let map = struct_map_by_type(doc, "LOGICAL").unwrap();
        let divs = find_elements_by_name(doc, map, "div");
        assert_eq!(doc.attribute(divs[0], "ID"), Some("log00000001"));
        assert_eq!(doc.attribute(divs[0], "DMDID"), Some("dmd00000001"));
        assert_eq!(doc.attribute(divs[1], "ID"), Some("log00000002"));
        assert_eq!(doc.attribute(divs[1], "CONTENTIDS"), Some("ark4"));
        assert_eq!(doc.attribute(divs[1], "DMDID"), Some("dmd00000002"));
        assert_eq!(doc.attribute(divs[1], "TYPE"), Some("Recording"));
    }

    #[test]
    fn test_associated_division_has_no_dmd_reference() {
        let minter = SequentialMinter::new("ark");
        let scan = ContentFile::new("id-scan", "/data", "scan.jpg")
            .with_size(50)
            .with_hash("SHA256", "ff00");
        let package = PackageAssembler::new(&minter)
            .assemble(&submission(vec![wav("a.wav")], vec![scan]))
            .unwrap();
        let doc = &package.document;

        let div = doc.element_by_id("log00000003").unwrap();
        assert_eq!(doc.attribute(div, "DMDID"), None);
        assert_eq!(doc.attribute(div, "TYPE"), Some("Illustration"));
        assert_eq!(doc.attribute(div, "CONTENTIDS"), Some("ark5"));

        let fptr = doc.children(div)[0];
        assert_eq!(doc.attribute(fptr, "FILEID"), Some("file00000002"));
    }
}
