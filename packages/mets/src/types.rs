//! Core data types shared by the assembler, amendment engine and readers.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::validate_required;
use crate::error::Result;

/// Persistent identifier handed out by the minting service.
///
/// The value is opaque; it is only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ark(String);

impl Ark {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ark {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Ark {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A content file of a submission, already hashed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    /// Identifier recorded as the PREMIS object identifier.
    pub id: String,
    /// File name, e.g. `track.wav`.
    pub filename: String,
    /// Directory or URI prefix the file lives under.
    #[serde(default)]
    pub location: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Content hash, hex encoded.
    #[serde(default)]
    pub hash: String,
    /// Algorithm the hash was computed with, e.g. `SHA256`. Never assumed.
    #[serde(default)]
    pub hash_algorithm: String,
    /// MIME type; used when the extension is not recognised.
    #[serde(default)]
    pub mime_type: String,
}

impl ContentFile {
    pub fn new(id: impl Into<String>, location: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            location: location.into(),
            file_size: 0,
            hash: String::new(),
            hash_algorithm: String::new(),
            mime_type: String::new(),
        }
    }

    pub fn with_size(mut self, file_size: u64) -> Self {
        self.file_size = file_size;
        self
    }

    pub fn with_hash(mut self, algorithm: impl Into<String>, hash: impl Into<String>) -> Self {
        self.hash_algorithm = algorithm.into();
        self.hash = hash.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Location and file name joined, normalized to Unicode NFC.
    ///
    /// # Examples
    /// ```
    /// use sip_mets::types::ContentFile;
    ///
    /// assert_eq!(ContentFile::new("f1", "/data/in", "track.wav").full_path(), "/data/in/track.wav");
    /// assert_eq!(ContentFile::new("f1", "/data/in/", "track.wav").full_path(), "/data/in/track.wav");
    /// assert_eq!(ContentFile::new("f1", "", "track.wav").full_path(), "track.wav");
    /// ```
    #[must_use]
    pub fn full_path(&self) -> String {
        let joined = if self.location.is_empty() {
            self.filename.clone()
        } else if self.location.ends_with('/') || self.location.ends_with('\\') {
            format!("{}{}", self.location, self.filename)
        } else {
            format!("{}/{}", self.location, self.filename)
        };
        joined.nfc().collect()
    }

    /// Lower-cased extension of the file name, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// Check the fields a PREMIS object cannot do without.
    pub fn validate(&self) -> Result<()> {
        let context = format!("content file '{}'", self.filename);
        validate_required(&self.id, "id", &context)?;
        validate_required(&self.filename, "filename", &context)?;
        validate_required(&self.hash, "hash", &context)?;
        validate_required(&self.hash_algorithm, "hash_algorithm", &context)?;
        Ok(())
    }
}

/// Descriptive metadata kind of a dmdSec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptiveMetadata {
    /// Inline MARC record wrapper.
    Marc,
    /// Inline MODS record wrapper.
    Mods,
    /// Generic metadata with an empty payload placeholder.
    Other { other_md_type: Option<String> },
    /// Reference to metadata held elsewhere.
    External(MetadataReference),
}

/// Target of an external descriptive-metadata reference (`mdRef`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataReference {
    pub md_type: String,
    pub other_md_type: Option<String>,
    pub loc_type: String,
    pub other_loc_type: Option<String>,
    pub href: String,
}

impl MetadataReference {
    /// Reference to a SAMI catalogue record by ARK, as used for every
    /// described entity of a submission.
    pub fn sami(ark: &Ark) -> Self {
        Self {
            md_type: "OTHER".to_string(),
            other_md_type: Some("SAMI".to_string()),
            loc_type: "ARK".to_string(),
            other_loc_type: None,
            href: ark.to_string(),
        }
    }
}

/// One file of a document's inventory.
///
/// Readable either straight off the file element or through the PREMIS
/// object of the amdSec it references; both give the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    /// File element ID, e.g. `file00000001`.
    pub id: String,
    /// Location the file element points at.
    pub location: String,
    pub checksum: String,
    pub checksum_type: String,
    pub size: u64,
    pub mime_type: String,
    /// First ADMID token, e.g. `amd00000002-object01`.
    pub adm_id: String,
    /// Persistent identifier of the file.
    pub ark: String,
}

impl InventoryEntry {
    /// ID of the amdSec describing this file.
    #[must_use]
    pub fn amd_base_id(&self) -> &str {
        crate::ids::base_id(&self.adm_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetsError;

    #[test]
    fn test_full_path_normalizes_to_nfc() {
        // "e" followed by a combining acute accent
        let file = ContentFile::new("f1", "/data", "caf\u{0065}\u{0301}.wav");
        assert_eq!(file.full_path(), "/data/caf\u{00e9}.wav");
    }

    #[test]
    fn test_extension() {
        assert_eq!(
            ContentFile::new("f1", "", "Track.WAV").extension(),
            Some("wav".to_string())
        );
        assert_eq!(ContentFile::new("f1", "", "README").extension(), None);
        assert_eq!(ContentFile::new("f1", "", "odd.").extension(), None);
    }

    #[test]
    fn test_validate_requires_hash() {
        let file = ContentFile::new("f1", "/data", "track.wav").with_size(10);
        assert!(file.validate().is_err());

        let file = file.with_hash("SHA256", "abc123");
        assert!(file.validate().is_ok());
    }

    #[test]
    fn test_deserialize_leaves_hash_algorithm_unset() {
        let file: ContentFile =
            serde_yaml_ng::from_str("id: f1\nfilename: a.wav\nfile_size: 5\nhash: ff").unwrap();
        assert_eq!(file.hash_algorithm, "");
        assert_eq!(file.location, "");

        let err = file.validate().unwrap_err();
        assert!(matches!(err, MetsError::MissingField { ref field, .. } if field == "hash_algorithm"));
    }

    #[test]
    fn test_inventory_amd_base_id() {
        let entry = InventoryEntry {
            id: "file00000001".into(),
            location: "/data/a.wav".into(),
            checksum: "ff".into(),
            checksum_type: "SHA256".into(),
            size: 5,
            mime_type: "audio/x-wav".into(),
            adm_id: "amd00000002-object01".into(),
            ark: "f1".into(),
        };
        assert_eq!(entry.amd_base_id(), "amd00000002");
    }
}
