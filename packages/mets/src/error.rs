//! Error types for package assembly and amendment.
//!
//! `MetsError` groups four kinds of failure: validation of builder input,
//! structural lookups during amendment or inventory, the identifier minting
//! service, and the shape of the submission itself. Every kind is terminal for
//! the call that raised it; no partially built document is ever returned.

use thiserror::Error;

/// Main error type for the crate.
#[derive(Debug, Error)]
pub enum MetsError {
    /// A required field on a builder parameter struct or content file is empty.
    #[error("Missing required field: {field} ({context})")]
    MissingField { field: String, context: String },

    /// A numeric section ID is outside the allowed range.
    #[error("{field} must be between 0 and {max}, got {value}")]
    IdOutOfRange { field: String, value: u64, max: u64 },

    /// The submission has no primary content files.
    #[error("Submission has no primary content files")]
    NoPrimaryFiles,

    /// No amdSec carries the requested base ID.
    #[error("amdSec with ID {amd_id} for file {location} not found")]
    AmdSecNotFound { amd_id: String, location: String },

    /// No file node references the requested amdSec.
    #[error("No file element references amdSec {amd_id}")]
    FileNotFound { amd_id: String },

    /// A file node has no ADMID attribute to extend.
    #[error("File element {file_id} has no ADMID attribute")]
    AdmIdMissing { file_id: String },

    /// The two-digit local ordinal space of an amdSec is used up.
    #[error("No free {kind} ordinal left in {amd_id} (maximum {max})")]
    OrdinalOverflow {
        amd_id: String,
        kind: String,
        max: u32,
    },

    /// An expected element is absent.
    #[error("Missing element <{element}> in {context}")]
    ElementNotFound { element: String, context: String },

    /// No fileGrp with the requested USE value.
    #[error("Could not find a fileGrp element with USE of {0}")]
    FileGroupNotFound(String),

    /// The fileGrp exists but holds no file nodes.
    #[error("Could not find any file elements in the fileGrp with USE of {0}")]
    EmptyFileGroup(String),

    /// A numeric value in a document could not be parsed.
    #[error("Invalid number '{value}' in {context}")]
    InvalidNumber { value: String, context: String },

    /// The minter returned fewer identifiers than requested.
    #[error("Minter returned {received} identifiers, {requested} requested")]
    ShortBatch { requested: usize, received: usize },

    /// Batch size outside what the minter accepts.
    #[error("Invalid batch size {0}: must be greater than 0 and less than 1,000,000")]
    InvalidBatchSize(usize),

    /// The minting service reported errors in its response.
    #[error("Minting service at {url} reported: {}", .messages.join("; "))]
    MinterService { url: String, messages: Vec<String> },

    /// All retry attempts exhausted.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// XML writing failed.
    #[error("XML writing failed: {0}")]
    XmlWrite(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MetsError {
    /// Shorthand for a [`MetsError::MissingField`].
    pub fn missing(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, MetsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amd_sec_not_found_names_base_id() {
        let err = MetsError::AmdSecNotFound {
            amd_id: "amd00000007".to_string(),
            location: "/data/track.wav".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "amdSec with ID amd00000007 for file /data/track.wav not found"
        );
    }

    #[test]
    fn test_minter_service_joins_messages() {
        let err = MetsError::MinterService {
            url: "http://minter/pii/81055".to_string(),
            messages: vec!["E1 - bad namespace".to_string(), "E2 - quota".to_string()],
        };
        assert!(err.to_string().ends_with("E1 - bad namespace; E2 - quota"));
    }

    #[test]
    fn test_missing_field_shorthand() {
        let err = MetsError::missing("hash", "content file track.wav");
        assert_eq!(
            err.to_string(),
            "Missing required field: hash (content file track.wav)"
        );
    }
}
