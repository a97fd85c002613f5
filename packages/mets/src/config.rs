//! Configuration constants, validation functions and minter settings.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{MetsError, Result};

/// Largest ordinal any of the `dmd`, `amd`, `file` and `log` ID spaces can hold.
pub const ID_MAX: u64 = 99_999_999;

/// Zero-padding width of the global ID spaces.
pub const ID_WIDTH: usize = 8;

/// Largest local ordinal of an entry nested in an amdSec (`-event99`).
pub const LOCAL_ORDINAL_MAX: u32 = 99;

/// Exclusive upper bound on the number of identifiers in one minting request.
pub const MINT_BATCH_LIMIT: usize = 1_000_000;

/// HTTP timeout in seconds for the minting service.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Timestamp format of `metsHdr/@CREATEDATE`.
pub const CREATE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Timestamp format of PREMIS `eventDateTime`.
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Division type used when a MIME type has no known mapping.
pub const UNKNOWN_DIVISION_TYPE: &str = "Error MimeType Not Found";

/// Time-code scheme of the area pointer on primary files.
pub const TIME_RANGE_BETYPE: &str = "SMPTE-25";

/// All recordings start at zero.
pub const TIME_RANGE_BEGIN: &str = "00:00:00:00";

/// Open-ended end marker, resolved once characterisation knows the duration.
pub const TIME_RANGE_END: &str = "duration";

/// ODRL policy type of the rights section.
pub const ODRL_POLICY_TYPE: &str = "http://www.w3.org/ns/odrl/2/set";

/// Parent policy every submission inherits from.
pub const ODRL_INHERIT_FROM: &str = "http://bl.uk/rights/raqs/17.4/";

/// Schema location of the ODRL policy element.
pub const ODRL_SCHEMA_LOCATION: &str =
    "http://www.w3.org/ns/odrl/2/ http://www.w3.org/ns/odrl/2/ODRL21.xsd";

/// Fixed rights statement written into every rights section.
pub const RIGHTS_STATEMENT: &str = "Except as otherwise permitted under your national copyright law this material may not be copied or distributed further.";

/// Provenance statement written into every rights section.
pub const RIGHTS_PROVENANCE: &str = "British Library MSP Portal";

/// Minter hostname: host or host:port.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HOSTNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?(:\d{1,5})?$").expect("valid regex")
});

/// Minter namespace: the NAAN or a shoulder path such as `81055/vdc`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAMESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+(/[A-Za-z0-9_]+)*$").expect("valid regex"));

/// Validate that a section ordinal fits the eight-digit ID spaces.
///
/// # Arguments
/// * `field` - Name used in the error message
/// * `value` - Ordinal to check
///
/// # Examples
/// ```
/// use sip_mets::config::validate_id;
///
/// assert!(validate_id("file.id", 1).is_ok());
/// assert!(validate_id("file.id", 100_000_000).is_err());
/// ```
pub fn validate_id(field: &str, value: u64) -> Result<()> {
    if value > ID_MAX {
        return Err(MetsError::IdOutOfRange {
            field: field.to_string(),
            value,
            max: ID_MAX,
        });
    }
    Ok(())
}

/// Validate that a required string is not empty or blank.
pub fn validate_required(value: &str, field: &str, context: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MetsError::missing(field, context));
    }
    Ok(())
}

/// Settings of the persistent-identifier minting service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MinterConfig {
    /// Host (and optional port) of the PII service.
    pub hostname: String,
    /// Minting namespace, e.g. `81055/vdc`.
    pub namespace: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    HTTP_TIMEOUT_SECS
}

impl MinterConfig {
    pub fn new(hostname: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            namespace: namespace.into(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Read settings from `ARK_MINTER_HOSTNAME`, `ARK_MINTER_NAMESPACE` and
    /// the optional `ARK_MINTER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let hostname = std::env::var("ARK_MINTER_HOSTNAME")
            .map_err(|_| MetsError::Config("ARK_MINTER_HOSTNAME not set".into()))?;
        let namespace = std::env::var("ARK_MINTER_NAMESPACE")
            .map_err(|_| MetsError::Config("ARK_MINTER_NAMESPACE not set".into()))?;
        let timeout_secs = std::env::var("ARK_MINTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(HTTP_TIMEOUT_SECS);

        let config = Self {
            hostname,
            namespace,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a YAML file with `hostname`, `namespace` and an
    /// optional `timeout_secs`.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check hostname and namespace shape and a non-zero timeout.
    pub fn validate(&self) -> Result<()> {
        if !HOSTNAME_PATTERN.is_match(&self.hostname) {
            return Err(MetsError::Config(format!(
                "invalid minter hostname '{}'",
                self.hostname
            )));
        }
        if !NAMESPACE_PATTERN.is_match(&self.namespace) {
            return Err(MetsError::Config(format!(
                "invalid minter namespace '{}'",
                self.namespace
            )));
        }
        if self.timeout_secs == 0 {
            return Err(MetsError::Config("minter timeout must be positive".into()));
        }
        Ok(())
    }

    /// Minting URL for a batch of `count` identifiers.
    ///
    /// # Examples
    /// ```
    /// use sip_mets::config::MinterConfig;
    ///
    /// let config = MinterConfig::new("pii.example.org", "81055");
    /// assert_eq!(config.mint_url(3), "http://pii.example.org/pii/81055?arks=3");
    /// ```
    #[must_use]
    pub fn mint_url(&self, count: usize) -> String {
        format!(
            "http://{}/pii/{}?arks={count}",
            self.hostname, self.namespace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_id_bounds() {
        assert!(validate_id("dmdSec.id", 0).is_ok());
        assert!(validate_id("dmdSec.id", ID_MAX).is_ok());

        let err = validate_id("dmdSec.id", ID_MAX + 1).unwrap_err();
        assert!(matches!(err, MetsError::IdOutOfRange { value, .. } if value == ID_MAX + 1));
    }

    #[test]
    fn test_validate_required_rejects_blank() {
        assert!(validate_required("SHA256", "hash_algorithm", "file").is_ok());
        assert!(validate_required("", "hash_algorithm", "file").is_err());
        assert!(validate_required("   ", "hash_algorithm", "file").is_err());
    }

    #[test]
    fn test_minter_config_validation() {
        assert!(MinterConfig::new("pii.bl.uk", "81055").validate().is_ok());
        assert!(MinterConfig::new("localhost:8080", "81055/vdc")
            .validate()
            .is_ok());
        assert!(MinterConfig::new("", "81055").validate().is_err());
        assert!(MinterConfig::new("http://pii.bl.uk", "81055")
            .validate()
            .is_err());
        assert!(MinterConfig::new("pii.bl.uk", "81055?arks=9")
            .validate()
            .is_err());
        assert!(MinterConfig::new("pii.bl.uk", "81055")
            .with_timeout_secs(0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_minter_config_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hostname: pii.bl.uk\nnamespace: \"81055\"").unwrap();

        let config = MinterConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.hostname, "pii.bl.uk");
        assert_eq!(config.namespace, "81055");
        assert_eq!(config.timeout_secs, HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_minter_config_yaml_timeout_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "hostname: pii.bl.uk\nnamespace: 81055/vdc\ntimeout_secs: 5"
        )
        .unwrap();

        let config = MinterConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
    }
}
