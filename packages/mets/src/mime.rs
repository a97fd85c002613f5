//! MIME types of content files and the division types derived from them.

use crate::config::UNKNOWN_DIVISION_TYPE;
use crate::error::{MetsError, Result};
use crate::types::ContentFile;

/// MIME type for a lower-cased file extension.
#[must_use]
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        "wav" => "audio/x-wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "png" => "image/png",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "xml" => "text/xml",
        _ => return None,
    };
    Some(mime)
}

/// MIME type of a content file.
///
/// The extension wins; a file with an unknown extension keeps the MIME type
/// it was supplied with, and a file with neither is rejected.
pub fn resolve_mime_type(file: &ContentFile) -> Result<String> {
    if let Some(mime) = file.extension().as_deref().and_then(mime_type_for_extension) {
        return Ok(mime.to_string());
    }
    if !file.mime_type.trim().is_empty() {
        return Ok(file.mime_type.clone());
    }
    Err(MetsError::missing(
        "mime_type",
        format!("content file '{}' has no recognised extension", file.filename),
    ))
}

/// Structural division type for a MIME type.
///
/// Unmapped types get [`UNKNOWN_DIVISION_TYPE`] so they stand out in review
/// rather than passing as a plausible type.
///
/// # Examples
/// ```
/// use sip_mets::mime::division_type;
///
/// assert_eq!(division_type("image/jpeg"), "Illustration");
/// assert_eq!(division_type("video/mp4"), "Error MimeType Not Found");
/// ```
#[must_use]
pub fn division_type(mime_type: &str) -> &'static str {
    match mime_type {
        "application/pdf" => "Monograph",
        "text/plain" => "Text",
        "image/jpeg" => "Illustration",
        m if m.starts_with("audio/") => "Recording",
        _ => UNKNOWN_DIVISION_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_takes_precedence() {
        let file = ContentFile::new("f1", "/in", "scan.JPG").with_mime_type("application/octet-stream");
        assert_eq!(resolve_mime_type(&file).unwrap(), "image/jpeg");
    }

    #[test]
    fn test_falls_back_to_supplied_mime_type() {
        let file = ContentFile::new("f1", "/in", "notes.bin").with_mime_type("application/x-notes");
        assert_eq!(resolve_mime_type(&file).unwrap(), "application/x-notes");
    }

    #[test]
    fn test_unknown_without_mime_type_is_missing_field() {
        let file = ContentFile::new("f1", "/in", "notes.bin");
        let err = resolve_mime_type(&file).unwrap_err();
        assert!(matches!(err, MetsError::MissingField { ref field, .. } if field == "mime_type"));
    }

    #[test]
    fn test_division_types() {
        assert_eq!(division_type("application/pdf"), "Monograph");
        assert_eq!(division_type("text/plain"), "Text");
        assert_eq!(division_type("audio/x-wav"), "Recording");
        assert_eq!(division_type("image/tiff"), UNKNOWN_DIVISION_TYPE);
        assert_eq!(division_type(""), UNKNOWN_DIVISION_TYPE);
    }
}
