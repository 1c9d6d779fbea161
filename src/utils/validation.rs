use std::path::Path;
use thiserror::Error;

/// Spreadsheet extensions accepted for import (compared lowercase, without the dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Declared content types accepted for import
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

/// Body returned to the client for any rejected file type
pub const EXCEL_ONLY_MESSAGE: &str = "Error: Excel Files Only!";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("extension {0:?} is not an accepted spreadsheet extension")]
    Extension(String),

    #[error("content type {0:?} is not an accepted spreadsheet type")]
    MimeType(String),
}

/// Lowercased extension of `filename`, without the leading dot
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

pub fn validate_extension(filename: &str) -> Result<(), ValidationError> {
    match extension_of(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ValidationError::Extension(ext)),
        None => Err(ValidationError::Extension(String::new())),
    }
}

/// Validates a declared content type, ignoring parameters such as `; charset=`
pub fn validate_mime_type(content_type: Option<&str>) -> Result<(), ValidationError> {
    let declared = content_type.unwrap_or_default();
    let normalized = declared
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if ALLOWED_MIME_TYPES.contains(&normalized.as_str()) {
        return Ok(());
    }

    Err(ValidationError::MimeType(declared.to_string()))
}

/// A file is accepted only when both its extension and its content type match.
pub fn validate_spreadsheet(
    filename: &str,
    content_type: Option<&str>,
) -> Result<(), ValidationError> {
    validate_extension(filename)?;
    validate_mime_type(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
    const XLS_MIME: &str = "application/vnd.ms-excel";

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("report.xlsx").is_ok());
        assert!(validate_extension("legacy.xls").is_ok());
        assert!(validate_extension("SHOUTING.XLSX").is_ok());

        assert!(validate_extension("macro.xlsm").is_err());
        assert!(validate_extension("data.csv").is_err());
        assert!(validate_extension("xlsx").is_err());
        assert!(validate_extension("archive.xlsx.zip").is_err());
    }

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type(Some(XLSX_MIME)).is_ok());
        assert!(validate_mime_type(Some(XLS_MIME)).is_ok());
        assert!(validate_mime_type(Some("Application/Vnd.MS-Excel; charset=binary")).is_ok());

        assert!(validate_mime_type(Some("application/octet-stream")).is_err());
        assert!(validate_mime_type(Some("text/csv")).is_err());
        assert!(validate_mime_type(None).is_err());
    }

    #[test]
    fn test_both_checks_must_pass() {
        assert!(validate_spreadsheet("people.xlsx", Some(XLSX_MIME)).is_ok());
        assert!(validate_spreadsheet("people.xls", Some(XLSX_MIME)).is_ok());

        assert_eq!(
            validate_spreadsheet("people.csv", Some(XLSX_MIME)),
            Err(ValidationError::Extension("csv".into()))
        );
        assert_eq!(
            validate_spreadsheet("people.xlsx", Some("text/plain")),
            Err(ValidationError::MimeType("text/plain".into()))
        );
        assert!(validate_spreadsheet("people.txt", Some("text/plain")).is_err());
    }
}
