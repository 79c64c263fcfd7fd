use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the tillpoint crates.
#[derive(Error, Debug)]
pub enum TillError {
    /// A backing store could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A backing store could not be written back to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV row could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A date or time string did not match the expected store format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// Clock-in attempted while an open attendance record exists.
    #[error("Employee {0} already has an open attendance record")]
    AlreadyClockedIn(String),

    /// Clock-out attempted with no open attendance record on file.
    #[error("No open attendance record for employee {0}")]
    NoOpenSession(String),

    /// An employee identifier is not present in the staff store.
    #[error("Unknown employee: {0}")]
    UnknownEmployee(String),

    /// Login attempted with an id/password pair that matches no staff row.
    #[error("Invalid employee id or password")]
    InvalidCredentials,

    /// Registration attempted with an employee id already on file.
    #[error("Employee id {0} is already registered")]
    DuplicateEmployee(String),

    /// A model identifier is not present in the inventory.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// A sale asked for more units than the home outlet holds.
    #[error("Insufficient stock for {model}: requested {requested}, available {available}")]
    InsufficientStock {
        model: String,
        requested: u32,
        available: u32,
    },

    /// An outlet code is not a column of the model store.
    #[error("Unknown outlet code: {0}")]
    UnknownOutlet(String),

    /// A sale lookup by reference matched nothing.
    #[error("No sale found with reference {0}")]
    SaleNotFound(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the tillpoint crates.
pub type Result<T> = std::result::Result<T, TillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = TillError::FileRead {
            path: PathBuf::from("/some/attendance.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/attendance.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_file_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = TillError::FileWrite {
            path: PathBuf::from("/some/model.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to write file"));
        assert!(msg.contains("/some/model.csv"));
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = TillError::TimestampParse("not-a-time".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp format: not-a-time");
    }

    #[test]
    fn test_error_display_already_clocked_in() {
        let err = TillError::AlreadyClockedIn("E001".to_string());
        assert_eq!(
            err.to_string(),
            "Employee E001 already has an open attendance record"
        );
    }

    #[test]
    fn test_error_display_no_open_session() {
        let err = TillError::NoOpenSession("E001".to_string());
        assert_eq!(
            err.to_string(),
            "No open attendance record for employee E001"
        );
    }

    #[test]
    fn test_error_display_unknown_employee() {
        let err = TillError::UnknownEmployee("E404".to_string());
        assert_eq!(err.to_string(), "Unknown employee: E404");
    }

    #[test]
    fn test_error_display_invalid_credentials() {
        let err = TillError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid employee id or password");
    }

    #[test]
    fn test_error_display_duplicate_employee() {
        let err = TillError::DuplicateEmployee("E001".to_string());
        assert_eq!(err.to_string(), "Employee id E001 is already registered");
    }

    #[test]
    fn test_error_display_unknown_model() {
        let err = TillError::UnknownModel("X99".to_string());
        assert_eq!(err.to_string(), "Unknown model: X99");
    }

    #[test]
    fn test_error_display_insufficient_stock() {
        let err = TillError::InsufficientStock {
            model: "A10".to_string(),
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for A10: requested 5, available 2"
        );
    }

    #[test]
    fn test_error_display_unknown_outlet() {
        let err = TillError::UnknownOutlet("C99".to_string());
        assert_eq!(err.to_string(), "Unknown outlet code: C99");
    }

    #[test]
    fn test_error_display_sale_not_found() {
        let err = TillError::SaleNotFound("2024-03-01 10:15".to_string());
        assert_eq!(err.to_string(), "No sale found with reference 2024-03-01 10:15");
    }

    #[test]
    fn test_error_display_config() {
        let err = TillError::Config("missing outlet code".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing outlet code");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TillError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: TillError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
