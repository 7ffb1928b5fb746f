use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the log time averager.
#[derive(Error, Debug)]
pub enum AveragerError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// None of the candidate encodings could decode the file.
    #[error("Failed to decode {path} (tried {attempted})")]
    Decode { path: PathBuf, attempted: String },

    /// A timestamp string did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A result could not be serialized to JSON.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the averager crates.
pub type Result<T> = std::result::Result<T, AveragerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AveragerError::FileRead {
            path: PathBuf::from("/logs/run.log"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/logs/run.log"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_decode() {
        let err = AveragerError::Decode {
            path: PathBuf::from("/logs/blob.bin"),
            attempted: "utf-8, utf-16".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode /logs/blob.bin (tried utf-8, utf-16)"
        );
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = AveragerError::TimestampParse("2024-13-01 25:00:00".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid timestamp format: 2024-13-01 25:00:00"
        );
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AveragerError = json_err.into();
        assert!(err.to_string().contains("Failed to serialize JSON"));
    }
}
