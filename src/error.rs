use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docdiff operations
#[derive(Error, Debug)]
pub enum DocdiffError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to locate files: {0}")]
    Locate(String),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Diff tool '{program}' could not be started: {source}")]
    DiffUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Diff tool '{program}' failed with status {code:?}: {stderr}")]
    DiffFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocdiffError {
    /// Errors that leave no point in processing further pairs
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DocdiffError::Config(_)
                | DocdiffError::Locate(_)
                | DocdiffError::Glob(_)
                | DocdiffError::DiffUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DocdiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let unavailable = DocdiffError::DiffUnavailable {
            program: "git".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(unavailable.is_fatal());
        assert!(DocdiffError::Locate("no root".to_string()).is_fatal());

        let read = DocdiffError::Read {
            path: PathBuf::from("master/a.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!read.is_fatal());
        assert!(read.to_string().contains("master/a.html"));

        let failed = DocdiffError::DiffFailed {
            program: "git".to_string(),
            code: Some(128),
            stderr: "fatal".to_string(),
        };
        assert!(!failed.is_fatal());
    }
}
