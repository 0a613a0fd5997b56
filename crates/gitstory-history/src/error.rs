use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("No Git repository found at {}", path.display())]
    NoRepository { path: PathBuf },
    #[error("No commits reachable from '{reference}'")]
    EmptyHistory { reference: String },
    #[error("'{reference}' does not resolve to a commit")]
    MalformedReference { reference: String },
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

impl HistoryError {
    /// Process exit code reserved for each failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            HistoryError::NoRepository { .. } => 2,
            HistoryError::EmptyHistory { .. } => 3,
            HistoryError::MalformedReference { .. } => 4,
            HistoryError::Git(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            HistoryError::NoRepository {
                path: PathBuf::from("/tmp"),
            }
            .exit_code(),
            HistoryError::EmptyHistory {
                reference: "HEAD".into(),
            }
            .exit_code(),
            HistoryError::MalformedReference {
                reference: "nope".into(),
            }
            .exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4]);
    }
}
