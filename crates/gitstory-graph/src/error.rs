use gitstory_core::ConfigError;
use gitstory_history::HistoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl StoryError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StoryError::Config(_) => 1,
            StoryError::History(err) => err.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_errors_keep_their_exit_code() {
        let err: StoryError = HistoryError::MalformedReference {
            reference: "nope".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 4);
        assert_eq!(StoryError::from(ConfigError::ZeroCommits).exit_code(), 1);
    }
}
