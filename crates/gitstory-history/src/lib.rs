pub mod error;
pub mod git;
pub mod memory;
pub mod window;

pub use error::HistoryError;
pub use git::GitHistory;
pub use memory::InMemoryHistory;
pub use window::{ChildAdjacency, HistoryWindow, WindowOptions};

use gitstory_core::{CommitNode, RefSnapshot};

/// Source of commits and refs. Implementations perform their I/O here and
/// nowhere else; the engine never calls back into a provider after the
/// window has been built.
pub trait HistoryProvider {
    /// Commits reachable from `start`, newest first, truncated to `limit`.
    fn commits(&self, start: &str, limit: usize) -> Result<Vec<CommitNode>, HistoryError>;

    /// HEAD plus every local branch and tag.
    fn refs(&self) -> Result<RefSnapshot, HistoryError>;
}
