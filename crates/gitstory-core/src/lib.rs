use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod geometry;

pub use config::{
    CameraConfig, ConfigError, EdgeConfig, LabelConfig, LayoutConfig, StoryConfig,
};
pub use geometry::{Rect, Vec2};

/// Full object hash of a commit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display prefix of the hash, never longer than the hash itself.
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CommitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A commit as materialized by a history provider. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNode {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    pub message: String,
    /// Commit time in seconds since the epoch.
    pub timestamp: i64,
}

impl CommitNode {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Order in which the commit graph is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TraversalDirection {
    /// Oldest commit first, walking child links.
    #[default]
    Forward,
    /// Start reference first, walking parent links.
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefLabel {
    Head,
    Branch(String),
    Tag(String),
}

impl RefLabel {
    pub fn text(&self) -> &str {
        match self {
            RefLabel::Head => "HEAD",
            RefLabel::Branch(name) | RefLabel::Tag(name) => name,
        }
    }
}

/// A named pointer to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefTarget {
    pub name: String,
    pub target: CommitId,
}

impl RefTarget {
    pub fn new(name: impl Into<String>, target: impl Into<CommitId>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// HEAD plus every branch and tag, in the order the provider reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefSnapshot {
    pub head: Option<CommitId>,
    pub branches: Vec<RefTarget>,
    pub tags: Vec<RefTarget>,
}

impl RefSnapshot {
    pub fn is_head(&self, id: &CommitId) -> bool {
        self.head.as_ref() == Some(id)
    }

    pub fn branches_at<'a>(&'a self, id: &'a CommitId) -> impl Iterator<Item = &'a str> + 'a {
        self.branches
            .iter()
            .filter(move |r| &r.target == id)
            .map(|r| r.name.as_str())
    }

    pub fn tags_at<'a>(&'a self, id: &'a CommitId) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |r| &r.target == id)
            .map(|r| r.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_truncates() {
        let id = CommitId::new("0123456789abcdef");
        assert_eq!(id.short(6), "012345");
        assert_eq!(CommitId::new("abc").short(6), "abc");
    }

    #[test]
    fn test_ref_snapshot_preserves_provider_order() {
        let snapshot = RefSnapshot {
            head: Some(CommitId::new("c1")),
            branches: vec![
                RefTarget::new("main", "c1"),
                RefTarget::new("dev", "c2"),
                RefTarget::new("feature", "c1"),
            ],
            tags: vec![RefTarget::new("v1.0", "c1")],
        };
        let id = CommitId::new("c1");
        assert!(snapshot.is_head(&id));
        assert_eq!(
            snapshot.branches_at(&id).collect::<Vec<_>>(),
            vec!["main", "feature"]
        );
        assert_eq!(snapshot.tags_at(&id).collect::<Vec<_>>(), vec!["v1.0"]);
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&TraversalDirection::Backward).unwrap();
        assert_eq!(json, "\"backward\"");
    }
}
