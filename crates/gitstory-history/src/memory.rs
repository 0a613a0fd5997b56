use crate::{HistoryError, HistoryProvider};
use gitstory_core::{CommitId, CommitNode, RefSnapshot, RefTarget};
use std::collections::{HashMap, HashSet};

/// History held entirely in memory. Commits must be added oldest first; a
/// commit's insertion index doubles as its timestamp.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    commits: Vec<CommitNode>,
    index: HashMap<CommitId, usize>,
    refs: RefSnapshot,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(mut self, id: &str, parents: &[&str], message: &str) -> Self {
        let node = CommitNode {
            id: CommitId::new(id),
            parents: parents.iter().map(|p| CommitId::new(*p)).collect(),
            message: message.to_string(),
            timestamp: self.commits.len() as i64,
        };
        self.index.insert(node.id.clone(), self.commits.len());
        self.commits.push(node);
        self
    }

    /// Append a linear chain `prefix0 <- prefix1 <- ...` of `count` commits.
    pub fn linear(mut self, prefix: &str, count: usize) -> Self {
        for i in 0..count {
            let id = format!("{prefix}{i}");
            let parent = (i > 0).then(|| format!("{prefix}{}", i - 1));
            let parents: Vec<&str> = parent.as_deref().into_iter().collect();
            self = self.commit(&id, &parents, &format!("commit {i}"));
        }
        self
    }

    pub fn with_head(mut self, id: &str) -> Self {
        self.refs.head = Some(CommitId::new(id));
        self
    }

    pub fn with_branch(mut self, name: &str, id: &str) -> Self {
        self.refs.branches.push(RefTarget::new(name, id));
        self
    }

    pub fn with_tag(mut self, name: &str, id: &str) -> Self {
        self.refs.tags.push(RefTarget::new(name, id));
        self
    }

    fn resolve(&self, start: &str) -> Option<&CommitId> {
        if start == "HEAD" {
            return self.refs.head.as_ref();
        }
        if let Some(&idx) = self.index.get(&CommitId::new(start)) {
            return Some(&self.commits[idx].id);
        }
        self.refs
            .branches
            .iter()
            .chain(self.refs.tags.iter())
            .find(|r| r.name == start)
            .map(|r| &r.target)
    }
}

impl HistoryProvider for InMemoryHistory {
    fn commits(&self, start: &str, limit: usize) -> Result<Vec<CommitNode>, HistoryError> {
        if self.commits.is_empty() {
            return Err(HistoryError::EmptyHistory {
                reference: start.to_string(),
            });
        }
        let tip = self
            .resolve(start)
            .filter(|id| self.index.contains_key(*id))
            .ok_or_else(|| HistoryError::MalformedReference {
                reference: start.to_string(),
            })?;

        let mut reachable = HashSet::new();
        let mut stack = vec![tip.clone()];
        while let Some(id) = stack.pop() {
            let Some(&idx) = self.index.get(&id) else {
                continue;
            };
            if reachable.insert(idx) {
                stack.extend(self.commits[idx].parents.iter().cloned());
            }
        }

        let mut order: Vec<usize> = reachable.into_iter().collect();
        order.sort_unstable_by(|a, b| b.cmp(a));
        Ok(order
            .into_iter()
            .take(limit)
            .map(|idx| self.commits[idx].clone())
            .collect())
    }

    fn refs(&self) -> Result<RefSnapshot, HistoryError> {
        Ok(self.refs.clone())
    }
}
