use crate::{HistoryError, HistoryProvider};
use gitstory_core::{CommitId, CommitNode, StoryConfig, TraversalDirection};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub start_ref: String,
    pub requested: usize,
    pub direction: TraversalDirection,
    pub invert_branches: bool,
}

impl WindowOptions {
    pub fn from_config(config: &StoryConfig) -> Self {
        Self {
            start_ref: config.start_ref.clone(),
            requested: config.commits,
            direction: config.direction,
            invert_branches: config.invert_branches,
        }
    }
}

/// Parent id to child ids, derived from the parent pointers of a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildAdjacency {
    children: HashMap<CommitId, Vec<CommitId>>,
}

impl ChildAdjacency {
    /// Children end up in the order their commits are yielded, so pass
    /// commits oldest first to get chronological child lists.
    pub fn build<'a>(commits: impl IntoIterator<Item = &'a CommitNode>) -> Self {
        let mut children: HashMap<CommitId, Vec<CommitId>> = HashMap::new();
        for commit in commits {
            for parent in &commit.parents {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(commit.id.clone());
            }
        }
        Self { children }
    }

    /// Children of `id`; a commit nobody descends from is a leaf, not an error.
    pub fn children(&self, id: &CommitId) -> &[CommitId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_child(&self, id: &CommitId) -> Option<&CommitId> {
        self.children(id).first()
    }

    /// Reverse every list with more than one child.
    pub fn invert_branches(&mut self) {
        for kids in self.children.values_mut() {
            if kids.len() > 1 {
                kids.reverse();
            }
        }
    }

    /// Hops taken by repeatedly following the first child from `root`.
    pub fn chain_length(&self, root: &CommitId) -> usize {
        let mut seen = HashSet::from([root]);
        let mut current = root;
        let mut length = 0;
        while let Some(next) = self.first_child(current) {
            if !seen.insert(next) {
                break;
            }
            length += 1;
            current = next;
        }
        length
    }
}

/// The bounded slice of history a story is told from.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    commits: Vec<CommitNode>,
    index: HashMap<CommitId, usize>,
    children: ChildAdjacency,
    visible: usize,
    direction: TraversalDirection,
}

impl HistoryWindow {
    pub fn build<P>(provider: &P, options: &WindowOptions) -> Result<Self, HistoryError>
    where
        P: HistoryProvider + ?Sized,
    {
        let requested = options.requested.max(1);
        let mut commits = provider.commits(&options.start_ref, requested)?;
        if commits.is_empty() {
            return Err(HistoryError::EmptyHistory {
                reference: options.start_ref.clone(),
            });
        }
        let visible = requested.min(commits.len());

        let children = match options.direction {
            TraversalDirection::Backward => ChildAdjacency::build(commits.iter().rev()),
            TraversalDirection::Forward => {
                commits.reverse();
                let mut children = ChildAdjacency::build(&commits);

                let mut extra = 1;
                while children.chain_length(&commits[0].id) + 1 < visible {
                    let mut widened = provider.commits(&options.start_ref, requested + extra)?;
                    if widened.len() <= commits.len() {
                        tracing::warn!(
                            "history exhausted at {} commits before a chain of {} was found",
                            commits.len(),
                            visible
                        );
                        break;
                    }
                    widened.reverse();
                    children = ChildAdjacency::build(&widened);
                    commits = widened;
                    extra += 1;
                }

                if options.invert_branches {
                    children.invert_branches();
                }
                children
            }
        };

        let index = commits
            .iter()
            .enumerate()
            .map(|(i, commit)| (commit.id.clone(), i))
            .collect();

        tracing::info!(
            "history window: {} commits loaded, {} visible",
            commits.len(),
            visible
        );

        Ok(Self {
            commits,
            index,
            children,
            visible,
            direction: options.direction,
        })
    }

    /// Where traversal begins: the oldest commit going forward, the start
    /// reference going backward.
    pub fn root(&self) -> &CommitNode {
        &self.commits[0]
    }

    pub fn get(&self, id: &CommitId) -> Option<&CommitNode> {
        self.index.get(id).map(|&idx| &self.commits[idx])
    }

    pub fn children(&self, id: &CommitId) -> &[CommitId] {
        self.children.children(id)
    }

    pub fn adjacency(&self) -> &ChildAdjacency {
        &self.children
    }

    /// Maximum traversal depth: the requested count clamped to the history length.
    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn direction(&self) -> TraversalDirection {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
