use crate::{HistoryError, HistoryProvider};
use git2::{BranchType, Oid, Repository, Sort};
use gitstory_core::{CommitId, CommitNode, RefSnapshot, RefTarget};
use std::path::Path;

/// History provider backed by an on-disk repository through libgit2.
pub struct GitHistory {
    repository: Repository,
}

impl GitHistory {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let repository = Repository::discover(path).map_err(|err| {
            tracing::debug!("repository discovery failed at {}: {}", path.display(), err);
            HistoryError::NoRepository {
                path: path.to_path_buf(),
            }
        })?;
        Ok(Self { repository })
    }

    pub fn from_repository(repository: Repository) -> Self {
        Self { repository }
    }

    fn resolve(&self, start: &str) -> Result<Oid, HistoryError> {
        if self.repository.is_empty()? {
            return Err(HistoryError::EmptyHistory {
                reference: start.to_string(),
            });
        }

        self.repository
            .revparse_single(start)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|err| {
                tracing::debug!("cannot resolve '{}': {}", start, err);
                HistoryError::MalformedReference {
                    reference: start.to_string(),
                }
            })
    }
}

fn commit_id(oid: Oid) -> CommitId {
    CommitId(oid.to_string())
}

impl HistoryProvider for GitHistory {
    fn commits(&self, start: &str, limit: usize) -> Result<Vec<CommitNode>, HistoryError> {
        let tip = self.resolve(start)?;

        let mut walk = self.repository.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push(tip)?;

        let mut commits = Vec::new();
        for oid in walk.take(limit) {
            let commit = self.repository.find_commit(oid?)?;
            commits.push(CommitNode {
                id: commit_id(commit.id()),
                parents: commit.parent_ids().map(commit_id).collect(),
                message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
                timestamp: commit.time().seconds(),
            });
        }

        if commits.is_empty() {
            return Err(HistoryError::EmptyHistory {
                reference: start.to_string(),
            });
        }
        tracing::debug!("loaded {} commits from '{}'", commits.len(), start);
        Ok(commits)
    }

    fn refs(&self) -> Result<RefSnapshot, HistoryError> {
        let head = self
            .repository
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
            .map(|commit| commit_id(commit.id()));

        let mut branches = Vec::new();
        for entry in self.repository.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()?.map(str::to_string) else {
                continue;
            };
            if let Ok(commit) = branch.get().peel_to_commit() {
                branches.push(RefTarget::new(name, commit_id(commit.id())));
            }
        }

        let mut tags = Vec::new();
        for name in self.repository.tag_names(None)?.iter().flatten() {
            let target = self
                .repository
                .revparse_single(&format!("refs/tags/{name}"))
                .and_then(|object| object.peel_to_commit());
            match target {
                Ok(commit) => tags.push(RefTarget::new(name, commit_id(commit.id()))),
                Err(err) => tracing::debug!("skipping tag {} without a commit: {}", name, err),
            }
        }

        Ok(RefSnapshot {
            head,
            branches,
            tags,
        })
    }
}
