mod chain;
mod commit;
mod reference;

pub use chain::*;
pub use commit::*;
pub use reference::*;

use crate::git::Branch;
use crate::git::Repo;

/// Where a reword stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    Start,
    /// HEAD's branch was captured
    Resolved { branch: Branch },
    /// The target was found in first-parent history
    Walked {
        branch: Branch,
        target: git2::Oid,
        /// Commits after `target`, oldest first
        descendants: Vec<git2::Oid>,
    },
    /// The target was recreated with its new message as `base`
    Reworded {
        branch: Branch,
        base: git2::Oid,
        descendants: Vec<git2::Oid>,
    },
    /// All descendants were recreated on top of the reworded commit
    Rebuilt { branch: Branch, tip: git2::Oid },
    /// The branch was moved to `tip`
    Updated { branch: Branch, tip: git2::Oid },
    Failed { phase: Phase },
}

impl State {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Start => Phase::Start,
            Self::Resolved { .. } => Phase::Resolved,
            Self::Walked { .. } => Phase::Walked,
            Self::Reworded { .. } => Phase::Reworded,
            Self::Rebuilt { .. } => Phase::Rebuilt,
            Self::Updated { .. } => Phase::Updated,
            Self::Failed { phase } => *phase,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Start,
    Resolved,
    Walked,
    Reworded,
    Rebuilt,
    Updated,
}

/// Observe a reword as it happens
pub trait Report {
    /// History from HEAD down to and including the target, HEAD first
    fn walked(&mut self, _repo: &dyn Repo, _walked: &[git2::Oid]) {}

    /// A commit was recreated
    fn rewritten(&mut self, _old_id: git2::Oid, _new_id: git2::Oid) {}
}

impl Report for () {}

/// Split walked history into the commits that need recreating, oldest first
pub fn descendants(mut walked: Vec<git2::Oid>, target: git2::Oid) -> Vec<git2::Oid> {
    if walked.last() == Some(&target) {
        walked.pop();
    }
    walked.reverse();
    walked
}

/// Reword one commit in HEAD's branch, recreating everything after it
///
/// Nothing observable changes until the final step moves the branch; an executor that fails
/// earlier leaves only unreferenced objects behind.
#[derive(Debug)]
pub struct Executor {
    revision: String,
    message: String,
    reflog_message: String,
    dry_run: bool,
    state: State,
    rewritten: Vec<(git2::Oid, git2::Oid)>,
}

impl Executor {
    pub fn new(revision: &str, message: &str, dry_run: bool) -> Self {
        Self {
            revision: revision.to_owned(),
            message: message.to_owned(),
            reflog_message: DEFAULT_REFLOG_MESSAGE.to_owned(),
            dry_run,
            state: State::Start,
            rewritten: Default::default(),
        }
    }

    pub fn reflog_message(&mut self, message: &str) -> &mut Self {
        self.reflog_message = message.to_owned();
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Every `(original, new)` pair created so far, in creation order
    pub fn rewritten(&self) -> &[(git2::Oid, git2::Oid)] {
        &self.rewritten
    }

    pub fn rewritten_id(&self, original_id: git2::Oid) -> Option<git2::Oid> {
        self.rewritten
            .iter()
            .find(|(old, _)| *old == original_id)
            .map(|(_, new)| *new)
    }

    /// Run to completion, stopping after the walk when this is a dry run
    pub fn run(
        &mut self,
        repo: &mut dyn Repo,
        report: &mut dyn Report,
    ) -> Result<&State, crate::Error> {
        loop {
            match self.state {
                State::Updated { .. } | State::Failed { .. } => break,
                State::Walked { .. } if self.dry_run => break,
                _ => {
                    self.step(repo, report)?;
                }
            }
        }
        Ok(&self.state)
    }

    /// Advance one state
    ///
    /// Finished and failed executors stay where they are.
    pub fn step(
        &mut self,
        repo: &mut dyn Repo,
        report: &mut dyn Report,
    ) -> Result<&State, crate::Error> {
        let state = std::mem::replace(&mut self.state, State::Start);
        let phase = state.phase();
        log::trace!("reword: leaving {:?}", phase);
        match self.transition(state, repo, report) {
            Ok(next) => {
                self.state = next;
                Ok(&self.state)
            }
            Err(err) => {
                log::trace!("reword: failed in {:?}: {}", phase, err);
                self.state = State::Failed { phase };
                Err(err)
            }
        }
    }

    fn transition(
        &mut self,
        state: State,
        repo: &mut dyn Repo,
        report: &mut dyn Report,
    ) -> Result<State, crate::Error> {
        let next = match state {
            State::Start => {
                let branch = repo.head_branch()?.ok_or(crate::Error::NoBranch)?;
                State::Resolved { branch }
            }
            State::Resolved { branch } => {
                let target = repo.resolve(&self.revision).map_err(|source| {
                    crate::Error::Resolution {
                        revision: self.revision.clone(),
                        source,
                    }
                })?;
                let walked = crate::git::walk(repo, branch.id, target)?;
                report.walked(repo, &walked);
                let descendants = descendants(walked, target);
                State::Walked {
                    branch,
                    target,
                    descendants,
                }
            }
            State::Walked {
                branch,
                target,
                descendants,
            } => {
                let original = repo
                    .find_commit(target)
                    .map_err(|source| crate::Error::NotFound { id: target, source })?;
                let base = reword(repo, &original, &self.message)?;
                self.rewritten.push((target, base));
                report.rewritten(target, base);
                State::Reworded {
                    branch,
                    base,
                    descendants,
                }
            }
            State::Reworded {
                branch,
                base,
                descendants,
            } => {
                let rewritten = &mut self.rewritten;
                let tip = rebuild(repo, base, &descendants, |old_id, new_id| {
                    rewritten.push((old_id, new_id));
                    report.rewritten(old_id, new_id);
                })?;
                State::Rebuilt { branch, tip }
            }
            State::Rebuilt { branch, tip } => {
                advance(repo, &branch, tip, &self.reflog_message)?;
                State::Updated { branch, tip }
            }
            state @ (State::Updated { .. } | State::Failed { .. }) => state,
        };
        Ok(next)
    }
}
