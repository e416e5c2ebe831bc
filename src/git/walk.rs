use super::Commit;
use super::Repo;

/// Iterate first-parent history, starting with `head_id` itself
pub fn first_parents(repo: &dyn Repo, head_id: git2::Oid) -> FirstParents<'_> {
    FirstParents {
        repo,
        next: Some(head_id),
    }
}

pub struct FirstParents<'r> {
    repo: &'r dyn Repo,
    next: Option<git2::Oid>,
}

impl Iterator for FirstParents<'_> {
    type Item = Result<std::rc::Rc<Commit>, crate::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.repo.find_commit(id) {
            Ok(commit) => {
                self.next = commit.first_parent_id();
                Some(Ok(commit))
            }
            Err(source) => Some(Err(crate::Error::NotFound { id, source })),
        }
    }
}

/// Collect first-parent history from `tip_id` down to and including `target_id`
///
/// Ids are returned tip first, so `target_id` is always the last element.
pub fn walk(
    repo: &dyn Repo,
    tip_id: git2::Oid,
    target_id: git2::Oid,
) -> Result<Vec<git2::Oid>, crate::Error> {
    let mut walked = Vec::new();
    for commit in first_parents(repo, tip_id) {
        let commit = commit?;
        log::trace!("walked {} {}", commit.id, commit.summary());
        walked.push(commit.id);
        if commit.id == target_id {
            return Ok(walked);
        }
    }

    Err(crate::Error::TargetNotAncestor {
        target: target_id,
        head: tip_id,
    })
}
