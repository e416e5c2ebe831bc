use crate::git::Branch;
use crate::git::Repo;

/// Reflog message used for the final branch update
pub const DEFAULT_REFLOG_MESSAGE: &str = "reword HEAD update";

/// Move `branch` to `new_tip`
///
/// Fails if `branch` has moved since it was captured.
pub fn advance(
    repo: &mut dyn Repo,
    branch: &Branch,
    new_tip: git2::Oid,
    reason: &str,
) -> Result<(), crate::Error> {
    log::trace!("moving {} from {} to {}", branch, branch.id, new_tip);
    repo.set_branch_target(branch, new_tip, reason)
        .map_err(|source| crate::Error::RefUpdate {
            branch: branch.name.clone(),
            id: new_tip,
            source,
        })
}
