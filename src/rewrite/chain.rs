use itertools::Itertools;

use crate::git::Repo;

/// Recreate `chain` (oldest first) so each commit sits on the one recreated before it
///
/// `initial_parent` becomes the parent of the first commit in `chain`.  `on_recreated` sees
/// every `(original, new)` pair as it is created.  Returns the new tip, which is
/// `initial_parent` when `chain` is empty.
pub fn rebuild(
    repo: &mut dyn Repo,
    initial_parent: git2::Oid,
    chain: &[git2::Oid],
    mut on_recreated: impl FnMut(git2::Oid, git2::Oid),
) -> Result<git2::Oid, crate::Error> {
    log::trace!("rebuilding onto {}: {}", initial_parent, chain.iter().join(", "));
    let mut parent = initial_parent;
    for original_id in chain {
        let original = repo
            .find_commit(*original_id)
            .map_err(|source| crate::Error::NotFound {
                id: *original_id,
                source,
            })?;
        let new_id = super::recreate_with_parent(repo, &original, parent)?;
        on_recreated(*original_id, new_id);
        parent = new_id;
    }
    Ok(parent)
}
