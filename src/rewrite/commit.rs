use bstr::ByteSlice;

use crate::git::Commit;
use crate::git::NewCommit;
use crate::git::Repo;

/// `original` with its message replaced
///
/// The message always ends in exactly one newline and is declared as UTF-8, whatever encoding
/// `original` declared.
pub fn reworded(original: &Commit, message: &str) -> NewCommit {
    let mut message = message.trim_end_matches('\n').to_owned();
    message.push('\n');
    NewCommit {
        message: message.into(),
        message_encoding: None,
        ..NewCommit::from(original)
    }
}

/// `original` re-parented onto `parent_id`, message and encoding kept verbatim
pub fn with_parent(original: &Commit, parent_id: git2::Oid) -> NewCommit {
    NewCommit {
        parent_ids: vec![parent_id],
        ..NewCommit::from(original)
    }
}

pub fn reword(
    repo: &mut dyn Repo,
    original: &Commit,
    message: &str,
) -> Result<git2::Oid, crate::Error> {
    create(repo, original, &reworded(original, message))
}

pub fn recreate_with_parent(
    repo: &mut dyn Repo,
    original: &Commit,
    parent_id: git2::Oid,
) -> Result<git2::Oid, crate::Error> {
    create(repo, original, &with_parent(original, parent_id))
}

fn create(
    repo: &mut dyn Repo,
    original: &Commit,
    commit: &NewCommit,
) -> Result<git2::Oid, crate::Error> {
    let id = repo
        .create_commit(commit)
        .map_err(|source| crate::Error::CommitCreation {
            id: original.id,
            source,
        })?;
    log::trace!(
        "recreated {} as {}  # {}",
        original.id,
        id,
        commit.message.lines().next().unwrap_or_default().as_bstr()
    );
    Ok(id)
}
