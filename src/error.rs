#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HEAD must point to a branch")]
    NoBranch,

    #[error("could not resolve `{revision}` to a commit: {source}")]
    Resolution {
        revision: String,
        source: git2::Error,
    },

    #[error("{target} is not in the first-parent history of {head}")]
    TargetNotAncestor { target: git2::Oid, head: git2::Oid },

    #[error("could not recreate {id}: {source}")]
    CommitCreation { id: git2::Oid, source: git2::Error },

    #[error("could not move {branch} to {id}: {source}")]
    RefUpdate {
        branch: String,
        id: git2::Oid,
        source: git2::Error,
    },

    #[error("could not find commit {id}: {source}")]
    NotFound { id: git2::Oid, source: git2::Error },

    #[error("{0}")]
    Repository(#[from] git2::Error),
}

impl Error {
    /// The object store's numeric error code, if the store raised this error
    pub fn raw_code(&self) -> Option<i32> {
        match self {
            Self::Resolution { source, .. }
            | Self::CommitCreation { source, .. }
            | Self::RefUpdate { source, .. }
            | Self::NotFound { source, .. }
            | Self::Repository(source) => Some(source.raw_code()),
            Self::NoBranch | Self::TargetNotAncestor { .. } => None,
        }
    }
}
