use bstr::ByteSlice;

/// An immutable commit as read from the object store
///
/// Signatures and the message are kept as the raw bytes found in the object so a recreated
/// commit carries them over without any re-encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Commit {
    pub id: git2::Oid,
    pub tree_id: git2::Oid,
    pub parent_ids: Vec<git2::Oid>,
    /// Raw `author` header value, `Name <email> <epoch> <tz>`
    pub author: bstr::BString,
    /// Raw `committer` header value, `Name <email> <epoch> <tz>`
    pub committer: bstr::BString,
    pub message: bstr::BString,
    /// Declared message encoding, `None` meaning UTF-8
    pub message_encoding: Option<String>,
}

impl Commit {
    /// First line of the message
    pub fn summary(&self) -> &bstr::BStr {
        self.message
            .trim_start_with(|c| c == '\n')
            .lines()
            .next()
            .unwrap_or_default()
            .as_bstr()
    }

    pub fn first_parent_id(&self) -> Option<git2::Oid> {
        self.parent_ids.first().copied()
    }
}

/// A commit that has not been written to the object store yet
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NewCommit {
    pub tree_id: git2::Oid,
    pub parent_ids: Vec<git2::Oid>,
    pub author: bstr::BString,
    pub committer: bstr::BString,
    pub message: bstr::BString,
    pub message_encoding: Option<String>,
}

impl NewCommit {
    /// Serialize into git's canonical commit object layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(256 + self.message.len());
        buffer.extend_from_slice(b"tree ");
        buffer.extend_from_slice(self.tree_id.to_string().as_bytes());
        buffer.push(b'\n');
        for parent_id in &self.parent_ids {
            buffer.extend_from_slice(b"parent ");
            buffer.extend_from_slice(parent_id.to_string().as_bytes());
            buffer.push(b'\n');
        }
        buffer.extend_from_slice(b"author ");
        buffer.extend_from_slice(&self.author);
        buffer.push(b'\n');
        buffer.extend_from_slice(b"committer ");
        buffer.extend_from_slice(&self.committer);
        buffer.push(b'\n');
        if let Some(encoding) = self.message_encoding.as_deref() {
            buffer.extend_from_slice(b"encoding ");
            buffer.extend_from_slice(encoding.as_bytes());
            buffer.push(b'\n');
        }
        buffer.push(b'\n');
        buffer.extend_from_slice(&self.message);
        buffer
    }

    /// The content hash the object store will assign to this commit
    pub fn id(&self) -> Result<git2::Oid, git2::Error> {
        git2::Oid::hash_object(git2::ObjectType::Commit, &self.to_bytes())
    }

    pub fn into_commit(self, id: git2::Oid) -> Commit {
        Commit {
            id,
            tree_id: self.tree_id,
            parent_ids: self.parent_ids,
            author: self.author,
            committer: self.committer,
            message: self.message,
            message_encoding: self.message_encoding,
        }
    }
}

impl From<&Commit> for NewCommit {
    fn from(commit: &Commit) -> Self {
        Self {
            tree_id: commit.tree_id,
            parent_ids: commit.parent_ids.clone(),
            author: commit.author.clone(),
            committer: commit.committer.clone(),
            message: commit.message.clone(),
            message_encoding: commit.message_encoding.clone(),
        }
    }
}
