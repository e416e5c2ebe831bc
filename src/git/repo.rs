use bstr::ByteSlice;

use super::Commit;
use super::NewCommit;

pub trait Repo {
    /// Resolve a revision to the commit it names
    fn resolve(&self, revspec: &str) -> Result<git2::Oid, git2::Error>;
    fn find_commit(&self, id: git2::Oid) -> Result<std::rc::Rc<Commit>, git2::Error>;
    /// Write a commit object, returning its content hash
    fn create_commit(&mut self, commit: &NewCommit) -> Result<git2::Oid, git2::Error>;

    /// The branch HEAD is attached to, `None` when HEAD is detached
    fn head_branch(&self) -> Result<Option<Branch>, git2::Error>;
    /// Move `branch` to `id`, failing if it no longer points at `branch.id`
    fn set_branch_target(
        &mut self,
        branch: &Branch,
        id: git2::Oid,
        reason: &str,
    ) -> Result<(), git2::Error>;
}

/// A local branch, as captured at a point in time
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Branch {
    /// Fully qualified reference name, e.g. `refs/heads/main`
    pub name: String,
    pub id: git2::Oid,
}

impl Branch {
    pub fn new(name: &str, id: git2::Oid) -> Self {
        let name = if name.starts_with(LOCAL_PREFIX) {
            name.to_owned()
        } else {
            format!("{LOCAL_PREFIX}{name}")
        };
        Self { name, id }
    }

    pub fn shorthand(&self) -> &str {
        self.name.strip_prefix(LOCAL_PREFIX).unwrap_or(&self.name)
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.shorthand())
    }
}

const LOCAL_PREFIX: &str = "refs/heads/";

pub struct GitRepo {
    repo: git2::Repository,
    commits: std::cell::RefCell<std::collections::HashMap<git2::Oid, std::rc::Rc<Commit>>>,
}

impl GitRepo {
    pub fn new(repo: git2::Repository) -> Self {
        Self {
            repo,
            commits: Default::default(),
        }
    }

    pub fn raw(&self) -> &git2::Repository {
        &self.repo
    }

    pub fn resolve(&self, revspec: &str) -> Result<git2::Oid, git2::Error> {
        let commit = self.repo.revparse_single(revspec)?.peel_to_commit()?;
        Ok(commit.id())
    }

    pub fn find_commit(&self, id: git2::Oid) -> Result<std::rc::Rc<Commit>, git2::Error> {
        let mut commits = self.commits.borrow_mut();
        if let Some(commit) = commits.get(&id) {
            return Ok(std::rc::Rc::clone(commit));
        }

        let raw = self.repo.find_commit(id)?;
        let author = raw.header_field_bytes("author")?;
        let committer = raw.header_field_bytes("committer")?;
        let commit = std::rc::Rc::new(Commit {
            id: raw.id(),
            tree_id: raw.tree_id(),
            parent_ids: raw.parent_ids().collect(),
            author: author.to_vec().into(),
            committer: committer.to_vec().into(),
            message: raw.message_raw_bytes().into(),
            message_encoding: raw.message_encoding().map(ToOwned::to_owned),
        });
        commits.insert(id, std::rc::Rc::clone(&commit));
        Ok(commit)
    }

    pub fn create_commit(&mut self, commit: &NewCommit) -> Result<git2::Oid, git2::Error> {
        let odb = self.repo.odb()?;
        let id = odb.write(git2::ObjectType::Commit, &commit.to_bytes())?;
        log::trace!(
            "wrote commit {} {}",
            id,
            commit.message.lines().next().unwrap_or_default().as_bstr()
        );
        Ok(id)
    }

    pub fn head_branch(&self) -> Result<Option<Branch>, git2::Error> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            log::trace!("HEAD is not a branch: {:?}", head.name());
            return Ok(None);
        }
        let name = head.name().ok_or_else(|| {
            git2::Error::new(
                git2::ErrorCode::Invalid,
                git2::ErrorClass::Reference,
                format!("non-UTF8 branch {:?}", head.name_bytes().as_bstr()),
            )
        })?;
        let id = head.target().ok_or_else(|| {
            git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Reference,
                format!("could not find target of {name}"),
            )
        })?;
        Ok(Some(Branch {
            name: name.to_owned(),
            id,
        }))
    }

    pub fn set_branch_target(
        &mut self,
        branch: &Branch,
        id: git2::Oid,
        reason: &str,
    ) -> Result<(), git2::Error> {
        self.repo
            .reference_matching(&branch.name, id, true, branch.id, reason)?;
        Ok(())
    }
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_struct("GitRepo")
            .field("repo", &self.repo.path())
            .finish()
    }
}

impl Repo for GitRepo {
    fn resolve(&self, revspec: &str) -> Result<git2::Oid, git2::Error> {
        self.resolve(revspec)
    }

    fn find_commit(&self, id: git2::Oid) -> Result<std::rc::Rc<Commit>, git2::Error> {
        self.find_commit(id)
    }

    fn create_commit(&mut self, commit: &NewCommit) -> Result<git2::Oid, git2::Error> {
        self.create_commit(commit)
    }

    fn head_branch(&self) -> Result<Option<Branch>, git2::Error> {
        self.head_branch()
    }

    fn set_branch_target(
        &mut self,
        branch: &Branch,
        id: git2::Oid,
        reason: &str,
    ) -> Result<(), git2::Error> {
        self.set_branch_target(branch, id, reason)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Head {
    Branch(String),
    Detached(git2::Oid),
}

#[derive(Debug)]
pub struct InMemoryRepo {
    commits: std::collections::HashMap<git2::Oid, std::rc::Rc<Commit>>,
    branches: std::collections::BTreeMap<String, git2::Oid>,
    head: Option<Head>,
    reflog: Vec<(String, git2::Oid, String)>,
    read_only: bool,

    last_id: std::sync::atomic::AtomicUsize,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            commits: Default::default(),
            branches: Default::default(),
            head: None,
            reflog: Default::default(),
            read_only: false,
            last_id: std::sync::atomic::AtomicUsize::new(1),
        }
    }

    pub fn clear(&mut self) {
        *self = InMemoryRepo::new()
    }

    /// Generate a unique tree id
    pub fn gen_id(&mut self) -> git2::Oid {
        let last_id = self
            .last_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let sha = format!("{last_id:040x}");
        git2::Oid::from_str(&sha).unwrap()
    }

    /// Commit on top of HEAD, advancing the attached branch if there is one
    pub fn push_commit(&mut self, commit: NewCommit) -> git2::Oid {
        for parent_id in &commit.parent_ids {
            assert!(self.commits.contains_key(parent_id));
        }
        let id = commit.id().unwrap();
        self.commits
            .insert(id, std::rc::Rc::new(commit.into_commit(id)));
        match self.head.clone() {
            Some(Head::Branch(name)) => {
                self.branches.insert(name, id);
            }
            Some(Head::Detached(_)) | None => {
                self.head = Some(Head::Detached(id));
            }
        }
        id
    }

    pub fn head_id(&self) -> Option<git2::Oid> {
        match self.head.as_ref()? {
            Head::Branch(name) => self.branches.get(name).copied(),
            Head::Detached(id) => Some(*id),
        }
    }

    /// Point `name` at `id` without touching HEAD
    pub fn branch(&mut self, name: &str, id: git2::Oid) {
        assert!(self.commits.contains_key(&id));
        self.branches.insert(Branch::new(name, id).name, id);
    }

    /// Attach HEAD to `name`
    pub fn switch(&mut self, name: &str) {
        let name = Branch::new(name, git2::Oid::zero()).name;
        assert!(self.branches.contains_key(&name));
        self.head = Some(Head::Branch(name));
    }

    pub fn detach(&mut self, id: git2::Oid) {
        assert!(self.commits.contains_key(&id));
        self.head = Some(Head::Detached(id));
    }

    pub fn find_local_branch(&self, name: &str) -> Option<Branch> {
        let name = Branch::new(name, git2::Oid::zero()).name;
        let id = *self.branches.get(&name)?;
        Some(Branch { name, id })
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Reference updates in the order they were applied: branch, new id, reason
    pub fn reflog(&self) -> &[(String, git2::Oid, String)] {
        &self.reflog
    }

    /// Refuse all object writes, as a full or read-only object store would
    pub fn set_read_only(&mut self, yes: bool) {
        self.read_only = yes;
    }

    pub fn resolve(&self, revspec: &str) -> Result<git2::Oid, git2::Error> {
        let (base, generations) = match revspec.rsplit_once('~') {
            Some((base, count)) => {
                let count = if count.is_empty() {
                    1
                } else {
                    count.parse::<usize>().map_err(|_| not_found(revspec))?
                };
                (base, count)
            }
            None => (revspec, 0),
        };

        let mut id = self.resolve_base(base).ok_or_else(|| not_found(revspec))?;
        for _ in 0..generations {
            id = self
                .commits
                .get(&id)
                .and_then(|c| c.first_parent_id())
                .ok_or_else(|| not_found(revspec))?;
        }
        Ok(id)
    }

    fn resolve_base(&self, base: &str) -> Option<git2::Oid> {
        if base == "HEAD" {
            return self.head_id();
        }
        if let Some(branch) = self.find_local_branch(base) {
            return Some(branch.id);
        }
        if base.len() < 4 || !base.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let mut candidates = self
            .commits
            .keys()
            .filter(|id| id.to_string().starts_with(&base.to_ascii_lowercase()));
        let id = *candidates.next()?;
        candidates.next().is_none().then_some(id)
    }

    pub fn find_commit(&self, id: git2::Oid) -> Result<std::rc::Rc<Commit>, git2::Error> {
        self.commits
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(&id.to_string()))
    }

    pub fn create_commit(&mut self, commit: &NewCommit) -> Result<git2::Oid, git2::Error> {
        if self.read_only {
            return Err(git2::Error::new(
                git2::ErrorCode::GenericError,
                git2::ErrorClass::Odb,
                "object store is read-only",
            ));
        }
        let id = commit.id()?;
        self.commits
            .entry(id)
            .or_insert_with(|| std::rc::Rc::new(commit.clone().into_commit(id)));
        Ok(id)
    }

    pub fn head_branch(&self) -> Result<Option<Branch>, git2::Error> {
        match self.head.as_ref() {
            Some(Head::Branch(name)) => {
                let id = self.branches.get(name).copied().ok_or_else(|| {
                    git2::Error::new(
                        git2::ErrorCode::UnbornBranch,
                        git2::ErrorClass::Reference,
                        format!("branch {name:?} has no commits"),
                    )
                })?;
                Ok(Some(Branch {
                    name: name.clone(),
                    id,
                }))
            }
            Some(Head::Detached(_)) => Ok(None),
            None => Err(git2::Error::new(
                git2::ErrorCode::UnbornBranch,
                git2::ErrorClass::Reference,
                "HEAD is unborn",
            )),
        }
    }

    pub fn set_branch_target(
        &mut self,
        branch: &Branch,
        id: git2::Oid,
        reason: &str,
    ) -> Result<(), git2::Error> {
        let current = self.branches.get_mut(&branch.name).ok_or_else(|| {
            git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Reference,
                format!("could not find branch {:?}", branch.name),
            )
        })?;
        if *current != branch.id {
            return Err(git2::Error::new(
                git2::ErrorCode::Modified,
                git2::ErrorClass::Reference,
                format!(
                    "old reference value does not match: expected {}, found {}",
                    branch.id, current
                ),
            ));
        }
        *current = id;
        self.reflog
            .push((branch.name.clone(), id, reason.to_owned()));
        Ok(())
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl Repo for InMemoryRepo {
    fn resolve(&self, revspec: &str) -> Result<git2::Oid, git2::Error> {
        self.resolve(revspec)
    }

    fn find_commit(&self, id: git2::Oid) -> Result<std::rc::Rc<Commit>, git2::Error> {
        self.find_commit(id)
    }

    fn create_commit(&mut self, commit: &NewCommit) -> Result<git2::Oid, git2::Error> {
        self.create_commit(commit)
    }

    fn head_branch(&self) -> Result<Option<Branch>, git2::Error> {
        self.head_branch()
    }

    fn set_branch_target(
        &mut self,
        branch: &Branch,
        id: git2::Oid,
        reason: &str,
    ) -> Result<(), git2::Error> {
        self.set_branch_target(branch, id, reason)
    }
}

fn not_found(revspec: &str) -> git2::Error {
    git2::Error::new(
        git2::ErrorCode::NotFound,
        git2::ErrorClass::Reference,
        format!("revspec '{revspec}' not found"),
    )
}
