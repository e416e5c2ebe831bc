use bstr::ByteSlice;

use git_reword::git::GitRepo;
use git_reword::git::NewCommit;

use crate::fixture::init_repo;

#[test]
fn reads_commits() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let repo = GitRepo::new(repo);

    let branch = repo.head_branch().unwrap().unwrap();
    assert_eq!(branch.name, "refs/heads/main");
    assert_eq!(branch.shorthand(), "main");
    assert_eq!(repo.resolve("HEAD").unwrap(), branch.id);
    assert_eq!(repo.resolve("main").unwrap(), branch.id);

    let head = repo.find_commit(branch.id).unwrap();
    assert_eq!(head.summary(), "D");
    // git-fixture writes messages as given, without a trailing newline
    assert_eq!(head.message, "D");
    assert_eq!(head.parent_ids.len(), 1);
    assert_eq!(head.message_encoding, None);
    assert!(head.author.contains_str("<"));

    let raw = repo.raw().find_commit(branch.id).unwrap();
    assert_eq!(head.tree_id, raw.tree_id());
    assert_eq!(head.committer.as_bytes(), raw.header_field_bytes("committer").unwrap().as_bytes());

    let parent = repo.resolve("HEAD~1").unwrap();
    assert_eq!(head.first_parent_id(), Some(parent));

    temp.close().unwrap();
}

#[test]
fn resolve_peels_tags() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let target_id = {
        let target = repo.revparse_single("HEAD~2").unwrap();
        let signature = git2::Signature::now("fixture", "fixture@example.com").unwrap();
        repo.tag("v1", &target, &signature, "annotated", false)
            .unwrap();
        target.id()
    };
    let repo = GitRepo::new(repo);

    assert_eq!(repo.resolve("v1").unwrap(), target_id);

    let err = repo.resolve("does-not-exist").unwrap_err();
    assert_eq!(err.code(), git2::ErrorCode::NotFound);

    temp.close().unwrap();
}

#[test]
fn create_commit_round_trips_raw_fields() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let mut repo = GitRepo::new(repo);
    let head = repo.find_commit(repo.resolve("HEAD").unwrap()).unwrap();

    let commit = NewCommit {
        tree_id: head.tree_id,
        parent_ids: head.parent_ids.clone(),
        author: "Zoë <zoe@example.com> 1600000000 +0130".into(),
        committer: "Ada <ada@example.com> 1600000600 -0700".into(),
        message: b"Caf\xe9\n"[..].into(),
        message_encoding: Some("ISO-8859-1".to_owned()),
    };
    let id = repo.create_commit(&commit).unwrap();
    assert_eq!(id, commit.id().unwrap());

    let raw = repo.raw().find_commit(id).unwrap();
    assert_eq!(raw.message_encoding(), Some("ISO-8859-1"));
    assert_eq!(raw.message_raw_bytes(), b"Caf\xe9\n");
    assert_eq!(raw.author().when().seconds(), 1600000000);
    assert_eq!(raw.author().when().offset_minutes(), 90);
    assert_eq!(raw.committer().name(), Some("Ada"));
    assert_eq!(raw.committer().when().offset_minutes(), -7 * 60);
    drop(raw);

    let read = repo.find_commit(id).unwrap();
    assert_eq!(NewCommit::from(read.as_ref()), commit);

    // Writing the same content again is a no-op
    assert_eq!(repo.create_commit(&commit).unwrap(), id);

    temp.close().unwrap();
}

#[test]
fn set_branch_target_is_compare_and_swap() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let mut repo = GitRepo::new(repo);
    let branch = repo.head_branch().unwrap().unwrap();
    let parent = repo.resolve("HEAD~1").unwrap();

    repo.set_branch_target(&branch, parent, "move back").unwrap();
    assert_eq!(repo.resolve("main").unwrap(), parent);
    let reflog = repo.raw().reflog("refs/heads/main").unwrap();
    assert_eq!(reflog.get(0).unwrap().message(), Some("move back"));

    // `branch` is now stale
    let grandparent = repo.resolve("HEAD~2").unwrap();
    let err = repo
        .set_branch_target(&branch, grandparent, "move back")
        .unwrap_err();
    assert_eq!(err.code(), git2::ErrorCode::Modified);
    assert_eq!(repo.resolve("main").unwrap(), parent);

    temp.close().unwrap();
}

#[test]
fn detached_head_has_no_branch() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let id = repo.revparse_single("HEAD~1").unwrap().id();
    repo.set_head_detached(id).unwrap();
    let repo = GitRepo::new(repo);

    assert_eq!(repo.head_branch().unwrap(), None);
    assert_eq!(repo.resolve("HEAD").unwrap(), id);

    temp.close().unwrap();
}

#[test]
fn head_on_tag_has_no_branch() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let target_id = {
        let target = repo.revparse_single("HEAD~1").unwrap();
        repo.tag_lightweight("v1", &target, false).unwrap();
        target.id()
    };
    repo.reference_symbolic("HEAD", "refs/tags/v1", true, "point HEAD at a tag")
        .unwrap();
    let repo = GitRepo::new(repo);

    assert_eq!(repo.head_branch().unwrap(), None);
    assert_eq!(repo.resolve("HEAD").unwrap(), target_id);

    temp.close().unwrap();
}

#[test]
fn executor_rejects_head_on_tag() {
    let temp = assert_fs::TempDir::new().unwrap();
    let repo = init_repo(temp.path(), crate::fixture::linear(), "main");
    let main_id = repo.refname_to_id("refs/heads/main").unwrap();
    {
        let target = repo.revparse_single("HEAD").unwrap();
        repo.tag_lightweight("v1", &target, false).unwrap();
    }
    repo.reference_symbolic("HEAD", "refs/tags/v1", true, "point HEAD at a tag")
        .unwrap();
    let mut repo = GitRepo::new(repo);

    let mut executor = git_reword::rewrite::Executor::new("HEAD~1", "fix", false);
    let err = executor.run(&mut repo, &mut ()).unwrap_err();
    assert!(matches!(err, git_reword::Error::NoBranch));
    assert_eq!(
        executor.state(),
        &git_reword::rewrite::State::Failed {
            phase: git_reword::rewrite::Phase::Start
        }
    );
    assert_eq!(repo.raw().refname_to_id("refs/heads/main").unwrap(), main_id);
    assert_eq!(repo.raw().refname_to_id("refs/tags/v1").unwrap(), main_id);

    temp.close().unwrap();
}
