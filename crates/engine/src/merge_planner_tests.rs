use super::*;
use oj_ci_scm::{FakeCommit, FakeSourceControl};
use std::path::Path;

fn commit(id: &str, parents: &[&str]) -> FakeCommit {
    FakeCommit {
        id: CommitId::new(id),
        parents: parents.iter().map(|p| CommitId::new(*p)).collect(),
        author: "tester".to_string(),
        iso_timestamp: "2026-01-01T00:00:00Z".to_string(),
        message: format!("commit {id}"),
    }
}

#[tokio::test]
async fn empty_branches_is_a_configuration_fault() {
    let scm = FakeSourceControl::new();
    let err = plan_merge(&scm, Path::new("/tmp"), &[], false)
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Empty branches set");
}

#[tokio::test]
async fn fast_forward_reuses_existing_branch_no_new_ref() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit(
        "2222222222222222222222222222222222222222",
        &["1111111111111111111111111111111111111111"],
    ));
    scm.add_commit(commit("1111111111111111111111111111111111111111", &[]));
    scm.set_branch("master", CommitId::new("1111111111111111111111111111111111111111"));
    scm.set_branch(
        "branch1",
        CommitId::new("2222222222222222222222222222222222222222"),
    );

    let branches = vec![
        ("master".to_string(), Pin::Head),
        ("branch1".to_string(), Pin::Head),
    ];
    let result = plan_merge(&scm, Path::new("/tmp"), &branches, false)
        .await
        .unwrap();

    // branch1 is a descendant of master (its tip is a legal merge target
    // as it equals one of the selected commits), so it's reused directly.
    assert_eq!(result.branch_name, "branch1");
    assert!(scm.pushed_branches().is_empty());
}

#[tokio::test]
async fn synthetic_merge_creates_auto_branch_and_pushes() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaa", &[]));
    scm.add_commit(commit("bbbb", &[]));
    scm.set_branch("branch1", CommitId::new("aaaa"));
    scm.set_branch("branch2", CommitId::new("bbbb"));

    let branches = vec![
        ("branch1".to_string(), Pin::Head),
        ("branch2".to_string(), Pin::Head),
    ];
    let result = plan_merge(&scm, Path::new("/tmp"), &branches, true)
        .await
        .unwrap();

    assert!(result.branch_name.starts_with("auto/"));
    assert_eq!(scm.pushed_branches(), vec![result.branch_name.clone()]);
}

#[tokio::test]
async fn version_string_is_permutation_invariant() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaa", &[]));
    scm.add_commit(commit("bbbb", &[]));
    scm.set_branch("branch1", CommitId::new("aaaa"));
    scm.set_branch("branch2", CommitId::new("bbbb"));

    let forward = vec![
        ("branch1".to_string(), Pin::Head),
        ("branch2".to_string(), Pin::Head),
    ];
    let reversed = vec![
        ("branch2".to_string(), Pin::Head),
        ("branch1".to_string(), Pin::Head),
    ];

    let a = plan_merge(&scm, Path::new("/tmp"), &forward, false)
        .await
        .unwrap();
    let b = plan_merge(&scm, Path::new("/tmp"), &reversed, false)
        .await
        .unwrap();
    assert_eq!(a.version, b.version);
}

#[tokio::test]
async fn conflicting_merge_fails_with_message() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("base", &[]));
    scm.add_commit(commit("incoming", &[]));
    scm.set_branch("branch1", CommitId::new("base"));
    scm.set_branch("branch2", CommitId::new("incoming"));
    scm.mark_conflicting(CommitId::new("base"), CommitId::new("incoming"));

    let branches = vec![
        ("branch1".to_string(), Pin::Head),
        ("branch2".to_string(), Pin::Head),
    ];
    let err = plan_merge(&scm, Path::new("/tmp"), &branches, false)
        .await
        .unwrap_err();
    assert!(err.message().contains("Merge conflict"));
}

#[tokio::test]
async fn repeated_invocation_is_idempotent() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaa", &[]));
    scm.add_commit(commit("bbbb", &[]));
    scm.set_branch("branch1", CommitId::new("aaaa"));
    scm.set_branch("branch2", CommitId::new("bbbb"));

    let branches = vec![
        ("branch1".to_string(), Pin::Head),
        ("branch2".to_string(), Pin::Head),
    ];
    let first = plan_merge(&scm, Path::new("/tmp"), &branches, false)
        .await
        .unwrap();
    let second = plan_merge(&scm, Path::new("/tmp"), &branches, false)
        .await
        .unwrap();
    assert_eq!(first.branch_name, second.branch_name);
    assert_eq!(first.commit_id, second.commit_id);
}
