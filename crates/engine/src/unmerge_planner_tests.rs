use super::*;
use oj_ci_core::ServiceDeployment;
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

fn deployment(version: &str) -> DeploymentSnapshot {
    DeploymentSnapshot::new(vec![ServiceDeployment {
        name: "web".to_string(),
        image: "web:latest".to_string(),
        stack_namespace: "demo".to_string(),
        version: version.to_string(),
    }])
}

#[tokio::test]
async fn rejects_non_auto_prefixed_version() {
    let scm = FakeSourceControl::new();
    let err = plan_unmerge(&scm, Path::new("/tmp"), &deployment("invalid-version-format"))
        .await
        .unwrap_err();
    assert!(err.message().contains("Version format not recognized"));
}

#[tokio::test]
async fn rejects_mixed_versions_across_services() {
    let scm = FakeSourceControl::new();
    let snapshot = DeploymentSnapshot::new(vec![
        ServiceDeployment {
            name: "web".to_string(),
            image: "web:a".to_string(),
            stack_namespace: "demo".to_string(),
            version: "auto-aaaaaaaa".to_string(),
        },
        ServiceDeployment {
            name: "worker".to_string(),
            image: "worker:b".to_string(),
            stack_namespace: "demo".to_string(),
            version: "auto-bbbbbbbb".to_string(),
        },
    ]);
    let err = plan_unmerge(&scm, Path::new("/tmp"), &snapshot)
        .await
        .unwrap_err();
    assert!(err.message().contains("Expected exactly one version"));
}

#[tokio::test]
async fn resolves_direct_branch_tip() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaaaaaa1111111111111111111111111111aaaa", &[]));
    scm.set_branch(
        "branch1",
        CommitId::new("aaaaaaaa1111111111111111111111111111aaaa"),
    );

    let result = plan_unmerge(&scm, Path::new("/tmp"), &deployment("auto-aaaaaaaa"))
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].branch_name, "branch1");
}

#[tokio::test]
async fn forward_bfs_finds_descendant_branch() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaaaaaa1111111111111111111111111111aaaa", &[]));
    scm.add_commit(commit(
        "cccccccc2222222222222222222222222222cccc",
        &["aaaaaaaa1111111111111111111111111111aaaa"],
    ));
    scm.set_branch(
        "branch1",
        CommitId::new("cccccccc2222222222222222222222222222cccc"),
    );

    let result = plan_unmerge(&scm, Path::new("/tmp"), &deployment("auto-aaaaaaaa"))
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].branch_name, "branch1");
    // Emitted commit stays the resolved short id, not the descendant.
    assert_eq!(result[0].commit_id, "aaaaaaaa1111111111111111111111111111aaaa");
}

#[tokio::test]
async fn ancestor_interior_fallback_finds_branch_containing_commit() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaaaaaa1111111111111111111111111111aaaa", &[]));
    // No forward descendant carries a branch; branch1's tip is further
    // along than `aaaa`, but `aaaa` is an ancestor of it.
    scm.add_commit(commit(
        "bbbbbbbb3333333333333333333333333333bbbb",
        &["aaaaaaaa1111111111111111111111111111aaaa"],
    ));
    scm.set_branch(
        "branch1",
        CommitId::new("bbbbbbbb3333333333333333333333333333bbbb"),
    );

    let result = plan_unmerge(&scm, Path::new("/tmp"), &deployment("auto-aaaaaaaa"))
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].branch_name, "branch1");
}

#[tokio::test]
async fn fails_when_no_branch_can_be_found() {
    let scm = FakeSourceControl::new();
    scm.add_commit(commit("aaaaaaaa1111111111111111111111111111aaaa", &[]));

    let err = plan_unmerge(&scm, Path::new("/tmp"), &deployment("auto-aaaaaaaa"))
        .await
        .unwrap_err();
    assert!(err.message().contains("Unable to unmerge version"));
}
