use super::*;
use oj_ci_scm::{FakeCommit, FakeSourceControl};

fn commit(id: &str) -> FakeCommit {
    FakeCommit {
        id: oj_ci_core::CommitId::new(id),
        parents: Vec::new(),
        author: "tester".to_string(),
        iso_timestamp: "2026-01-01T00:00:00Z".to_string(),
        message: format!("commit {id}"),
    }
}

#[tokio::test]
async fn propagates_empty_branches_failure() {
    let fake = FakeSourceControl::new();
    let scm: Arc<dyn SourceControlOps> = Arc::new(fake);
    let clone = Arc::new(SourceCloneStep::new(
        "env-1",
        "git@example.com:org/repo.git",
        None,
        std::env::temp_dir(),
        scm.clone(),
    ));
    let step = MergeCheckoutStep::new(clone, scm, Vec::new(), false);

    let err = step.evaluate().await.unwrap_err();
    assert_eq!(err.message(), "Empty branches set");
}

#[tokio::test]
async fn resolves_when_source_clone_succeeds() {
    let fake = FakeSourceControl::new();
    fake.add_commit(commit("aaaa"));
    fake.set_branch("branch1", oj_ci_core::CommitId::new("aaaa"));
    let scm: Arc<dyn SourceControlOps> = Arc::new(fake);
    let clone = Arc::new(SourceCloneStep::new(
        "env-1",
        "git@example.com:org/repo.git",
        None,
        std::env::temp_dir(),
        scm.clone(),
    ));
    let step = MergeCheckoutStep::new(
        clone,
        scm,
        vec![("branch1".to_string(), Pin::Head)],
        false,
    );

    let result = step.evaluate().await.unwrap();
    assert_eq!(result.branch_name, "branch1");
}
