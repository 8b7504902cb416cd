use super::*;
use oj_ci_core::{CommitId, DeploymentSnapshot, ServiceDeployment};
use oj_ci_orchestrator::FakeOrchestrator;
use oj_ci_scm::{FakeCommit, FakeSourceControl};

fn commit(id: &str) -> FakeCommit {
    FakeCommit {
        id: CommitId::new(id),
        parents: Vec::new(),
        author: "tester".to_string(),
        iso_timestamp: "2026-01-01T00:00:00Z".to_string(),
        message: format!("commit {id}"),
    }
}

fn service(version: &str) -> ServiceDeployment {
    ServiceDeployment {
        name: "web".to_string(),
        image: format!("demo/web:{version}"),
        stack_namespace: "demo".to_string(),
        version: version.to_string(),
    }
}

#[tokio::test]
async fn resolves_the_branch_a_running_tag_came_from() {
    let fake = FakeSourceControl::new();
    fake.add_commit(commit("aaaaaaaabbbbbbbbccccccccddddddddeeeeeeee"));
    fake.set_branch(
        "feature-1",
        CommitId::new("aaaaaaaabbbbbbbbccccccccddddddddeeeeeeee"),
    );
    let scm: Arc<dyn oj_ci_scm::SourceControlOps> = Arc::new(fake);

    let dir = tempfile::tempdir().unwrap();
    let clone = Arc::new(SourceCloneStep::new(
        "env-1",
        "git@example.com:org/repo.git",
        None,
        dir.path().to_path_buf(),
        scm.clone(),
    ));

    let orchestrator = Arc::new(FakeOrchestrator::new());
    orchestrator.set_stack(
        "demo",
        DeploymentSnapshot::new(vec![service("auto-aaaaaaaa")]),
    );
    let stack_inspect = Arc::new(StackInspectStep::new(
        "demo",
        orchestrator as Arc<dyn oj_ci_orchestrator::OrchestratorOps>,
    ));

    let step = UnmergeResolveStep::new(clone, stack_inspect, scm);
    let result = step.evaluate().await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].branch_name, "feature-1");
}

#[tokio::test]
async fn rejects_a_running_snapshot_with_mixed_versions() {
    let fake = FakeSourceControl::new();
    let scm: Arc<dyn oj_ci_scm::SourceControlOps> = Arc::new(fake);
    let dir = tempfile::tempdir().unwrap();
    let clone = Arc::new(SourceCloneStep::new(
        "env-1",
        "git@example.com:org/repo.git",
        None,
        dir.path().to_path_buf(),
        scm.clone(),
    ));

    let orchestrator = Arc::new(FakeOrchestrator::new());
    orchestrator.set_stack(
        "demo",
        DeploymentSnapshot::new(vec![
            ServiceDeployment {
                name: "web".to_string(),
                image: "demo/web:auto-aaaaaaaa".to_string(),
                stack_namespace: "demo".to_string(),
                version: "auto-aaaaaaaa".to_string(),
            },
            ServiceDeployment {
                name: "api".to_string(),
                image: "demo/api:auto-bbbbbbbb".to_string(),
                stack_namespace: "demo".to_string(),
                version: "auto-bbbbbbbb".to_string(),
            },
        ]),
    );
    let stack_inspect = Arc::new(StackInspectStep::new(
        "demo",
        orchestrator as Arc<dyn oj_ci_orchestrator::OrchestratorOps>,
    ));

    let step = UnmergeResolveStep::new(clone, stack_inspect, scm);
    let err = step.evaluate().await.unwrap_err();
    assert!(err.message().contains("differing versions"));
}
