use super::*;
use crate::config::EnvironmentConfig;
use oj_ci_core::{BranchPin, CommitId, DeploymentSnapshot, Environment, Pin, ServiceDeployment};
use oj_ci_orchestrator::FakeOrchestrator;
use oj_ci_scm::{FakeCommit, FakeSourceControl};

fn env_config(id: &str, branches: Vec<BranchPin>) -> EnvironmentConfig {
    EnvironmentConfig {
        environment: Environment::new(id, "git@example.com:org/repo.git").with_branches(branches),
        stack: format!("{id}-stack"),
        compose_relative_path: "docker-compose.yml".to_string(),
        vars: Default::default(),
        push: false,
        publish: false,
    }
}

fn fake_config(environments: Vec<EnvironmentConfig>) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        peer_url: None,
        base_dir: std::env::temp_dir(),
        environments,
    }
}

#[tokio::test]
async fn a_pass_over_an_awaiting_unmerge_environment_recovers_branches() {
    let commit = CommitId::new("abcdef1234567890abcdef1234567890abcdef12");
    let scm = Arc::new(FakeSourceControl::new());
    scm.add_commit(FakeCommit {
        id: commit.clone(),
        parents: Vec::new(),
        author: "a".to_string(),
        iso_timestamp: "1970-01-01T00:00:00Z".to_string(),
        message: "m".to_string(),
    });
    scm.set_branch("feature-x", commit.clone());

    let orchestrator = Arc::new(FakeOrchestrator::new());
    orchestrator.set_stack(
        "env-1-stack",
        DeploymentSnapshot::new(vec![ServiceDeployment {
            name: "web".to_string(),
            image: "web:auto".to_string(),
            stack_namespace: "env-1-stack".to_string(),
            version: format!("auto-{}", commit.short8()),
        }]),
    );

    let config = fake_config(vec![env_config("env-1", Vec::new())]);
    let hub = SnapshotHub::new();
    let control_loop = ControlLoop::new(
        &config,
        scm as Arc<dyn SourceControlOps>,
        orchestrator as Arc<dyn OrchestratorOps>,
        hub.clone(),
    );

    let summary = control_loop.run_pass().await;
    assert_eq!(summary.environment_count, 1);

    let snapshot = hub.current();
    let entry = snapshot
        .environments
        .get(&EnvironmentId::new("env-1"))
        .unwrap();
    assert_eq!(entry.env.branches, vec![("feature-x".to_string(), commit.as_str().to_string())]);
}

#[tokio::test]
async fn an_operator_update_is_applied_before_the_next_pass_only() {
    let scm = Arc::new(FakeSourceControl::new());
    let orchestrator = Arc::new(FakeOrchestrator::new());
    let config = fake_config(vec![env_config("env-1", vec![BranchPin::head("master")])]);
    let hub = SnapshotHub::new();
    let control_loop = ControlLoop::new(
        &config,
        scm as Arc<dyn SourceControlOps>,
        orchestrator as Arc<dyn OrchestratorOps>,
        hub,
    );

    control_loop.queue_update(OperatorUpdate {
        id: EnvironmentId::new("env-1"),
        branches: vec![BranchPin::new("hotfix", Pin::Commit("a".repeat(40)))],
    });

    {
        let states = control_loop.environments.lock().await;
        assert_eq!(states[0].env.branches, vec![BranchPin::head("master")]);
    }

    control_loop.run_pass().await;

    let states = control_loop.environments.lock().await;
    assert_eq!(
        states[0].env.branches,
        vec![BranchPin::new("hotfix", Pin::Commit("a".repeat(40)))]
    );
}

#[tokio::test]
async fn an_update_for_an_unknown_environment_is_dropped_without_panicking() {
    let scm = Arc::new(FakeSourceControl::new());
    let orchestrator = Arc::new(FakeOrchestrator::new());
    let config = fake_config(vec![env_config("env-1", vec![BranchPin::head("master")])]);
    let hub = SnapshotHub::new();
    let control_loop = ControlLoop::new(
        &config,
        scm as Arc<dyn SourceControlOps>,
        orchestrator as Arc<dyn OrchestratorOps>,
        hub,
    );

    control_loop.queue_update(OperatorUpdate {
        id: EnvironmentId::new("nonexistent"),
        branches: Vec::new(),
    });

    let summary = control_loop.run_pass().await;
    assert_eq!(summary.environment_count, 1);
}
