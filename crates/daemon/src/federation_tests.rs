use super::*;
use crate::config::{Config, EnvironmentConfig};
use crate::hub::SnapshotHub;
use oj_ci_core::{BranchPin, Environment, EnvironmentEntry, EnvironmentId, EnvironmentView};
use oj_ci_orchestrator::FakeOrchestrator;
use oj_ci_scm::FakeSourceControl;

fn test_control_loop() -> Arc<ControlLoop> {
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        peer_url: None,
        base_dir: std::env::temp_dir(),
        environments: vec![EnvironmentConfig {
            environment: Environment::new("local-env", "git@example.com:org/repo.git")
                .with_branches(vec![BranchPin::head("master")]),
            stack: "local-stack".to_string(),
            compose_relative_path: "docker-compose.yml".to_string(),
            vars: Default::default(),
            push: false,
            publish: false,
        }],
    };
    Arc::new(ControlLoop::new(
        &config,
        Arc::new(FakeSourceControl::new()) as Arc<dyn oj_ci_scm::SourceControlOps>,
        Arc::new(FakeOrchestrator::new()) as Arc<dyn oj_ci_orchestrator::OrchestratorOps>,
        SnapshotHub::new(),
    ))
}

fn remote_snapshot() -> oj_ci_core::Snapshot {
    let mut environments = oj_ci_core::EnvironmentsSnapshot::new();
    environments.insert(
        EnvironmentId::new("remote-env"),
        EnvironmentEntry {
            env: EnvironmentView {
                id: EnvironmentId::new("remote-env"),
                repo: "git@example.com:org/other.git".to_string(),
                dry: false,
                branches: Vec::new(),
            },
            steps: Vec::new(),
        },
    );
    oj_ci_core::Snapshot {
        branches: Default::default(),
        environments,
    }
}

#[tokio::test]
async fn run_link_merges_an_inbound_snapshot_and_then_reports_connection_closed() {
    let control_loop = test_control_loop();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        // Drain the peer's outbound snapshot stream so `run_link`'s writer
        // task doesn't block on a full socket buffer.
        let _ = read_message(&mut stream).await;
        write_message(&mut stream, &Message::Snapshot(remote_snapshot()))
            .await
            .unwrap();
    });

    let result = run_link(&addr.to_string(), &control_loop).await;
    server.await.unwrap();

    assert!(result.is_err());
    let merged = control_loop.current_snapshot();
    assert!(merged.environments.contains_key(&EnvironmentId::new("remote-env")));
}
