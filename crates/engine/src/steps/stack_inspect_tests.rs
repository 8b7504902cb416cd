use super::*;
use oj_ci_core::{DeploymentSnapshot, ServiceDeployment};
use oj_ci_orchestrator::FakeOrchestrator;

fn service(name: &str, version: &str) -> ServiceDeployment {
    ServiceDeployment {
        name: name.to_string(),
        image: format!("demo/{name}:{version}"),
        stack_namespace: "demo".to_string(),
        version: version.to_string(),
    }
}

#[tokio::test]
async fn reports_the_deployed_snapshot() {
    let orchestrator = Arc::new(FakeOrchestrator::new());
    orchestrator.set_stack(
        "demo",
        DeploymentSnapshot::new(vec![service("web", "auto-aaaaaaaa")]),
    );

    let step = StackInspectStep::new("demo", orchestrator);
    let snapshot = step.evaluate().await.unwrap();
    assert_eq!(snapshot.single_version(), Some("auto-aaaaaaaa"));
}

#[tokio::test]
async fn rejects_mixed_versions() {
    let orchestrator = Arc::new(FakeOrchestrator::new());
    orchestrator.set_stack(
        "demo",
        DeploymentSnapshot::new(vec![service("web", "auto-aaaaaaaa"), service("api", "auto-bbbbbbbb")]),
    );

    let step = StackInspectStep::new("demo", orchestrator);
    let err = step.evaluate().await.unwrap_err();
    assert!(err.message().contains("demo"));
}

#[tokio::test]
async fn missing_stack_reports_empty_snapshot() {
    let orchestrator = Arc::new(FakeOrchestrator::new());
    let step = StackInspectStep::new("absent", orchestrator);
    let snapshot = step.evaluate().await.unwrap();
    assert!(snapshot.services.is_empty());
}
