use super::*;
use oj_ci_core::ServiceDeployment;
use std::path::Path;

#[tokio::test]
async fn inspect_stack_rejects_mixed_versions() {
    let fake = FakeOrchestrator::new();
    fake.set_stack(
        "demo",
        DeploymentSnapshot::new(vec![
            ServiceDeployment {
                name: "web".to_string(),
                image: "web:auto-aaa".to_string(),
                stack_namespace: "demo".to_string(),
                version: "auto-aaaaaaaa".to_string(),
            },
            ServiceDeployment {
                name: "worker".to_string(),
                image: "worker:auto-bbb".to_string(),
                stack_namespace: "demo".to_string(),
                version: "auto-bbbbbbbb".to_string(),
            },
        ]),
    );

    let err = fake.inspect_stack("demo").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::VersionMismatch { .. }));
}

#[tokio::test]
async fn build_image_marks_it_present_locally() {
    let fake = FakeOrchestrator::new();
    fake.build_image("demo/web:auto-aaa", Path::new("/tmp"))
        .await
        .unwrap();
    assert!(fake.image_exists_local("demo/web:auto-aaa").await.unwrap());
    assert_eq!(fake.built_images(), vec!["demo/web:auto-aaa".to_string()]);
}

#[tokio::test]
async fn deploy_stack_can_be_made_to_fail_once() {
    let fake = FakeOrchestrator::new();
    fake.fail_next_deploy();
    let err = fake
        .deploy_stack("demo", Path::new("/tmp/compose.yml"))
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::DeployFailed { .. }));

    fake.deploy_stack("demo", Path::new("/tmp/compose.yml"))
        .await
        .unwrap();
    assert_eq!(
        fake.deployed_stacks(),
        vec![("demo".to_string(), "/tmp/compose.yml".to_string())]
    );
}
