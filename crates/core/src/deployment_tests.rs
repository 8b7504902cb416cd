use super::*;

fn service(name: &str, version: &str) -> ServiceDeployment {
    ServiceDeployment {
        name: name.to_string(),
        image: format!("registry/{name}:{version}"),
        stack_namespace: "stack".to_string(),
        version: version.to_string(),
    }
}

#[test]
fn single_version_when_all_services_agree() {
    let snapshot = DeploymentSnapshot::new(vec![service("web", "v1"), service("worker", "v1")]);
    assert_eq!(snapshot.single_version(), Some("v1"));
}

#[test]
fn no_single_version_when_services_disagree() {
    let snapshot = DeploymentSnapshot::new(vec![service("web", "v1"), service("worker", "v2")]);
    assert!(snapshot.single_version().is_none());
}

#[test]
fn no_single_version_when_empty() {
    let snapshot = DeploymentSnapshot::default();
    assert!(snapshot.single_version().is_none());
}
