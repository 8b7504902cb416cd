use super::*;

#[test]
fn merge_union_keeps_disjoint_keys_from_both_sides() {
    let mut local = IndexMap::new();
    local.insert("a", 1);
    let mut remote = IndexMap::new();
    remote.insert("b", 2);

    let (merged, conflicts) = merge_union(local, remote);
    assert_eq!(merged.get("a"), Some(&1));
    assert_eq!(merged.get("b"), Some(&2));
    assert!(conflicts.is_empty());
}

#[test]
fn merge_union_remote_wins_on_overlapping_key() {
    let mut local = IndexMap::new();
    local.insert("a", 1);
    let mut remote = IndexMap::new();
    remote.insert("a", 2);

    let (merged, conflicts) = merge_union(local, remote);
    assert_eq!(merged.get("a"), Some(&2));
    assert_eq!(conflicts, vec!["a"]);
}

#[test]
fn merge_branches_recurses_into_branch_name_level() {
    let mut local: BranchesSnapshot = IndexMap::new();
    let mut local_branches = IndexMap::new();
    local_branches.insert(
        "main".to_string(),
        vec![CommitRecord::new("c1", "a", "2026-01-01T00:00:00Z", "m")],
    );
    local.insert(EnvironmentId::new("env-1"), local_branches);

    let mut remote: BranchesSnapshot = IndexMap::new();
    let mut remote_branches = IndexMap::new();
    remote_branches.insert(
        "release".to_string(),
        vec![CommitRecord::new("c2", "a", "2026-01-02T00:00:00Z", "m")],
    );
    remote.insert(EnvironmentId::new("env-1"), remote_branches);

    let merged = merge_branches(local, remote);
    let env_branches = merged.get(&EnvironmentId::new("env-1")).unwrap();
    assert!(env_branches.contains_key("main"));
    assert!(env_branches.contains_key("release"));
}

#[test]
fn merge_environments_reports_conflict_on_overlapping_id() {
    let env = EnvironmentView {
        id: EnvironmentId::new("env-1"),
        repo: "https://example.com/repo.git".to_string(),
        dry: false,
        branches: vec![],
    };
    let mut local: EnvironmentsSnapshot = IndexMap::new();
    local.insert(
        EnvironmentId::new("env-1"),
        EnvironmentEntry {
            env: env.clone(),
            steps: vec![],
        },
    );
    let mut remote: EnvironmentsSnapshot = IndexMap::new();
    remote.insert(
        EnvironmentId::new("env-1"),
        EnvironmentEntry {
            env,
            steps: vec![],
        },
    );

    let (_merged, conflicts) = merge_environments(local, remote);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].environment_id, EnvironmentId::new("env-1"));
}
