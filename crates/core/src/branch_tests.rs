use super::*;

#[test]
fn find_at_returns_first_match_in_enumeration_order() {
    let tips = BranchTips::new(vec![
        BranchTip::new("main", "c1"),
        BranchTip::new("release", "c1"),
        BranchTip::new("other", "c2"),
    ]);
    let found = tips.find_at(&CommitId::new("c1")).unwrap();
    assert_eq!(found.name, "main");
}

#[test]
fn by_commit_groups_preserving_order() {
    let tips = BranchTips::new(vec![
        BranchTip::new("main", "c1"),
        BranchTip::new("release", "c1"),
        BranchTip::new("other", "c2"),
    ]);
    let groups = tips.by_commit();
    assert_eq!(groups.get(&CommitId::new("c1")).unwrap(), &vec!["main", "release"]);
    assert_eq!(groups.get(&CommitId::new("c2")).unwrap(), &vec!["other"]);
}

#[test]
fn find_at_returns_none_when_absent() {
    let tips = BranchTips::new(vec![BranchTip::new("main", "c1")]);
    assert!(tips.find_at(&CommitId::new("missing")).is_none());
}
