use super::*;

#[test]
fn empty_commits_yield_no_version() {
    assert!(Version::from_commits(&[]).is_none());
}

#[test]
fn version_is_permutation_invariant() {
    let a = CommitId::new("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    let b = CommitId::new("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    let forward = Version::from_commits(&[a.clone(), b.clone()]).unwrap();
    let reversed = Version::from_commits(&[b, a]).unwrap();

    assert_eq!(forward, reversed);
    assert_eq!(forward.as_str(), "aaaaaaaa-bbbbbbbb");
}

#[test]
fn branch_name_and_tag_use_auto_prefix() {
    let version = Version("deadbeef".to_string());
    assert_eq!(version.branch_name(), "auto/deadbeef");
    assert_eq!(version.tag(), "auto-deadbeef");
}

#[test]
fn short_ids_from_tag_round_trips() {
    let ids = Version::short_ids_from_tag("auto-deadbeef-cafef00d").unwrap();
    assert_eq!(ids, vec!["deadbeef", "cafef00d"]);
}

#[test]
fn short_ids_from_tag_rejects_unrecognized_format() {
    assert!(Version::short_ids_from_tag("v1.2.3").is_none());
    assert!(Version::short_ids_from_tag("auto-").is_none());
}
