use super::*;

#[test]
fn transient_io_fault_is_retryable() {
    let failure = StepFailure::transient_io("connection reset");
    assert!(failure.is_retryable());
    assert_eq!(failure.kind(), FailureKind::TransientIoFault);
}

#[test]
fn configuration_fault_is_not_retryable() {
    let failure = StepFailure::configuration("missing repo url");
    assert!(!failure.is_retryable());
    assert_eq!(failure.kind(), FailureKind::ConfigurationFault);
}

#[test]
fn merge_conflict_carries_offending_commit() {
    let failure = StepFailure::merge_conflict("conflict merging", Some("deadbeef".to_string()));
    match failure {
        StepFailure::MergeConflict {
            offending_commit, ..
        } => assert_eq!(offending_commit.as_deref(), Some("deadbeef")),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn other_with_trace_attaches_lines() {
    let failure = StepFailure::other("build failed").with_trace(vec!["line 1".into()]);
    assert_eq!(failure.trace(), &["line 1".to_string()]);
    assert_eq!(failure.message(), "build failed");
}
