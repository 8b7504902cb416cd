use super::*;

#[test]
fn compare_nested_accepts_matching_subset() {
    let expected = serde_json::json!({"status": "ok", "meta": {"version": 3}});
    let actual = serde_json::json!({"status": "ok", "meta": {"version": 3, "extra": "ignored"}});
    assert!(compare_nested("", &expected, &actual).is_ok());
}

#[test]
fn compare_nested_reports_mismatching_path_and_values() {
    let expected = serde_json::json!({"meta": {"version": 3}});
    let actual = serde_json::json!({"meta": {"version": 4}});
    let err = compare_nested("", &expected, &actual).unwrap_err();
    let message = err.message().to_string();
    assert!(message.contains("meta.version"), "{message}");
    assert!(message.contains('3') && message.contains('4'), "{message}");
}

#[test]
fn compare_nested_reports_missing_key() {
    let expected = serde_json::json!({"status": "ok"});
    let actual = serde_json::json!({});
    let err = compare_nested("", &expected, &actual).unwrap_err();
    assert!(err.message().contains("status"));
}

#[test]
fn default_step_name_is_url_probe() {
    let step = UrlProbeStep::new("https://example.com/health", None);
    assert_eq!(step.step_name(), "url_probe");
}

#[test]
fn with_name_overrides_the_default() {
    let step = UrlProbeStep::new("https://example.com/health", None).with_name("staging_probe");
    assert_eq!(step.step_name(), "staging_probe");
}
