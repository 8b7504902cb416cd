// SPDX-License-Identifier: MIT

//! `UrlProbe` (§4.1): a single liveness GET against a deployed endpoint.
//! `expected` is either a JSON structure compared for deep equality on its
//! own keys (additional response keys are ignored), or a caller-supplied
//! predicate over the parsed response.

use crate::step::{StepCache, TypedStep};
use async_trait::async_trait;
use oj_ci_core::StepFailure;
use std::sync::Arc;

/// A probe's comparison target: either a structural expectation or an
/// arbitrary predicate over the parsed JSON response.
pub enum Expected {
    Json(serde_json::Value),
    Predicate(Arc<dyn Fn(&serde_json::Value) -> Result<(), String> + Send + Sync>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UrlProbeResult {
    pub url: String,
    pub status: u16,
}

pub struct UrlProbeStep {
    name: String,
    url: String,
    expected: Option<Expected>,
    client: reqwest::Client,
    cache: StepCache<UrlProbeResult>,
}

impl UrlProbeStep {
    pub fn new(url: impl Into<String>, expected: Option<Expected>) -> Self {
        Self {
            name: "url_probe".to_string(),
            url: url.into(),
            expected,
            client: reqwest::Client::new(),
            cache: StepCache::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Recursively compares `expected`'s keys against `actual`, reporting the
/// first mismatching path and both values. Keys present in `actual` but
/// not named in `expected` are ignored — this is a subset comparison, not
/// a full equality check.
fn compare_nested(
    path: &str,
    expected: &serde_json::Value,
    actual: &serde_json::Value,
) -> Result<(), StepFailure> {
    match expected {
        serde_json::Value::Object(expected_map) => {
            let serde_json::Value::Object(actual_map) = actual else {
                return Err(mismatch(path, expected, actual));
            };
            for (key, expected_value) in expected_map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let Some(actual_value) = actual_map.get(key) else {
                    return Err(StepFailure::other(format!(
                        "mismatch at {child_path}: expected {expected_value}, key missing from response"
                    )));
                };
                compare_nested(&child_path, expected_value, actual_value)?;
            }
            Ok(())
        }
        other if other == actual => Ok(()),
        other => Err(mismatch(path, other, actual)),
    }
}

fn mismatch(path: &str, expected: &serde_json::Value, actual: &serde_json::Value) -> StepFailure {
    StepFailure::other(format!(
        "mismatch at {path}: expected {expected}, got {actual}"
    ))
}

#[async_trait]
impl TypedStep for UrlProbeStep {
    type Output = UrlProbeResult;

    fn step_name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<UrlProbeResult, StepFailure> {
        self.cache
            .get_or_compute(|| async {
                let response = self
                    .client
                    .get(&self.url)
                    .send()
                    .await
                    .map_err(|e| StepFailure::transient_io(format!("GET {}: {e}", self.url)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(StepFailure::transient_io(format!(
                        "GET {} returned {status}",
                        self.url
                    )));
                }
                let status_code = status.as_u16();

                match &self.expected {
                    None => {}
                    Some(Expected::Json(expected)) => {
                        let body: serde_json::Value = response.json().await.map_err(|e| {
                            StepFailure::other(format!("{} did not return JSON: {e}", self.url))
                        })?;
                        compare_nested("", expected, &body)?;
                    }
                    Some(Expected::Predicate(predicate)) => {
                        let body: serde_json::Value = response.json().await.map_err(|e| {
                            StepFailure::other(format!("{} did not return JSON: {e}", self.url))
                        })?;
                        predicate(&body).map_err(StepFailure::other)?;
                    }
                }

                Ok(UrlProbeResult {
                    url: self.url.clone(),
                    status: status_code,
                })
            })
            .await
    }

    fn reset_cache(&self) {
        self.cache.reset();
    }
}

#[cfg(test)]
#[path = "url_probe_tests.rs"]
mod tests;
