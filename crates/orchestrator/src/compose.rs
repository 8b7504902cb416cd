// SPDX-License-Identifier: MIT

//! Compose document handling for `ImageBuild`/`StackDeploy` (§4.1):
//! `${VAR}` substitution, `build:` key stripping, and `version` label
//! stamping, all performed on the parsed YAML tree rather than a rigid
//! typed schema — compose files carry more keys (`networks`, `volumes`,
//! `secrets`, per-service `environment`/`ports`/...) than this engine
//! needs to understand, so only the keys it acts on are addressed by name.

use crate::error::OrchestratorError;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

/// A parsed compose document. Wraps the raw YAML tree; only `services.*`
/// is interpreted, everything else passes through untouched.
#[derive(Debug, Clone)]
pub struct ComposeDocument {
    root: Mapping,
}

impl ComposeDocument {
    pub fn parse(raw: &str, path: &str) -> Result<Self, OrchestratorError> {
        let value: Value = serde_yaml::from_str(raw).map_err(|e| OrchestratorError::MalformedCompose {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let root = value
            .as_mapping()
            .cloned()
            .ok_or_else(|| OrchestratorError::MalformedCompose {
                path: path.to_string(),
                message: "top-level document is not a mapping".to_string(),
            })?;
        Ok(Self { root })
    }

    fn services_mut(&mut self) -> Option<&mut Mapping> {
        self.root.get_mut("services")?.as_mapping_mut()
    }

    fn services(&self) -> Option<&Mapping> {
        self.root.get("services")?.as_mapping()
    }

    /// Every service name declared in the document, in file order.
    pub fn service_names(&self) -> Vec<String> {
        self.services()
            .map(|services| {
                services
                    .keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The service's `build:` context, if declared.
    pub fn build_context(&self, service: &str) -> Option<&Value> {
        self.services()?.get(service)?.as_mapping()?.get("build")
    }

    /// The service's declared `image:` tag, if any (present on services
    /// with no `build:` context, or already-tagged built images).
    pub fn image_tag(&self, service: &str) -> Option<String> {
        self.services()?
            .get(service)?
            .as_mapping()?
            .get("image")?
            .as_str()
            .map(str::to_string)
    }

    /// Recursively substitutes `${VAR}` tokens in every string scalar
    /// against `vars`. Unresolved tokens are left verbatim.
    pub fn substitute_vars(&mut self, vars: &HashMap<String, String>) {
        let mut root = Value::Mapping(std::mem::take(&mut self.root));
        substitute_value(&mut root, vars);
        self.root = root.as_mapping().cloned().unwrap_or_default();
    }

    /// Drops the `build:` key from every service — the desired state a
    /// `StackDeploy` computes only ever references already-built images.
    pub fn drop_build_keys(&mut self) {
        if let Some(services) = self.services_mut() {
            for (_, service) in services.iter_mut() {
                if let Some(mapping) = service.as_mapping_mut() {
                    mapping.shift_remove("build");
                }
            }
        }
    }

    /// Stamps every service with a `version` label, overwriting any
    /// previous value. Labels are normalised to mapping form (compose
    /// also allows a `- KEY=VALUE` list form; this engine only ever
    /// produces the mapping form, the shape `StackInspect` expects back).
    pub fn stamp_version_label(&mut self, version: &str) {
        if let Some(services) = self.services_mut() {
            for (_, service) in services.iter_mut() {
                let Some(mapping) = service.as_mapping_mut() else {
                    continue;
                };
                let labels = mapping
                    .entry(Value::from("labels"))
                    .or_insert_with(|| Value::Mapping(Mapping::new()));
                if !labels.is_mapping() {
                    *labels = Value::Mapping(Mapping::new());
                }
                if let Some(labels) = labels.as_mapping_mut() {
                    labels.insert(Value::from("version"), Value::from(version));
                }
            }
        }
    }

    pub fn version_label(&self, service: &str) -> Option<String> {
        self.services()?
            .get(service)?
            .as_mapping()?
            .get("labels")?
            .as_mapping()?
            .get("version")?
            .as_str()
            .map(str::to_string)
    }

    pub fn to_yaml_string(&self) -> Result<String, OrchestratorError> {
        serde_yaml::to_string(&Value::Mapping(self.root.clone())).map_err(|e| {
            OrchestratorError::MalformedCompose {
                path: "<generated>".to_string(),
                message: e.to_string(),
            }
        })
    }
}

fn substitute_value(value: &mut Value, vars: &HashMap<String, String>) {
    match value {
        Value::String(s) => {
            *s = substitute_string(s, vars);
        }
        Value::Sequence(seq) => {
            for item in seq {
                substitute_value(item, vars);
            }
        }
        Value::Mapping(map) => {
            let entries: Vec<Value> = map.keys().cloned().collect();
            for key in entries {
                if let Some(v) = map.get_mut(&key) {
                    substitute_value(v, vars);
                }
            }
        }
        _ => {}
    }
}

/// Replaces every `${VAR}` occurrence in `input` with its value from
/// `vars`. Tokens with no matching entry are left untouched.
fn substitute_string(input: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(end) = input[i + 2..].find('}') {
                let name = &input[i + 2..i + 2 + end];
                match vars.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&input[i..i + 3 + end]),
                }
                i += 3 + end;
                continue;
            }
        }
        let ch = input[i..].chars().next().unwrap_or('\u{0}');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;
