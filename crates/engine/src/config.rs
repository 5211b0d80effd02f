/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Configuration data: API defaults, dependency pins, the common protos list and
 * language packaging rules. The data files are embedded at compile time and
 * every read merges caller overrides over them.
 */

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PackagerError, PackagerResult};
use crate::language::Language;
use crate::package_info::PackageDefaults;

const API_DEFAULTS_YAML: &str = include_str!("../../../config/api_defaults.yaml");
const DEPENDENCIES_YAML: &str = include_str!("../../../config/dependencies.yaml");
const COMMON_PROTOS_YAML: &str = include_str!("../../../config/common_protos.yaml");
const LANGUAGES_YAML: &str = include_str!("../../../config/languages.yaml");

/// A proto package identified by API name and version.
///
/// The version may be empty for packages whose protos sit directly under the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtoPackage {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl ProtoPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Language specific packaging rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LanguageRules {
    /// Directory names that are shared namespace packages
    #[serde(default)]
    pub namespaces: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CommonProtos {
    package: ProtoPackage,
    packages: Vec<ProtoPackage>,
}

/// Load the embedded configuration data with `overrides` merged over it.
///
/// # Errors
///
/// Returns `Config` if an embedded data file is not valid YAML.
pub fn load_config(overrides: &Value) -> PackagerResult<Value> {
    let mut config = Value::Object(Map::new());
    for (origin, content) in [
        ("api_defaults.yaml", API_DEFAULTS_YAML),
        ("dependencies.yaml", DEPENDENCIES_YAML),
        ("common_protos.yaml", COMMON_PROTOS_YAML),
        ("languages.yaml", LANGUAGES_YAML),
    ] {
        let data = parse_yaml_or_json(content, Some(origin))
            .map_err(|e| PackagerError::Config(format!("{origin}: {e}")))?;
        merge_values(&mut config, &data);
    }
    merge_values(&mut config, overrides);
    Ok(config)
}

/// Defaults for the `api` and `dependencies` template sections.
pub fn package_defaults(overrides: &Value) -> PackagerResult<PackageDefaults> {
    let config = load_config(overrides)?;
    let api = config
        .get("api")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let dependencies = config
        .get("dependencies")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    PackageDefaults::new(api, dependencies)
}

/// The (name, version) pairs bundled into the common protos package, in build order.
pub fn common_proto_packages(overrides: &Value) -> PackagerResult<Vec<ProtoPackage>> {
    Ok(common_protos(overrides)?.packages)
}

/// Identity of the common protos package itself.
pub fn common_package(overrides: &Value) -> PackagerResult<ProtoPackage> {
    Ok(common_protos(overrides)?.package)
}

/// Packaging rules for `language`; languages without rules get the defaults.
pub fn language_package_rules(
    language: Language,
    overrides: &Value,
) -> PackagerResult<LanguageRules> {
    let config = load_config(overrides)?;
    match config
        .get("languages")
        .and_then(|languages| languages.get(language.name()))
    {
        Some(rules) => serde_json::from_value(rules.clone()).map_err(|e| {
            PackagerError::Config(format!("Invalid rules for language {language}: {e}"))
        }),
        None => Ok(LanguageRules::default()),
    }
}

fn common_protos(overrides: &Value) -> PackagerResult<CommonProtos> {
    let config = load_config(overrides)?;
    let section = config
        .get("common_protos")
        .cloned()
        .ok_or_else(|| PackagerError::Config("common_protos is not configured".to_string()))?;
    serde_json::from_value(section)
        .map_err(|e| PackagerError::Config(format!("Invalid common_protos section: {e}")))
}

/// Read override files in order, later files taking precedence.
///
/// # Errors
///
/// Returns `Io` if a file cannot be read and `Config` if it cannot be parsed.
pub fn load_overrides<P: AsRef<Path>>(paths: &[P]) -> PackagerResult<Value> {
    let mut overrides = Value::Object(Map::new());
    for path in paths {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let data = parse_yaml_or_json(&content, path.to_str())
            .map_err(|e| PackagerError::Config(format!("{}: {e}", path.display())))?;
        merge_values(&mut overrides, &data);
    }
    Ok(overrides)
}

/// Deep merge `overlay` into `base`: objects merge key-wise, anything else replaces.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Parse YAML or JSON content.
///
/// The format is taken from the file extension when there is one, otherwise
/// JSON is tried first, then YAML.
pub fn parse_yaml_or_json(content: &str, file_path: Option<&str>) -> Result<Value, String> {
    if let Some(path) = file_path {
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            return parse_json(content);
        }
        if path_lower.ends_with(".yaml") || path_lower.ends_with(".yml") {
            return parse_yaml(content);
        }
    }

    match parse_json(content) {
        Ok(value) => Ok(value),
        Err(_) => parse_yaml(content),
    }
}

fn parse_json(content: &str) -> Result<Value, String> {
    serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
}

fn parse_yaml(content: &str) -> Result<Value, String> {
    let value: Value =
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))?;
    // An empty document carries no settings.
    Ok(if value.is_null() {
        Value::Object(Map::new())
    } else {
        value
    })
}
