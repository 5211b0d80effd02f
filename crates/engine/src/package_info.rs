/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Template parameters for package assembly.
 *
 * Parameters are built in stages, each stage consuming the previous one:
 * `PackageDefaults` (configuration merged with overrides) -> `PackageInfo`
 * (API name, version and prefix) -> `TemplateParams` (fields discovered while
 * assembling one language). Only `TemplateParams` can be rendered.
 */

use semver::Version;
use serde_json::{Map, Value};

use crate::error::{PackagerError, PackagerResult};

/// Keys of the `api` section owned by the engine; configured values for them are ignored.
const RESERVED_API_KEYS: &[&str] = &[
    "name",
    "simple_name",
    "version",
    "semantic_version",
    "package_name",
    "prefix",
    "namespaces",
    "modules",
    "files",
];

/// Configuration defaults merged with caller overrides.
#[derive(Debug, Clone)]
pub struct PackageDefaults {
    semantic_version: Version,
    api: Map<String, Value>,
    dependencies: Value,
}

impl PackageDefaults {
    /// Build defaults from the `api` and `dependencies` configuration sections.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `api.semantic_version` is missing or not a semantic version.
    pub fn new(api: Map<String, Value>, dependencies: Value) -> PackagerResult<Self> {
        let raw_version = api
            .get("semantic_version")
            .and_then(Value::as_str)
            .ok_or_else(|| PackagerError::Config("api.semantic_version is not set".to_string()))?;
        let semantic_version = Version::parse(raw_version).map_err(|e| {
            PackagerError::Config(format!(
                "api.semantic_version '{raw_version}' is not a semantic version: {e}"
            ))
        })?;

        let api = api
            .into_iter()
            .filter(|(key, _)| !RESERVED_API_KEYS.contains(&key.as_str()))
            .collect();

        Ok(Self {
            semantic_version,
            api,
            dependencies,
        })
    }

    pub fn semantic_version(&self) -> &Version {
        &self.semantic_version
    }

    pub fn dependencies(&self) -> &Value {
        &self.dependencies
    }

    /// Inject the API identity, producing the parameters for one package.
    pub fn with_api(&self, name: &str, version: &str, prefix: &str) -> PackageInfo {
        PackageInfo {
            api: ApiInfo {
                name: name.to_string(),
                simple_name: simple_name(name).to_string(),
                version: version.to_string(),
                semantic_version: self.semantic_version.to_string(),
                package_name: package_id(prefix, name, version),
                prefix: prefix.to_string(),
                extra: self.api.clone(),
            },
            dependencies: self.dependencies.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiInfo {
    pub name: String,
    pub simple_name: String,
    pub version: String,
    pub semantic_version: String,
    pub package_name: String,
    pub prefix: String,
    extra: Map<String, Value>,
}

/// Parameters for one API package, before language specific enrichment.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    api: ApiInfo,
    dependencies: Value,
}

impl PackageInfo {
    pub fn api(&self) -> &ApiInfo {
        &self.api
    }

    /// Identifier used to name package specification files.
    pub fn package_id(&self) -> &str {
        &self.api.package_name
    }

    /// Inject the discovered language fields, producing renderable parameters.
    pub fn finalize(self, fields: LanguageFields) -> TemplateParams {
        let ApiInfo {
            name,
            simple_name,
            version,
            semantic_version,
            package_name,
            prefix,
            extra,
        } = self.api;

        let mut api = extra;
        api.insert("name".to_string(), Value::String(name));
        api.insert("simple_name".to_string(), Value::String(simple_name));
        api.insert("version".to_string(), Value::String(version));
        api.insert(
            "semantic_version".to_string(),
            Value::String(semantic_version),
        );
        api.insert(
            "package_name".to_string(),
            Value::String(package_name.clone()),
        );
        api.insert("prefix".to_string(), Value::String(prefix));
        api.insert("files".to_string(), strings(fields.files));
        if let Some(namespaces) = fields.namespaces {
            api.insert("namespaces".to_string(), strings(namespaces));
        }
        if let Some(modules) = fields.modules {
            api.insert("modules".to_string(), strings(modules));
        }

        let mut value = Map::new();
        value.insert("api".to_string(), Value::Object(api));
        value.insert("dependencies".to_string(), self.dependencies);
        TemplateParams {
            package_id: package_name,
            value: Value::Object(value),
        }
    }
}

/// Fields discovered while assembling one language package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageFields {
    /// Generated files, relative to the package root
    pub files: Vec<String>,
    /// Python namespace packages, dotted
    pub namespaces: Option<Vec<String>>,
    /// Ruby require paths
    pub modules: Option<Vec<String>>,
}

/// Fully enriched template parameters.
#[derive(Debug, Clone)]
pub struct TemplateParams {
    package_id: String,
    value: Value,
}

impl TemplateParams {
    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

fn strings(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

/// Last path segment of an API name (`logging/type` -> `type`).
pub fn simple_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Package identifier: prefix, name with `/` replaced by `-`, then `-version` if set.
pub fn package_id(prefix: &str, name: &str, version: &str) -> String {
    let name = name.replace('/', "-");
    if version.is_empty() {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}{name}-{version}")
    }
}
