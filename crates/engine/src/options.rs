/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use serde_json::Value;

use crate::language::Language;

/// Archive fetched when no local repository is given.
pub const DEFAULT_ZIP_URL: &str = "https://github.com/googleapis/googleapis/archive/master.zip";

/// Top-level directory that holds every proto in the google API layout.
pub const GOOGLE_API_DIR: &str = "google";

pub const DEFAULT_COMPILER: &str = "protoc";

/// Where the proto repository comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    Local(PathBuf),
    Remote(String),
}

impl Default for RepoSource {
    fn default() -> Self {
        RepoSource::Remote(DEFAULT_ZIP_URL.to_string())
    }
}

/// Configuration for one packaging session.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    pub source: RepoSource,
    languages: Vec<Language>,
    /// Searched for shared protos, in order
    pub include_paths: Vec<PathBuf>,
    pub out_dir: PathBuf,
    pub template_root: PathBuf,
    pub pkg_prefix: String,
    /// Plugin executable names replacing the language defaults
    pub override_plugins: HashMap<Language, String>,
    /// Protos live under the top-level `google` directory
    pub is_google_api: bool,
    /// Only shared protos are built: no gRPC plugins are registered or required
    pub build_common_protos: bool,
    /// Use the alternate Java build template
    pub alt_java: bool,
    /// Name or path of the proto compiler
    pub compiler: String,
    /// Executable search path; the process `PATH` when unset
    pub search_path: Option<OsString>,
    /// Merged over the configuration data
    pub overrides: Value,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            source: RepoSource::default(),
            languages: Language::ALL.to_vec(),
            include_paths: Vec::new(),
            out_dir: PathBuf::from("output"),
            template_root: PathBuf::from("templates"),
            pkg_prefix: String::new(),
            override_plugins: HashMap::new(),
            is_google_api: false,
            build_common_protos: false,
            alt_java: false,
            compiler: DEFAULT_COMPILER.to_string(),
            search_path: None,
            overrides: Value::Null,
        }
    }
}

impl RepoConfig {
    pub fn new(source: RepoSource, languages: impl IntoIterator<Item = Language>) -> Self {
        Self {
            source,
            ..Self::default()
        }
        .with_languages(languages)
    }

    /// Set the target languages, dropping repeats while keeping first-seen order.
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = Language>) -> Self {
        self.languages.clear();
        for language in languages {
            if !self.languages.contains(&language) {
                self.languages.push(language);
            }
        }
        self
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Output root of one language.
    pub fn language_out_dir(&self, language: Language) -> PathBuf {
        self.out_dir.join(language.name())
    }

    /// Template directory of one language.
    pub fn language_template_dir(&self, language: Language) -> PathBuf {
        self.template_root.join(language.name())
    }

    /// Plugin executable for `language`: the override if set, else the language default.
    pub fn plugin_name(&self, language: Language) -> Option<String> {
        self.override_plugins
            .get(&language)
            .cloned()
            .or_else(|| language.default_plugin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_are_deduplicated() {
        let config = RepoConfig::new(
            RepoSource::Local(PathBuf::from("protos")),
            [Language::Ruby, Language::Python, Language::Ruby],
        );
        assert_eq!(config.languages(), &[Language::Ruby, Language::Python]);
    }

    #[test]
    fn test_default_source_is_remote_archive() {
        let config = RepoConfig::default();
        assert_eq!(config.source, RepoSource::Remote(DEFAULT_ZIP_URL.to_string()));
        assert_eq!(config.languages().len(), Language::ALL.len());
        assert_eq!(config.compiler, "protoc");
    }

    #[test]
    fn test_plugin_name_prefers_override() {
        let mut config = RepoConfig::default();
        config
            .override_plugins
            .insert(Language::Python, "my_python_plugin".to_string());
        assert_eq!(
            config.plugin_name(Language::Python).unwrap(),
            "my_python_plugin"
        );
        assert_eq!(config.plugin_name(Language::Ruby).unwrap(), "grpc_ruby_plugin");
        assert!(config.plugin_name(Language::Nodejs).is_none());
    }

    #[test]
    fn test_language_dirs() {
        let config = RepoConfig {
            out_dir: PathBuf::from("/tmp/out"),
            template_root: PathBuf::from("/tmp/templates"),
            ..RepoConfig::default()
        };
        assert_eq!(
            config.language_out_dir(Language::Ruby),
            PathBuf::from("/tmp/out/ruby")
        );
        assert_eq!(
            config.language_template_dir(Language::Java),
            PathBuf::from("/tmp/templates/java")
        );
    }
}
