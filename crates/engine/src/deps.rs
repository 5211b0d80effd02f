/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{PackagerError, PackagerResult};
use crate::language::Language;
use crate::options::RepoConfig;

/// Resolved executables, keyed by the name they were looked up with.
pub type ToolPaths = BTreeMap<String, PathBuf>;

/// Executable names needed to generate `languages`, in lookup order.
///
/// Empty when none of the languages runs the external compiler.
pub fn required_binaries(config: &RepoConfig, languages: &[Language]) -> Vec<String> {
    let compiler_languages: Vec<Language> = languages
        .iter()
        .copied()
        .filter(|language| language.uses_compiler())
        .collect();
    if compiler_languages.is_empty() {
        return Vec::new();
    }

    let mut names = vec![config.compiler.clone()];
    if !config.build_common_protos {
        for language in compiler_languages {
            if let Some(plugin) = config.plugin_name(language) {
                if !names.contains(&plugin) {
                    names.push(plugin);
                }
            }
        }
    }
    names
}

/// Check that the compiler and plugins for `languages` are on the search path.
///
/// # Errors
///
/// Returns `MissingDependency` naming the first executable that cannot be found.
pub fn check_deps(config: &RepoConfig, languages: &[Language]) -> PackagerResult<ToolPaths> {
    let required = required_binaries(config, languages);
    if required.is_empty() {
        info!("No language needs the proto compiler, skipping dependency check");
        return Ok(ToolPaths::new());
    }

    let search_path = config.search_path.clone().or_else(|| env::var_os("PATH"));
    let cwd = env::current_dir()?;

    let mut resolved = ToolPaths::new();
    for name in required {
        let path = which::which_in(&name, search_path.as_ref(), &cwd)
            .map_err(|_| PackagerError::MissingDependency(name.clone()))?;
        debug!(binary = %name, path = %path.display(), "Found dependency");
        resolved.insert(name, path);
    }
    info!(count = resolved.len(), "All dependencies found");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RepoSource;
    use std::ffi::OsString;
    use std::path::Path;

    fn config(languages: &[Language], search_path: &Path) -> RepoConfig {
        let mut config = RepoConfig::new(
            RepoSource::Local(PathBuf::from("protos")),
            languages.iter().copied(),
        );
        config.search_path = Some(OsString::from(search_path));
        config
    }

    #[test]
    fn test_required_binaries() {
        let config = config(&[Language::Python, Language::Ruby, Language::Nodejs], Path::new("/bin"));
        assert_eq!(
            required_binaries(&config, config.languages()),
            vec!["protoc", "grpc_python_plugin", "grpc_ruby_plugin"]
        );
    }

    #[test]
    fn test_required_binaries_for_common_protos() {
        let mut config = config(&[Language::Python, Language::Go], Path::new("/bin"));
        config.build_common_protos = true;
        assert_eq!(required_binaries(&config, config.languages()), vec!["protoc"]);
    }

    #[test]
    fn test_required_binaries_with_override() {
        let mut config = config(&[Language::Ruby], Path::new("/bin"));
        config
            .override_plugins
            .insert(Language::Ruby, "grpc_tools_ruby_protoc_plugin".to_string());
        assert_eq!(
            required_binaries(&config, config.languages()),
            vec!["protoc", "grpc_tools_ruby_protoc_plugin"]
        );
    }

    #[test]
    fn test_no_compiler_languages_skip_the_check() {
        let config = config(&[Language::Nodejs, Language::Java], Path::new("/nonexistent"));
        assert!(required_binaries(&config, config.languages()).is_empty());
        assert!(check_deps(&config, config.languages()).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_check_deps_resolves_every_binary() {
        use crate::test_support::write_executable;
        use tempfile::TempDir;

        let bin = TempDir::new().unwrap();
        for name in ["protoc", "grpc_python_plugin", "protoc-gen-go"] {
            write_executable(bin.path(), name, "#!/bin/sh\n");
        }
        let config = config(&[Language::Python, Language::Go], bin.path());

        let resolved = check_deps(&config, config.languages()).unwrap();
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved["grpc_python_plugin"], bin.path().join("grpc_python_plugin"));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_deps_reports_missing_plugin() {
        use crate::test_support::write_executable;
        use tempfile::TempDir;

        let bin = TempDir::new().unwrap();
        write_executable(bin.path(), "protoc", "#!/bin/sh\n");
        let config = config(&[Language::Ruby], bin.path());

        match check_deps(&config, config.languages()) {
            Err(PackagerError::MissingDependency(name)) => assert_eq!(name, "grpc_ruby_plugin"),
            other => panic!("Expected MissingDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_check_deps_reports_missing_compiler() {
        let config = config(&[Language::Python], Path::new("/nonexistent"));
        match check_deps(&config, config.languages()) {
            Err(PackagerError::MissingDependency(name)) => assert_eq!(name, "protoc"),
            other => panic!("Expected MissingDependency, got {other:?}"),
        }
    }
}
