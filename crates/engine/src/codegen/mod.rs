/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Code generation driver. Each language is generated by one of three
 * strategies (see `Strategy`) into `<out_dir>/<language>/`.
 */

pub mod copy;
pub mod descriptor;
pub mod protoc;

use std::env;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::deps::ToolPaths;
use crate::error::{PackagerError, PackagerResult};
use crate::language::{Language, Strategy};
use crate::options::RepoConfig;
use crate::repo::ResolvedRepo;

/// Everything a generation step reads; shared by all languages of a session.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub config: &'a RepoConfig,
    pub repo: &'a ResolvedRepo,
    pub tools: &'a ToolPaths,
}

impl GenerationContext<'_> {
    /// Configured include paths, made absolute against the working directory.
    pub fn include_paths(&self) -> PackagerResult<Vec<PathBuf>> {
        self.config
            .include_paths
            .iter()
            .map(|path| absolute(path).map_err(PackagerError::from))
            .collect()
    }
}

/// Generated output of one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub language: Language,
    /// `<out_dir>/<language>`, absolute
    pub root: PathBuf,
    /// Files under `root`, relative and sorted
    pub files: Vec<PathBuf>,
}

/// Generate code for the protos of `name`/`version` in `language`.
///
/// # Errors
///
/// - `NotFound` if the API directory does not exist
/// - `Compiler` if a compiler invocation exits unsuccessfully
/// - `UnresolvedImport` if in-process compilation cannot resolve an import
pub async fn generate(
    ctx: &GenerationContext<'_>,
    name: &str,
    version: &str,
    language: Language,
) -> PackagerResult<GenerationResult> {
    let root = absolute(&ctx.config.language_out_dir(language))?;
    match language.strategy() {
        Strategy::CopyOnly => copy::copy_protos(ctx, name, version, &root).await?,
        Strategy::InProcess => {
            descriptor::write_descriptor_module(ctx, name, version, &root).await?
        }
        Strategy::Compiler => protoc::run_compiler(ctx, name, version, language, &root).await?,
    }

    let files = scan_output(&root).await?;
    info!(%language, name, version, files = files.len(), "Generated code");
    Ok(GenerationResult {
        language,
        root,
        files,
    })
}

/// Every file below `root`, relative to it and sorted. A missing root yields no files.
pub async fn scan_output(root: &Path) -> PackagerResult<Vec<PathBuf>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || scan_output_blocking(&root))
        .await
        .map_err(|e| PackagerError::Io(io::Error::other(e)))?
}

fn scan_output_blocking(root: &Path) -> PackagerResult<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Remove the output tree of one language so a build starts from nothing.
pub async fn clean_output(root: &Path) -> PackagerResult<()> {
    match tokio::fs::remove_dir_all(root).await {
        Ok(()) => {
            debug!(root = %root.display(), "Removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RepoSource;
    use crate::test_support::{resolved_repo, write_file, PUBSUB_PROTO};
    use tempfile::TempDir;

    fn config(repo: &Path, out: &Path, language: Language) -> RepoConfig {
        let mut config = RepoConfig::new(RepoSource::Local(repo.to_path_buf()), [language]);
        config.is_google_api = true;
        config.out_dir = out.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_scan_output_lists_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "b/two.rb", "");
        write_file(temp_dir.path(), "a.rb", "");
        write_file(temp_dir.path(), "b/c/three.rb", "");

        let files = scan_output(temp_dir.path()).await.unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.rb"),
                PathBuf::from("b/c/three.rb"),
                PathBuf::from("b/two.rb"),
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_output_of_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let files = scan_output(&temp_dir.path().join("absent")).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_clean_output_removes_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("ruby");
        write_file(&root, "lib/google/pubsub/v1/pubsub_pb.rb", "");
        write_file(&root, "Gemfile", "");

        clean_output(&root).await.unwrap();
        assert!(!root.exists());
        clean_output(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_java_copies_protos() {
        let repo_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_file(repo_dir.path(), "google/pubsub/v1/pubsub.proto", PUBSUB_PROTO);
        write_file(repo_dir.path(), "google/pubsub/v1/schema.proto", "");

        let config = config(repo_dir.path(), out_dir.path(), Language::Java);
        let repo = resolved_repo(repo_dir.path(), true).await;
        let tools = ToolPaths::new();
        let ctx = GenerationContext {
            config: &config,
            repo: &repo,
            tools: &tools,
        };

        let result = generate(&ctx, "pubsub", "v1", Language::Java).await.unwrap();
        assert_eq!(result.root, out_dir.path().join("java"));
        assert_eq!(
            result.files,
            vec![
                PathBuf::from("src/main/proto/google/pubsub/v1/pubsub.proto"),
                PathBuf::from("src/main/proto/google/pubsub/v1/schema.proto"),
            ]
        );
        let copied = std::fs::read_to_string(
            result.root.join("src/main/proto/google/pubsub/v1/pubsub.proto"),
        )
        .unwrap();
        assert_eq!(copied, PUBSUB_PROTO);
    }

    #[tokio::test]
    async fn test_generate_nodejs_writes_descriptor_module() {
        let repo_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_file(repo_dir.path(), "google/pubsub/v1/pubsub.proto", PUBSUB_PROTO);

        let config = config(repo_dir.path(), out_dir.path(), Language::Nodejs);
        let repo = resolved_repo(repo_dir.path(), true).await;
        let tools = ToolPaths::new();
        let ctx = GenerationContext {
            config: &config,
            repo: &repo,
            tools: &tools,
        };

        let result = generate(&ctx, "pubsub", "v1", Language::Nodejs).await.unwrap();
        assert_eq!(result.files, vec![PathBuf::from("pubsub.js")]);
        let module = std::fs::read_to_string(result.root.join("pubsub.js")).unwrap();
        assert!(module.starts_with("module.exports = {"));
        assert!(module.contains("google.pubsub.v1.Publisher"));
    }

    #[tokio::test]
    async fn test_generate_unknown_version_is_not_found() {
        let repo_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        write_file(repo_dir.path(), "google/pubsub/v1/pubsub.proto", PUBSUB_PROTO);

        let config = config(repo_dir.path(), out_dir.path(), Language::Java);
        let repo = resolved_repo(repo_dir.path(), true).await;
        let tools = ToolPaths::new();
        let ctx = GenerationContext {
            config: &config,
            repo: &repo,
            tools: &tools,
        };

        let result = generate(&ctx, "pubsub", "v9", Language::Java).await;
        assert!(matches!(result, Err(PackagerError::NotFound(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_with_external_compiler() {
        use crate::test_support::{fake_protoc, write_executable};

        let repo_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        write_file(repo_dir.path(), "google/pubsub/v1/pubsub.proto", PUBSUB_PROTO);
        write_file(repo_dir.path(), "google/pubsub/v1/schema.proto", "");
        let log = bin.path().join("protoc.log");
        let protoc = write_executable(bin.path(), "protoc", &fake_protoc(&log, false));
        let plugin = write_executable(bin.path(), "grpc_python_plugin", "#!/bin/sh\n");

        let config = config(repo_dir.path(), out_dir.path(), Language::Python);
        let repo = resolved_repo(repo_dir.path(), true).await;
        let tools: ToolPaths = [
            ("protoc".to_string(), protoc),
            ("grpc_python_plugin".to_string(), plugin.clone()),
        ]
        .into_iter()
        .collect();
        let ctx = GenerationContext {
            config: &config,
            repo: &repo,
            tools: &tools,
        };

        let result = generate(&ctx, "pubsub", "v1", Language::Python).await.unwrap();
        assert_eq!(
            result.files,
            vec![
                PathBuf::from("google/pubsub/v1/pubsub_pb2.py"),
                PathBuf::from("google/pubsub/v1/schema_pb2.py"),
            ]
        );

        let invocations = std::fs::read_to_string(&log).unwrap();
        assert_eq!(invocations.lines().count(), 2);
        assert!(invocations.contains(&format!(
            "--plugin=protoc-gen-grpc={}",
            plugin.display()
        )));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_go_plugin_override_reaches_compiler() {
        use crate::test_support::{fake_protoc, write_executable};

        let repo_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        write_file(repo_dir.path(), "google/pubsub/v1/pubsub.proto", PUBSUB_PROTO);
        let log = bin.path().join("protoc.log");
        let protoc = write_executable(bin.path(), "protoc", &fake_protoc(&log, false));
        let plugin = write_executable(bin.path(), "my-go-gen", "#!/bin/sh\n");

        let mut config = config(repo_dir.path(), out_dir.path(), Language::Go);
        config
            .override_plugins
            .insert(Language::Go, "my-go-gen".to_string());
        let repo = resolved_repo(repo_dir.path(), true).await;
        let tools: ToolPaths = [
            ("protoc".to_string(), protoc),
            ("my-go-gen".to_string(), plugin.clone()),
        ]
        .into_iter()
        .collect();
        let ctx = GenerationContext {
            config: &config,
            repo: &repo,
            tools: &tools,
        };

        let result = generate(&ctx, "pubsub", "v1", Language::Go).await.unwrap();
        assert_eq!(result.files, vec![PathBuf::from("google/pubsub/v1/pubsub.pb.go")]);
        let invocation = std::fs::read_to_string(&log).unwrap();
        assert!(invocation.contains(&format!("--plugin=protoc-gen-go={}", plugin.display())));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_reports_compiler_failure() {
        use crate::test_support::{fake_protoc, write_executable};

        let repo_dir = TempDir::new().unwrap();
        let out_dir = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        write_file(repo_dir.path(), "google/pubsub/v1/pubsub.proto", PUBSUB_PROTO);
        let protoc = write_executable(
            bin.path(),
            "protoc",
            &fake_protoc(&bin.path().join("protoc.log"), true),
        );

        let mut config = config(repo_dir.path(), out_dir.path(), Language::Ruby);
        config.build_common_protos = true;
        let repo = resolved_repo(repo_dir.path(), true).await;
        let tools: ToolPaths = [("protoc".to_string(), protoc)].into_iter().collect();
        let ctx = GenerationContext {
            config: &config,
            repo: &repo,
            tools: &tools,
        };

        match generate(&ctx, "pubsub", "v1", Language::Ruby).await {
            Err(PackagerError::Compiler {
                proto,
                status,
                output,
            }) => {
                assert_eq!(proto, "google/pubsub/v1/pubsub.proto");
                assert_eq!(status, Some(3));
                assert!(output.contains("simulated failure"));
            }
            other => panic!("Expected Compiler error, got {other:?}"),
        }
    }
}
