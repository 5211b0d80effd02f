//! Session configuration and execution

use crate::error::{CliError, CliResult};
use crate::utils::config::ProjectConfig;
use crate::utils::language::determine_languages;
use clap::Args;
use protopack_engine::{
    load_overrides, ApiRepo, BuildReport, Language, PreparedRepo, RepoConfig, RepoSource,
    DEFAULT_COMPILER,
};
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info};

/// Flags shared by every packaging command
#[derive(Args, Debug, Clone, Default)]
pub struct SessionOptions {
    /// Comma separated target languages (default: all)
    #[arg(long)]
    pub languages: Option<String>,
    /// Local proto repository
    #[arg(long, conflicts_with = "zip_url")]
    pub repo_dir: Option<PathBuf>,
    /// Zip archive of the proto repository
    #[arg(long)]
    pub zip_url: Option<String>,
    /// Protos live under the repository's `google` directory
    #[arg(long)]
    pub google_api: bool,
    /// Extra proto include directory (repeatable)
    #[arg(long = "include-path")]
    pub include_paths: Vec<PathBuf>,
    /// Output root (default: output)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Template root (default: templates)
    #[arg(long)]
    pub templates: Option<PathBuf>,
    /// Prefix for package identifiers
    #[arg(long)]
    pub pkg_prefix: Option<String>,
    /// Plugin override as <language>=<executable> (repeatable)
    #[arg(long = "plugin")]
    pub plugins: Vec<String>,
    /// Use the alternate Java build template
    #[arg(long)]
    pub alt_java: bool,
    /// YAML or JSON file merged over the packaging configuration (repeatable)
    #[arg(long = "override-config")]
    pub override_configs: Vec<PathBuf>,
    /// Proto compiler executable (default: protoc)
    #[arg(long)]
    pub compiler: Option<String>,
}

/// Parse a `<language>=<executable>` plugin override.
pub fn parse_plugin_override(value: &str) -> CliResult<(Language, String)> {
    let (language, plugin) = value.split_once('=').ok_or_else(|| {
        CliError::Message(format!(
            "Invalid plugin override '{value}': expected <language>=<executable>"
        ))
    })?;
    let plugin = plugin.trim();
    if plugin.is_empty() {
        return Err(CliError::Message(format!(
            "Invalid plugin override '{value}': executable is empty"
        )));
    }
    Ok((language.parse()?, plugin.to_string()))
}

/// Build the session configuration: CLI flag > config file > default.
pub fn build_config(
    options: &SessionOptions,
    project: &ProjectConfig,
    build_common_protos: bool,
) -> CliResult<RepoConfig> {
    let languages = determine_languages(options.languages.as_deref(), project)?;

    let source = if let Some(repo_dir) = &options.repo_dir {
        RepoSource::Local(repo_dir.clone())
    } else if let Some(url) = &options.zip_url {
        RepoSource::Remote(url.clone())
    } else if let Some(repo_dir) = &project.repo_dir {
        RepoSource::Local(repo_dir.clone())
    } else if let Some(url) = &project.zip_url {
        RepoSource::Remote(url.clone())
    } else {
        RepoSource::default()
    };

    let mut config = RepoConfig::new(source, languages);
    config.include_paths = if options.include_paths.is_empty() {
        project.include_paths.clone()
    } else {
        options.include_paths.clone()
    };
    if let Some(out_dir) = options.out_dir.as_ref().or(project.out_dir.as_ref()) {
        config.out_dir = out_dir.clone();
    }
    if let Some(templates) = options.templates.as_ref().or(project.templates.as_ref()) {
        config.template_root = templates.clone();
    }
    config.pkg_prefix = options
        .pkg_prefix
        .clone()
        .or_else(|| project.pkg_prefix.clone())
        .unwrap_or_default();
    config.compiler = options
        .compiler
        .clone()
        .or_else(|| project.compiler.clone())
        .unwrap_or_else(|| DEFAULT_COMPILER.to_string());
    config.is_google_api = options.google_api || project.google_api.unwrap_or(false);
    config.alt_java = options.alt_java || project.alt_java.unwrap_or(false);
    config.build_common_protos = build_common_protos;

    for (language, plugin) in &project.plugins {
        config
            .override_plugins
            .insert(language.parse()?, plugin.clone());
    }
    for value in &options.plugins {
        let (language, plugin) = parse_plugin_override(value)?;
        config.override_plugins.insert(language, plugin);
    }

    let override_files: Vec<&PathBuf> = project
        .override_config
        .iter()
        .chain(&options.override_configs)
        .collect();
    config.overrides = load_overrides(&override_files)?;

    debug!(
        source = ?config.source,
        languages = ?config.languages(),
        out_dir = %config.out_dir.display(),
        overrides = override_files.len(),
        "Session configuration"
    );
    Ok(config)
}

/// Prepare a session for `config` and run `build` against it on a fresh runtime.
pub fn run_session<F, Fut>(config: RepoConfig, build: F) -> CliResult<BuildReport>
where
    F: FnOnce(PreparedRepo) -> Fut,
    Fut: Future<Output = CliResult<BuildReport>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Message(format!("Failed to create runtime: {e}")))?;
    rt.block_on(async {
        let session = ApiRepo::new(config).prepare().await?;
        let report = build(session).await?;
        info!(packages = report.packages.len(), "Session finished");
        Ok(report)
    })
}

/// Print one line per built package.
pub fn print_report(report: &BuildReport) {
    for package in &report.packages {
        println!(
            "✓ Built {} package {} at {}",
            package.language,
            package.package_id,
            package.root.display()
        );
    }
}
