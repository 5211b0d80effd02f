/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Session orchestration.
 *
 * An `ApiRepo` is turned into a `PreparedRepo` exactly once: the proto
 * repository is resolved and the toolchain checked, strictly in that order.
 * Builds then run one pipeline per language (clean, generate, then
 * assemble), all languages concurrently, collecting every failure.
 */

use std::collections::BTreeSet;

use futures::future::join_all;
use tracing::{error, info};

use crate::assemble::{assemble, AssembledPackage};
use crate::codegen::{self, clean_output, generate, GenerationContext, GenerationResult};
use crate::config::{common_package, common_proto_packages, package_defaults, ProtoPackage};
use crate::deps::{check_deps, ToolPaths};
use crate::error::{BuildFailures, LanguageFailure, PackagerError, PackagerResult};
use crate::language::Language;
use crate::options::RepoConfig;
use crate::package_info::PackageDefaults;
use crate::render::{TemplateRenderer, TeraRenderer};
use crate::repo::{self, ArchiveFetcher, HttpArchiveFetcher, ResolvedRepo};

/// A packaging session that has not touched the filesystem yet.
pub struct ApiRepo {
    config: RepoConfig,
    fetcher: Box<dyn ArchiveFetcher>,
    renderer: Box<dyn TemplateRenderer>,
}

impl ApiRepo {
    /// Session fetching remote archives over HTTP.
    pub fn new(config: RepoConfig) -> Self {
        Self::with_fetcher(config, HttpArchiveFetcher::new())
    }

    pub fn with_fetcher(config: RepoConfig, fetcher: impl ArchiveFetcher + 'static) -> Self {
        Self {
            config,
            fetcher: Box::new(fetcher),
            renderer: Box::new(TeraRenderer),
        }
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// Resolve the proto repository, then check the toolchain.
    ///
    /// # Errors
    ///
    /// Returns the resolver's or dependency checker's error, and `Config` for invalid
    /// configuration data. Nothing is generated on failure.
    pub async fn prepare(self) -> PackagerResult<PreparedRepo> {
        let ApiRepo {
            config,
            fetcher,
            renderer,
        } = self;

        let defaults = package_defaults(&config.overrides)?;
        let repo = repo::resolve(&config, fetcher.as_ref()).await?;
        let tools = check_deps(&config, config.languages())?;

        info!(
            repo = %repo.root().display(),
            languages = ?config.languages(),
            "Session prepared"
        );
        Ok(PreparedRepo {
            config,
            repo,
            tools,
            defaults,
            renderer,
        })
    }
}

/// Packages built by one call, in configured language order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub packages: Vec<AssembledPackage>,
}

impl BuildReport {
    pub fn package(&self, language: Language) -> Option<&AssembledPackage> {
        self.packages
            .iter()
            .find(|package| package.language == language)
    }
}

/// A session with a resolved repository and a checked toolchain.
pub struct PreparedRepo {
    config: RepoConfig,
    repo: ResolvedRepo,
    tools: ToolPaths,
    defaults: PackageDefaults,
    renderer: Box<dyn TemplateRenderer>,
}

impl PreparedRepo {
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn repo(&self) -> &ResolvedRepo {
        &self.repo
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    fn context(&self) -> GenerationContext<'_> {
        GenerationContext {
            config: &self.config,
            repo: &self.repo,
            tools: &self.tools,
        }
    }

    /// Build a package of `name`/`version` for every configured language.
    ///
    /// # Errors
    ///
    /// Returns `Build` listing every language whose pipeline failed; the other
    /// languages still run to completion.
    pub async fn build_packages(&self, name: &str, version: &str) -> PackagerResult<BuildReport> {
        info!(name, version, "Building packages");
        let ctx = self.context();
        let pipelines = self.config.languages().iter().map(|&language| {
            let ctx = ctx;
            async move {
                let outcome = self.build_language(&ctx, name, version, language).await;
                (language, outcome)
            }
        });
        collect_outcomes(join_all(pipelines).await)
    }

    async fn build_language(
        &self,
        ctx: &GenerationContext<'_>,
        name: &str,
        version: &str,
        language: Language,
    ) -> PackagerResult<AssembledPackage> {
        clean_output(&codegen::absolute(&self.config.language_out_dir(language))?).await?;
        let result = generate(ctx, name, version, language).await?;
        let info = self
            .defaults
            .with_api(name, version, &self.config.pkg_prefix);
        assemble(result, info, &self.config, self.renderer.as_ref()).await
    }

    /// Build the shared common protos package for every configured language.
    ///
    /// Each configured proto package is generated in list order into the language
    /// tree, which is then assembled once under the common package identity.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the session was not configured for common protos, and
    /// `Build` listing every failed language otherwise.
    pub async fn build_common_proto_packages(&self) -> PackagerResult<BuildReport> {
        if !self.config.build_common_protos {
            return Err(PackagerError::Config(
                "common protos can only be built by a session configured for them".to_string(),
            ));
        }
        let packages = common_proto_packages(&self.config.overrides)?;
        let identity = common_package(&self.config.overrides)?;
        info!(
            package = %identity.name,
            count = packages.len(),
            "Building common protos packages"
        );

        let ctx = self.context();
        let pipelines = self.config.languages().iter().map(|&language| {
            let ctx = ctx;
            let packages = &packages;
            let identity = &identity;
            async move {
                let outcome = self
                    .build_common_language(&ctx, packages, identity, language)
                    .await;
                (language, outcome)
            }
        });
        collect_outcomes(join_all(pipelines).await)
    }

    async fn build_common_language(
        &self,
        ctx: &GenerationContext<'_>,
        packages: &[ProtoPackage],
        identity: &ProtoPackage,
        language: Language,
    ) -> PackagerResult<AssembledPackage> {
        let root = codegen::absolute(&self.config.language_out_dir(language))?;
        clean_output(&root).await?;

        let mut files = BTreeSet::new();
        for package in packages {
            let generated = generate(ctx, &package.name, &package.version, language).await?;
            files.extend(generated.files);
        }
        let result = GenerationResult {
            language,
            root,
            files: files.into_iter().collect(),
        };
        let info = self
            .defaults
            .with_api(&identity.name, &identity.version, &self.config.pkg_prefix);
        assemble(result, info, &self.config, self.renderer.as_ref()).await
    }
}

fn collect_outcomes(
    outcomes: Vec<(Language, PackagerResult<AssembledPackage>)>,
) -> PackagerResult<BuildReport> {
    let mut packages = Vec::new();
    let mut failures = Vec::new();
    for (language, outcome) in outcomes {
        match outcome {
            Ok(package) => packages.push(package),
            Err(error) => {
                error!(%language, %error, "Language pipeline failed");
                failures.push(LanguageFailure { language, error });
            }
        }
    }

    if failures.is_empty() {
        Ok(BuildReport { packages })
    } else {
        Err(PackagerError::Build(BuildFailures::new(failures)))
    }
}
