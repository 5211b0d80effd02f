//! Protopack Engine Library
//!
//! Copyright 2025 Release Workshop Ltd
//! Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
//! See the LICENSE file in the project root for details.
//!
//! This library builds per-language source packages from protocol buffer API
//! definitions. A session resolves a proto repository (a local directory or a
//! remote zip archive), checks the compiler toolchain, then generates code and
//! assembles one package per target language.
//!
//! # Example
//!
//! ```rust,no_run
//! use protopack_engine::{parse_languages, ApiRepo, RepoConfig, RepoSource};
//!
//! # async fn run() -> Result<(), protopack_engine::PackagerError> {
//! let mut config = RepoConfig::new(
//!     RepoSource::Local("googleapis".into()),
//!     parse_languages("python,ruby")?,
//! );
//! config.is_google_api = true;
//!
//! let session = ApiRepo::new(config).prepare().await?;
//! let report = session.build_packages("pubsub", "v1").await?;
//! for package in &report.packages {
//!     println!("{} -> {}", package.language, package.root.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api_repo;
pub mod assemble;
pub mod codegen;
pub mod config;
pub mod deps;
pub mod discovery;
pub mod error;
pub mod language;
pub mod options;
pub mod package_info;
pub mod render;
pub mod repo;

#[cfg(test)]
mod test_support;

pub use api_repo::{ApiRepo, BuildReport, PreparedRepo};
pub use assemble::AssembledPackage;
pub use config::{load_overrides, ProtoPackage};
pub use error::{BuildFailures, LanguageFailure, PackagerError, PackagerResult};
pub use language::{parse_languages, Language};
pub use options::{RepoConfig, RepoSource, DEFAULT_COMPILER, DEFAULT_ZIP_URL};
pub use render::{TemplateRenderer, TeraRenderer};
pub use repo::{ArchiveFetcher, HttpArchiveFetcher, ResolvedRepo};
