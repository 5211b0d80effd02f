/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::language::Language;

/// Top-level error type for the packaging engine
#[derive(Error, Debug)]
pub enum PackagerError {
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Missing required subdirectory '{subdirectory}' in {root}")]
    MissingSubdirectory { root: PathBuf, subdirectory: String },

    #[error("Malformed archive: {0}")]
    MalformedArchive(String),

    #[error("Missing dependency: could not find '{0}' on the search path")]
    MissingDependency(String),

    #[error("Compiler failed on {proto} (exit status {}): {output}", display_status(*.status))]
    Compiler {
        proto: String,
        status: Option<i32>,
        output: String,
    },

    #[error("Unresolved import: {0}")]
    UnresolvedImport(String),

    #[error("Failed to render template {template}: {message}")]
    TemplateRender { template: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Build(BuildFailures),
}

pub type PackagerResult<T> = Result<T, PackagerError>;

fn display_status(status: Option<i32>) -> String {
    status.map_or_else(|| "none".to_string(), |code| code.to_string())
}

/// A failed language pipeline
#[derive(Debug)]
pub struct LanguageFailure {
    pub language: Language,
    pub error: PackagerError,
}

/// Every language pipeline that failed during one build, in configured language order.
#[derive(Debug)]
pub struct BuildFailures {
    failures: Vec<LanguageFailure>,
}

impl BuildFailures {
    pub fn new(failures: Vec<LanguageFailure>) -> Self {
        Self { failures }
    }

    /// The first failure, which leads the error message.
    pub fn first(&self) -> Option<&LanguageFailure> {
        self.failures.first()
    }

    pub fn failures(&self) -> &[LanguageFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BuildFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} language pipeline(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.language, failure.error)?;
        }
        Ok(())
    }
}

/// Flatten an error and its sources into one line.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
