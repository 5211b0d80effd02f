/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Resolution of the proto source repository: a local directory, or a remote
 * zip archive that is downloaded and extracted into a temporary directory.
 */

pub mod archive;
pub mod fetch;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{PackagerError, PackagerResult};
use crate::options::{RepoConfig, RepoSource, GOOGLE_API_DIR};

pub use fetch::{ArchiveFetcher, HttpArchiveFetcher};

/// A validated proto repository on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepo {
    root: PathBuf,
    is_google_api: bool,
}

impl ResolvedRepo {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the protos of one API version.
    ///
    /// An empty version means the protos sit directly under the API name.
    pub fn proto_dir(&self, name: &str, version: &str) -> PathBuf {
        let mut dir = self.root.clone();
        if self.is_google_api {
            dir.push(GOOGLE_API_DIR);
        }
        dir.push(name);
        if !version.is_empty() {
            dir.push(version);
        }
        dir
    }
}

/// Validate or materialize the proto repository described by `config`.
///
/// Downloaded archives are extracted into a temporary directory that is left in place.
///
/// # Errors
///
/// - `NotFound` / `NotADirectory` for a bad local path
/// - `Fetch` / `MalformedArchive` for a bad remote archive
/// - `MissingSubdirectory` if the google API layout is expected but absent
pub async fn resolve(
    config: &RepoConfig,
    fetcher: &dyn ArchiveFetcher,
) -> PackagerResult<ResolvedRepo> {
    let root = match &config.source {
        RepoSource::Local(path) => {
            ensure_directory(path).await?;
            path.clone()
        }
        RepoSource::Remote(url) => download_and_extract(url, fetcher).await?,
    };

    if config.is_google_api {
        let google_dir = root.join(GOOGLE_API_DIR);
        let is_dir = match tokio::fs::metadata(&google_dir).await {
            Ok(metadata) => metadata.is_dir(),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        if !is_dir {
            return Err(PackagerError::MissingSubdirectory {
                root,
                subdirectory: GOOGLE_API_DIR.to_string(),
            });
        }
    }

    info!(repo = %root.display(), "Resolved proto repository");
    Ok(ResolvedRepo {
        root,
        is_google_api: config.is_google_api,
    })
}

async fn ensure_directory(path: &Path) -> PackagerResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(PackagerError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(PackagerError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn download_and_extract(url: &str, fetcher: &dyn ArchiveFetcher) -> PackagerResult<PathBuf> {
    info!(url, "Fetching proto repository archive");
    let bytes = fetcher.fetch(url).await?;
    let dest = tempfile::Builder::new()
        .prefix("protopack-repo-")
        .tempdir()?
        .keep();
    tokio::task::spawn_blocking(move || archive::extract_single_root(&bytes, &dest))
        .await
        .map_err(|e| PackagerError::Io(std::io::Error::other(e)))?
}
