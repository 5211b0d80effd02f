/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::future::Future;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use futures::future::try_join_all;
use tracing::debug;

use crate::error::{PackagerError, PackagerResult};
use crate::repo::ResolvedRepo;

/// Proto files of one API version, relative to the repository root.
pub type ProtoSet = Vec<PathBuf>;

const PROTO_EXTENSION: &str = "proto";

/// Find the `.proto` files directly inside the directory of `name`/`version`.
///
/// The result is sorted, but callers should not rely on any particular order.
///
/// # Errors
///
/// Returns `NotFound` if the API name or version directory does not exist.
pub async fn find_protos(
    repo: &ResolvedRepo,
    name: &str,
    version: &str,
) -> PackagerResult<ProtoSet> {
    let dir = repo.proto_dir(name, version);
    match tokio::fs::metadata(&dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(PackagerError::NotFound(dir)),
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(PackagerError::NotFound(dir)),
        Err(e) => return Err(e.into()),
    }

    let mut protos = ProtoSet::new();
    let mut entries = tokio::fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_proto = path
            .extension()
            .is_some_and(|extension| extension == PROTO_EXTENSION);
        if is_proto && entry.file_type().await?.is_file() {
            let relative = path.strip_prefix(repo.root()).unwrap_or(&path).to_path_buf();
            protos.push(relative);
        }
    }
    protos.sort();

    debug!(name, version, count = protos.len(), "Discovered protos");
    Ok(protos)
}

/// Run `f` concurrently for every proto of `name`/`version` and collect the results.
///
/// Each call runs as its own task. The first failure is returned as soon as it
/// happens; calls already running carry on and their results are dropped.
pub async fn for_each_proto<F, Fut, T>(
    repo: &ResolvedRepo,
    name: &str,
    version: &str,
    f: F,
) -> PackagerResult<Vec<T>>
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = PackagerResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let protos = find_protos(repo, name, version).await?;
    let tasks = protos.into_iter().map(|proto| tokio::spawn(f(proto)));
    try_join_all(tasks.map(|task| async move {
        match task.await {
            Ok(result) => result,
            Err(e) => Err(PackagerError::Io(io::Error::other(e))),
        }
    }))
    .await
}
