/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::slash_path;
use crate::error::PackagerResult;

pub const LIB_DIR: &str = "lib";

const RUBY_EXTENSION: &str = "rb";

/// Move the generated `files` under `lib/`, merging into whatever `lib/` already holds.
///
/// Only the listed files move. Directories they leave empty are removed.
/// Returns the new paths, relative to `root` and sorted.
pub async fn relocate_into_lib(root: &Path, files: &[PathBuf]) -> PackagerResult<Vec<PathBuf>> {
    let lib = Path::new(LIB_DIR);
    let mut relocated = Vec::with_capacity(files.len());
    let mut vacated = BTreeSet::new();

    for file in files {
        if file.starts_with(lib) {
            relocated.push(file.clone());
            continue;
        }
        let target = lib.join(file);
        if let Some(parent) = root.join(&target).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(from = %file.display(), to = %target.display(), "Relocating");
        tokio::fs::rename(root.join(file), root.join(&target)).await?;

        vacated.extend(
            file.ancestors()
                .skip(1)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf),
        );
        relocated.push(target);
    }

    let mut vacated: Vec<PathBuf> = vacated.into_iter().collect();
    vacated.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    for dir in vacated {
        let dir = root.join(dir);
        if tokio::fs::read_dir(&dir).await?.next_entry().await?.is_none() {
            tokio::fs::remove_dir(&dir).await?;
        }
    }

    relocated.sort();
    Ok(relocated)
}

/// Require paths of the Ruby files among `files`, which live under `lib/`.
pub fn require_paths(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .filter(|file| {
            file.extension()
                .is_some_and(|extension| extension == RUBY_EXTENSION)
        })
        .filter_map(|file| file.strip_prefix(LIB_DIR).ok())
        .map(|file| slash_path(&file.with_extension("")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;
    use tempfile::TempDir;

    fn paths(files: &[&str]) -> Vec<PathBuf> {
        files.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn test_relocate_into_lib() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let files = paths(&[
            "google/pubsub/v1/notes.txt",
            "google/pubsub/v1/pubsub_pb.rb",
            "google/pubsub/v1/pubsub_services_pb.rb",
        ]);
        for file in &files {
            write_file(root, file.to_str().unwrap(), "");
        }

        let relocated = relocate_into_lib(root, &files).await.unwrap();
        assert_eq!(
            require_paths(&relocated),
            vec![
                "google/pubsub/v1/pubsub_pb",
                "google/pubsub/v1/pubsub_services_pb",
            ]
        );
        assert_eq!(relocated[0], PathBuf::from("lib/google/pubsub/v1/notes.txt"));
        assert!(root.join("lib/google/pubsub/v1/pubsub_pb.rb").is_file());
        assert!(!root.join("google").exists());
    }

    #[tokio::test]
    async fn test_files_merge_into_existing_lib() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "lib/google/rpc/status_pb.rb", "");
        write_file(root, "google/type/date_pb.rb", "");

        let relocated = relocate_into_lib(root, &paths(&["google/type/date_pb.rb"]))
            .await
            .unwrap();
        assert_eq!(relocated, paths(&["lib/google/type/date_pb.rb"]));
        assert!(root.join("lib/google/rpc/status_pb.rb").is_file());
        assert!(root.join("lib/google/type/date_pb.rb").is_file());
        assert!(!root.join("google").exists());
    }

    #[tokio::test]
    async fn test_unlisted_entries_stay_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "Gemfile", "");
        write_file(root, "google/pubsub/v1/pubsub_pb.rb", "");
        write_file(root, "google/README.md", "");

        relocate_into_lib(root, &paths(&["google/pubsub/v1/pubsub_pb.rb"]))
            .await
            .unwrap();
        assert!(root.join("Gemfile").is_file());
        assert!(!root.join("lib/Gemfile").exists());
        assert!(root.join("google/README.md").is_file());
        assert!(!root.join("google/pubsub").exists());
    }
}
