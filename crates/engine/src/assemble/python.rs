/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::slash_path;

pub const INIT_FILE: &str = "__init__.py";

/// Body of the `__init__.py` of a namespace package.
pub const NAMESPACE_INIT: &str = "__import__('pkg_resources').declare_namespace(__name__)\n";

/// How package directories are told apart from namespace directories.
#[derive(Debug, Clone, Copy)]
pub enum PackageKind<'a> {
    /// A directory named like `version` holds the code, everything above it is a namespace.
    Api { version: &'a str },
    /// Only directories named in `namespaces` are namespaces.
    Common { namespaces: &'a [String] },
}

impl PackageKind<'_> {
    fn is_namespace(&self, dir_name: &str) -> bool {
        match self {
            PackageKind::Api { version } => dir_name != *version,
            PackageKind::Common { namespaces } => {
                namespaces.iter().any(|namespace| namespace == dir_name)
            }
        }
    }
}

/// Package markers added to a generated Python tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMarkers {
    /// Dotted names of the namespace packages, sorted
    pub namespaces: Vec<String>,
    /// `__init__.py` files written, relative to the root
    pub created: Vec<PathBuf>,
}

/// Give every directory holding generated `files` an `__init__.py`, keeping existing ones.
///
/// The package root itself gets none.
pub fn add_init_files(
    root: &Path,
    files: &[PathBuf],
    kind: PackageKind<'_>,
) -> io::Result<PackageMarkers> {
    let dirs: BTreeSet<&Path> = files
        .iter()
        .flat_map(|file| file.ancestors().skip(1))
        .filter(|dir| !dir.as_os_str().is_empty())
        .collect();

    let mut markers = PackageMarkers::default();
    for dir in dirs {
        let dir_name = dir
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let is_namespace = kind.is_namespace(&dir_name);

        let init_file = dir.join(INIT_FILE);
        let init_path = root.join(&init_file);
        if !init_path.exists() {
            let content = if is_namespace { NAMESPACE_INIT } else { "" };
            fs::write(&init_path, content)?;
            debug!(path = %init_path.display(), is_namespace, "Created package marker");
            markers.created.push(init_file);
        }

        if is_namespace {
            markers.namespaces.push(slash_path(dir).replace('/', "."));
        }
    }
    markers.namespaces.sort();
    Ok(markers)
}
