/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::process::Command;
use tracing::{debug, info};

use super::GenerationContext;
use crate::discovery::find_protos;
use crate::error::{PackagerError, PackagerResult};
use crate::language::Language;

/// Compiler processes running at once for one language.
pub const MAX_CONCURRENT_COMPILES: usize = 8;

/// Arguments for compiling one proto.
///
/// `plugin` is the resolved plugin executable; `None` builds message code only.
pub fn compiler_args(
    language: Language,
    out_dir: &Path,
    plugin: Option<&Path>,
    include_paths: &[PathBuf],
    proto: &Path,
) -> Vec<String> {
    let mut args = language.output_args(out_dir, plugin.is_none());
    if let Some(registration) = plugin.and_then(|path| language.plugin_registration(path)) {
        args.push(registration);
    }
    args.extend(
        include_paths
            .iter()
            .map(|include| format!("-I{}", include.display())),
    );
    args.push("-I.".to_string());
    args.push(proto.display().to_string());
    args
}

/// Compile every proto of `name`/`version` with the external compiler.
pub async fn run_compiler(
    ctx: &GenerationContext<'_>,
    name: &str,
    version: &str,
    language: Language,
    out_dir: &Path,
) -> PackagerResult<()> {
    let protos = find_protos(ctx.repo, name, version).await?;
    tokio::fs::create_dir_all(out_dir).await?;

    let compiler = ctx
        .tools
        .get(&ctx.config.compiler)
        .cloned()
        .unwrap_or_else(|| PathBuf::from(&ctx.config.compiler));
    let plugin = if ctx.config.build_common_protos {
        None
    } else {
        match ctx.config.plugin_name(language) {
            Some(plugin_name) => Some(
                ctx.tools
                    .get(&plugin_name)
                    .cloned()
                    .ok_or(PackagerError::MissingDependency(plugin_name))?,
            ),
            None => None,
        }
    };
    let include_paths = ctx.include_paths()?;

    info!(%language, name, version, count = protos.len(), "Running proto compiler");
    stream::iter(protos)
        .map(|proto| {
            let args = compiler_args(language, out_dir, plugin.as_deref(), &include_paths, &proto);
            invoke(&compiler, args, ctx.repo.root(), proto)
        })
        .buffer_unordered(MAX_CONCURRENT_COMPILES)
        .try_collect::<Vec<()>>()
        .await?;
    Ok(())
}

async fn invoke(
    compiler: &Path,
    args: Vec<String>,
    cwd: &Path,
    proto: PathBuf,
) -> PackagerResult<()> {
    debug!(compiler = %compiler.display(), args = ?args, "Invoking compiler");
    let output = Command::new(compiler)
        .args(&args)
        .current_dir(cwd)
        .output()
        .await?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = if stdout.trim().is_empty() {
            stderr.trim().to_string()
        } else if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            format!("{}\n{}", stdout.trim(), stderr.trim())
        };
        return Err(PackagerError::Compiler {
            proto: proto.display().to_string(),
            status: output.status.code(),
            output: combined,
        });
    }
    Ok(())
}
