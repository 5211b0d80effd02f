/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use std::path::Path;

use tracing::info;

use super::GenerationContext;
use crate::discovery::for_each_proto;
use crate::error::PackagerResult;
use crate::language::JAVA_PROTO_DIR;

/// Copy the protos of `name`/`version` unchanged into the package's proto resource directory.
pub async fn copy_protos(
    ctx: &GenerationContext<'_>,
    name: &str,
    version: &str,
    out_dir: &Path,
) -> PackagerResult<()> {
    let repo_root = ctx.repo.root();
    let proto_root = out_dir.join(JAVA_PROTO_DIR);

    let copied = for_each_proto(ctx.repo, name, version, |proto| {
        let source = repo_root.join(&proto);
        let target = proto_root.join(&proto);
        async move {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(&source, &target).await?;
            Ok(())
        }
    })
    .await?;

    info!(name, version, count = copied.len(), "Copied protos");
    Ok(())
}
