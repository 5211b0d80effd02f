/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Package assembly: language fix-ups on the generated tree, then static
 * boilerplate copied and metadata templates rendered into the package root.
 */

pub mod python;
pub mod ruby;

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::codegen::GenerationResult;
use crate::config::language_package_rules;
use crate::error::{PackagerError, PackagerResult};
use crate::language::{BuildVariant, Language, TemplateFile};
use crate::options::RepoConfig;
use crate::package_info::{LanguageFields, PackageInfo, TemplateParams};
use crate::render::TemplateRenderer;

/// A finished language package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPackage {
    pub language: Language,
    pub root: PathBuf,
    pub package_id: String,
    /// Generated files, relative to `root`, after fix-ups
    pub generated: Vec<PathBuf>,
    /// Boilerplate and rendered files written into `root`
    pub written: Vec<PathBuf>,
}

/// Turn a generation result into a complete package.
///
/// # Errors
///
/// Returns `TemplateRender` if a template fails to render and `Io` on filesystem failures.
pub async fn assemble(
    result: GenerationResult,
    info: PackageInfo,
    config: &RepoConfig,
    renderer: &dyn TemplateRenderer,
) -> PackagerResult<AssembledPackage> {
    let GenerationResult {
        language,
        root,
        files,
    } = result;

    let (fields, generated) = apply_fixups(language, &root, files, &info, config).await?;
    let params = info.finalize(LanguageFields {
        files: generated.iter().map(|file| slash_path(file)).collect(),
        ..fields
    });

    let written = write_static_files(language, &root, &params, config, renderer).await?;
    info!(
        %language,
        package = params.package_id(),
        root = %root.display(),
        "Assembled package"
    );

    Ok(AssembledPackage {
        language,
        package_id: params.package_id().to_string(),
        root,
        generated,
        written,
    })
}

/// Language fix-ups on the generated tree.
///
/// Returns the template fields they contribute and the generated files as
/// they are after the fix-ups, sorted.
async fn apply_fixups(
    language: Language,
    root: &Path,
    files: Vec<PathBuf>,
    info: &PackageInfo,
    config: &RepoConfig,
) -> PackagerResult<(LanguageFields, Vec<PathBuf>)> {
    match language {
        Language::Python => {
            let rules = language_package_rules(language, &config.overrides)?;
            let version = info.api().version.clone();
            let common = config.build_common_protos;
            let root = root.to_path_buf();
            let (markers, mut files) = tokio::task::spawn_blocking(move || {
                let kind = if common {
                    python::PackageKind::Common {
                        namespaces: &rules.namespaces,
                    }
                } else {
                    python::PackageKind::Api { version: &version }
                };
                python::add_init_files(&root, &files, kind).map(|markers| (markers, files))
            })
            .await
            .map_err(|e| PackagerError::Io(std::io::Error::other(e)))??;

            files.extend(markers.created);
            files.sort();
            let fields = LanguageFields {
                namespaces: Some(markers.namespaces),
                ..LanguageFields::default()
            };
            Ok((fields, files))
        }
        Language::Ruby => {
            let files = ruby::relocate_into_lib(root, &files).await?;
            let fields = LanguageFields {
                modules: Some(ruby::require_paths(&files)),
                ..LanguageFields::default()
            };
            Ok((fields, files))
        }
        _ => Ok((LanguageFields::default(), files)),
    }
}

/// Copy the language's static files and render its templates into `root`.
///
/// Files missing from the template directory are skipped. Returns the written paths, relative to `root`.
pub async fn write_static_files(
    language: Language,
    root: &Path,
    params: &TemplateParams,
    config: &RepoConfig,
    renderer: &dyn TemplateRenderer,
) -> PackagerResult<Vec<PathBuf>> {
    let template_dir = config.language_template_dir(language);
    let layout = language.layout();
    let variant = if config.alt_java {
        BuildVariant::Alternate
    } else {
        BuildVariant::Standard
    };
    tokio::fs::create_dir_all(root).await?;

    let copies = try_join_all(
        layout
            .copyables
            .iter()
            .map(|name| copy_static(&template_dir, name, root)),
    );
    let renders = try_join_all(
        layout
            .templates
            .iter()
            .filter(|template| template.variant.map_or(true, |v| v == variant))
            .map(|template| render_template(&template_dir, template, root, params, renderer)),
    );
    let (copied, rendered) = futures::try_join!(copies, renders)?;

    let mut written: Vec<PathBuf> = copied.into_iter().chain(rendered).flatten().collect();
    written.sort();
    Ok(written)
}

async fn copy_static(template_dir: &Path, name: &str, root: &Path) -> PackagerResult<Option<PathBuf>> {
    let source = template_dir.join(name);
    match tokio::fs::copy(&source, root.join(name)).await {
        Ok(_) => {
            debug!(file = name, "Copied static file");
            Ok(Some(PathBuf::from(name)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(source = %source.display(), "No static file, skipping");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_template(
    template_dir: &Path,
    template: &TemplateFile,
    root: &Path,
    params: &TemplateParams,
    renderer: &dyn TemplateRenderer,
) -> PackagerResult<Option<PathBuf>> {
    let source = template_dir.join(template.source);
    let text = match tokio::fs::read_to_string(&source).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(source = %source.display(), "No template, skipping");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let rendered = renderer.render(template.source, &text, params.as_value())?;
    let output = template.output_path(params.package_id());
    tokio::fs::write(root.join(&output), rendered).await?;
    debug!(template = template.source, output = %output.display(), "Rendered template");
    Ok(Some(output))
}

/// A relative path with `/` separators.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
