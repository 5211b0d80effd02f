/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Supported target languages and their per-language conventions.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PackagerError;

/// Target language of a generated package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Java,
    Nodejs,
    Objc,
    Php,
    Python,
    Ruby,
}

/// How generated code is produced for a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Protos are shipped as-is and compiled by the consumer's build.
    CopyOnly,
    /// Protos are compiled in-process into a single descriptor module.
    InProcess,
    /// The external compiler is invoked once per proto.
    Compiler,
}

/// Build configuration variant a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    Standard,
    Alternate,
}

/// Name of a rendered template in the package root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputName {
    /// The template name with the `.tera` suffix stripped
    Stripped,
    /// The package identifier with the given extension
    PackageSpec(&'static str),
    /// A fixed file name
    Fixed(&'static str),
}

/// A template file in a language's template directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFile {
    /// File name inside `<template_root>/<language>/`, including the `.tera` suffix
    pub source: &'static str,
    pub output: OutputName,
    /// Only rendered when the session selects this variant
    pub variant: Option<BuildVariant>,
}

impl TemplateFile {
    const fn plain(source: &'static str) -> Self {
        Self {
            source,
            output: OutputName::Stripped,
            variant: None,
        }
    }

    /// Output path relative to the package root.
    pub fn output_path(&self, package_id: &str) -> PathBuf {
        match self.output {
            OutputName::Stripped => PathBuf::from(
                self.source
                    .strip_suffix(TEMPLATE_SUFFIX)
                    .unwrap_or(self.source),
            ),
            OutputName::PackageSpec(ext) => PathBuf::from(format!("{package_id}.{ext}")),
            OutputName::Fixed(name) => PathBuf::from(name),
        }
    }
}

/// Static package layout of a language
#[derive(Debug, Clone, Copy)]
pub struct PackageLayout {
    /// Copied verbatim from the template directory
    pub copyables: &'static [&'static str],
    pub templates: &'static [TemplateFile],
}

pub const TEMPLATE_SUFFIX: &str = ".tera";

/// Resource directory that Java packages keep their protos in.
pub const JAVA_PROTO_DIR: &str = "src/main/proto";

const GO_LAYOUT: PackageLayout = PackageLayout {
    copyables: &[".gitignore", "LICENSE"],
    templates: &[
        TemplateFile::plain("README.md.tera"),
        TemplateFile::plain("doc.go.tera"),
    ],
};

const JAVA_LAYOUT: PackageLayout = PackageLayout {
    copyables: &[".gitignore", "LICENSE"],
    templates: &[
        TemplateFile {
            source: "build.gradle.tera",
            output: OutputName::Stripped,
            variant: Some(BuildVariant::Standard),
        },
        TemplateFile {
            source: "alt_build.gradle.tera",
            output: OutputName::Fixed("build.gradle"),
            variant: Some(BuildVariant::Alternate),
        },
        TemplateFile::plain("settings.gradle.tera"),
        TemplateFile::plain("README.md.tera"),
    ],
};

const NODEJS_LAYOUT: PackageLayout = PackageLayout {
    copyables: &[".npmignore", "LICENSE"],
    templates: &[
        TemplateFile::plain("package.json.tera"),
        TemplateFile::plain("index.js.tera"),
        TemplateFile::plain("README.md.tera"),
    ],
};

const OBJC_LAYOUT: PackageLayout = PackageLayout {
    copyables: &["LICENSE"],
    templates: &[
        TemplateFile {
            source: "podspec.tera",
            output: OutputName::PackageSpec("podspec"),
            variant: None,
        },
        TemplateFile::plain("README.md.tera"),
    ],
};

const PHP_LAYOUT: PackageLayout = PackageLayout {
    copyables: &[".gitignore", "LICENSE"],
    templates: &[
        TemplateFile::plain("composer.json.tera"),
        TemplateFile::plain("README.md.tera"),
    ],
};

const PYTHON_LAYOUT: PackageLayout = PackageLayout {
    copyables: &["MANIFEST.in", "setup.cfg", "LICENSE"],
    templates: &[
        TemplateFile::plain("setup.py.tera"),
        TemplateFile::plain("README.rst.tera"),
        TemplateFile::plain("requirements.txt.tera"),
    ],
};

const RUBY_LAYOUT: PackageLayout = PackageLayout {
    copyables: &["Gemfile", "Rakefile", "LICENSE"],
    templates: &[
        TemplateFile {
            source: "gemspec.tera",
            output: OutputName::PackageSpec("gemspec"),
            variant: None,
        },
        TemplateFile::plain("README.md.tera"),
    ],
};

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Go,
        Language::Java,
        Language::Nodejs,
        Language::Objc,
        Language::Php,
        Language::Python,
        Language::Ruby,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Java => "java",
            Language::Nodejs => "nodejs",
            Language::Objc => "objc",
            Language::Php => "php",
            Language::Python => "python",
            Language::Ruby => "ruby",
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Language::Java => Strategy::CopyOnly,
            Language::Nodejs => Strategy::InProcess,
            Language::Go | Language::Objc | Language::Php | Language::Python | Language::Ruby => {
                Strategy::Compiler
            }
        }
    }

    /// Whether packages for this language need the external compiler at all.
    pub fn uses_compiler(self) -> bool {
        self.strategy() == Strategy::Compiler
    }

    /// Default plugin executable name, for languages that need a plugin.
    ///
    /// Languages without a specific default follow the `grpc_<lang>_plugin` convention.
    pub fn default_plugin(self) -> Option<String> {
        match self.strategy() {
            Strategy::CopyOnly | Strategy::InProcess => None,
            Strategy::Compiler => Some(match self {
                Language::Go => "protoc-gen-go".to_string(),
                Language::Php => "protoc-gen-php".to_string(),
                Language::Objc => "grpc_objective_c_plugin".to_string(),
                other => format!("grpc_{}_plugin", other.name()),
            }),
        }
    }

    /// Compiler output flags for this language.
    pub fn output_args(self, out_dir: &Path, common_protos: bool) -> Vec<String> {
        let dir = out_dir.display();
        match self {
            Language::Go if common_protos => vec![format!("--go_out={dir}")],
            Language::Go => vec![format!("--go_out=plugins=grpc:{dir}")],
            Language::Php if common_protos => vec![format!("--php_out={dir}")],
            Language::Php => vec![format!("--php_out=skip-imported=true:{dir}")],
            _ if common_protos => vec![format!("--{}_out={dir}", self.name())],
            _ => vec![
                format!("--{}_out={dir}", self.name()),
                format!("--grpc_out={dir}"),
            ],
        }
    }

    /// Flag registering the plugin at `plugin_path`, if the language registers one.
    pub fn plugin_registration(self, plugin_path: &Path) -> Option<String> {
        match self {
            // gRPC is bundled into --go_out, so the plugin replaces the Go generator itself.
            Language::Go => Some(format!("--plugin=protoc-gen-go={}", plugin_path.display())),
            Language::Php => Some(format!("--plugin=protoc-gen-php={}", plugin_path.display())),
            Language::Objc | Language::Python | Language::Ruby => Some(format!(
                "--plugin=protoc-gen-grpc={}",
                plugin_path.display()
            )),
            Language::Java | Language::Nodejs => None,
        }
    }

    pub fn layout(self) -> &'static PackageLayout {
        match self {
            Language::Go => &GO_LAYOUT,
            Language::Java => &JAVA_LAYOUT,
            Language::Nodejs => &NODEJS_LAYOUT,
            Language::Objc => &OBJC_LAYOUT,
            Language::Php => &PHP_LAYOUT,
            Language::Python => &PYTHON_LAYOUT,
            Language::Ruby => &RUBY_LAYOUT,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = PackagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "go" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "nodejs" | "node" | "js" => Ok(Language::Nodejs),
            "objc" | "objective-c" => Ok(Language::Objc),
            "php" => Ok(Language::Php),
            "python" => Ok(Language::Python),
            "ruby" => Ok(Language::Ruby),
            _ => Err(PackagerError::InvalidLanguage(s.to_string())),
        }
    }
}

/// Parse a comma separated language list, keeping the first occurrence of each language.
pub fn parse_languages(list: &str) -> Result<Vec<Language>, PackagerError> {
    let mut languages = Vec::new();
    for item in list.split(',').filter(|item| !item.trim().is_empty()) {
        let language = item.parse()?;
        if !languages.contains(&language) {
            languages.push(language);
        }
    }
    Ok(languages)
}
