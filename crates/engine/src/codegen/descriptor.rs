/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * In-process generation: protos are compiled with `protox` and the merged
 * descriptors are written out as a single JavaScript module.
 */

use std::path::{Path, PathBuf};

use protox::prost_reflect::{
    DescriptorPool, EnumDescriptor, FileDescriptor, Kind, MessageDescriptor, ServiceDescriptor,
};
use serde::Serialize;
use tracing::info;

use super::{absolute, GenerationContext};
use crate::discovery::find_protos;
use crate::error::{PackagerError, PackagerResult};
use crate::package_info::simple_name;

#[derive(Debug, Serialize)]
pub struct DescriptorModule {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub package: String,
    pub dependencies: Vec<String>,
    pub messages: Vec<MessageEntry>,
    pub enums: Vec<EnumEntry>,
    pub services: Vec<ServiceEntry>,
}

#[derive(Debug, Serialize)]
pub struct MessageEntry {
    pub name: String,
    pub full_name: String,
    pub fields: Vec<FieldEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<MessageEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumEntry>,
}

#[derive(Debug, Serialize)]
pub struct FieldEntry {
    pub name: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub type_name: String,
    pub repeated: bool,
    pub map: bool,
}

#[derive(Debug, Serialize)]
pub struct EnumEntry {
    pub name: String,
    pub full_name: String,
    pub values: Vec<EnumValueEntry>,
}

#[derive(Debug, Serialize)]
pub struct EnumValueEntry {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Serialize)]
pub struct ServiceEntry {
    pub name: String,
    pub full_name: String,
    pub methods: Vec<MethodEntry>,
}

#[derive(Debug, Serialize)]
pub struct MethodEntry {
    pub name: String,
    pub input: String,
    pub output: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl DescriptorModule {
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        Self {
            files: pool.files().map(|file| file_entry(&file)).collect(),
        }
    }
}

fn file_entry(file: &FileDescriptor) -> FileEntry {
    FileEntry {
        name: file.name().to_string(),
        package: file.package_name().to_string(),
        dependencies: file
            .dependencies()
            .map(|dependency| dependency.name().to_string())
            .collect(),
        messages: file.messages().map(|message| message_entry(&message)).collect(),
        enums: file.enums().map(|enumeration| enum_entry(&enumeration)).collect(),
        services: file.services().map(|service| service_entry(&service)).collect(),
    }
}

fn message_entry(message: &MessageDescriptor) -> MessageEntry {
    MessageEntry {
        name: message.name().to_string(),
        full_name: message.full_name().to_string(),
        fields: message
            .fields()
            .map(|field| FieldEntry {
                name: field.name().to_string(),
                number: field.number(),
                type_name: kind_name(&field.kind()),
                repeated: field.is_list(),
                map: field.is_map(),
            })
            .collect(),
        // Map entries are synthesized by the compiler and described by their field.
        nested: message
            .child_messages()
            .filter(|child| !child.is_map_entry())
            .map(|child| message_entry(&child))
            .collect(),
        enums: message
            .child_enums()
            .map(|enumeration| enum_entry(&enumeration))
            .collect(),
    }
}

fn enum_entry(enumeration: &EnumDescriptor) -> EnumEntry {
    EnumEntry {
        name: enumeration.name().to_string(),
        full_name: enumeration.full_name().to_string(),
        values: enumeration
            .values()
            .map(|value| EnumValueEntry {
                name: value.name().to_string(),
                number: value.number(),
            })
            .collect(),
    }
}

fn service_entry(service: &ServiceDescriptor) -> ServiceEntry {
    ServiceEntry {
        name: service.name().to_string(),
        full_name: service.full_name().to_string(),
        methods: service
            .methods()
            .map(|method| MethodEntry {
                name: method.name().to_string(),
                input: method.input().full_name().to_string(),
                output: method.output().full_name().to_string(),
                client_streaming: method.is_client_streaming(),
                server_streaming: method.is_server_streaming(),
            })
            .collect(),
    }
}

fn kind_name(kind: &Kind) -> String {
    match kind {
        Kind::Double => "double".to_string(),
        Kind::Float => "float".to_string(),
        Kind::Int32 => "int32".to_string(),
        Kind::Int64 => "int64".to_string(),
        Kind::Uint32 => "uint32".to_string(),
        Kind::Uint64 => "uint64".to_string(),
        Kind::Sint32 => "sint32".to_string(),
        Kind::Sint64 => "sint64".to_string(),
        Kind::Fixed32 => "fixed32".to_string(),
        Kind::Fixed64 => "fixed64".to_string(),
        Kind::Sfixed32 => "sfixed32".to_string(),
        Kind::Sfixed64 => "sfixed64".to_string(),
        Kind::Bool => "bool".to_string(),
        Kind::String => "string".to_string(),
        Kind::Bytes => "bytes".to_string(),
        Kind::Message(message) => message.full_name().to_string(),
        Kind::Enum(enumeration) => enumeration.full_name().to_string(),
    }
}

/// Compile `protos` (absolute paths) against `includes` into descriptor JSON.
///
/// This blocks; run it off the async executor.
///
/// # Errors
///
/// Returns `UnresolvedImport` if an import or type reference cannot be resolved.
pub fn build_descriptor_json(includes: &[PathBuf], protos: &[PathBuf]) -> PackagerResult<String> {
    let unresolved = |e: protox::Error| PackagerError::UnresolvedImport(e.to_string());

    let mut compiler = protox::Compiler::new(includes).map_err(unresolved)?;
    compiler.include_imports(true);
    compiler.open_files(protos).map_err(unresolved)?;

    let module = DescriptorModule::from_pool(&compiler.descriptor_pool());
    let json = serde_json::to_string_pretty(&module).map_err(std::io::Error::from)?;
    Ok(json)
}

/// Compile the protos of `name`/`version` into one JavaScript module in `out_dir`.
pub async fn write_descriptor_module(
    ctx: &GenerationContext<'_>,
    name: &str,
    version: &str,
    out_dir: &Path,
) -> PackagerResult<()> {
    let repo_root = absolute(ctx.repo.root())?;
    let protos: Vec<PathBuf> = find_protos(ctx.repo, name, version)
        .await?
        .into_iter()
        .map(|proto| repo_root.join(proto))
        .collect();
    let mut includes = ctx.include_paths()?;
    includes.push(repo_root);

    let json = tokio::task::spawn_blocking(move || build_descriptor_json(&includes, &protos))
        .await
        .map_err(|e| PackagerError::Io(std::io::Error::other(e)))??;

    tokio::fs::create_dir_all(out_dir).await?;
    // Common protos share one tree, where simple names can collide (`type`, `logging/type`).
    let module_name = if ctx.config.build_common_protos {
        name.replace('/', "-")
    } else {
        simple_name(name).to_string()
    };
    let module_path = out_dir.join(format!("{module_name}.js"));
    tokio::fs::write(&module_path, format!("module.exports = {json};\n")).await?;

    info!(name, version, module = %module_path.display(), "Wrote descriptor module");
    Ok(())
}
