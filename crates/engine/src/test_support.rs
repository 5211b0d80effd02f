//! Test helpers shared by the engine's unit tests.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{PackagerError, PackagerResult};
use crate::language::Language;
use crate::options::{RepoConfig, RepoSource};
use crate::repo::{self, ArchiveFetcher, ResolvedRepo};

/// Build an in-memory zip archive from (path, content) pairs.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, content) in entries {
        writer
            .start_file(*path, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Serves fixed archive bytes, or fails when built with `unused`.
pub struct StaticFetcher {
    bytes: Option<Vec<u8>>,
}

impl StaticFetcher {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }

    pub fn unused() -> Self {
        Self { bytes: None }
    }
}

#[async_trait]
impl ArchiveFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> PackagerResult<Vec<u8>> {
        self.bytes.clone().ok_or_else(|| PackagerError::Fetch {
            url: url.to_string(),
            message: "404 Not Found".to_string(),
        })
    }
}

/// Write a file, creating parent directories.
pub fn write_file(root: &Path, relative_path: &str, content: &str) -> PathBuf {
    let path = root.join(relative_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub const PUBSUB_PROTO: &str = r#"syntax = "proto3";

package google.pubsub.v1;

message Topic {
  string name = 1;
  map<string, string> labels = 2;
}

message GetTopicRequest {
  string topic = 1;
}

service Publisher {
  rpc GetTopic(GetTopicRequest) returns (Topic);
}
"#;

/// Resolve a local repository rooted at `root`.
pub async fn resolved_repo(root: &Path, is_google_api: bool) -> ResolvedRepo {
    let mut config = RepoConfig::new(
        RepoSource::Local(root.to_path_buf()),
        Vec::<Language>::new(),
    );
    config.is_google_api = is_google_api;
    repo::resolve(&config, &StaticFetcher::unused()).await.unwrap()
}

/// Write an executable shell script into `dir`.
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A stand-in for protoc that writes one output file per proto.
///
/// Every invocation appends its arguments to `log`. When `fail` is set it
/// exits with status 3 instead.
#[cfg(unix)]
pub fn fake_protoc(log: &Path, fail: bool) -> String {
    let failure = if fail {
        "echo \"$proto: simulated failure\" >&2\nexit 3\n"
    } else {
        ""
    };
    format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
out=""
lang=""
proto=""
for arg in "$@"; do
  case "$arg" in
    --grpc_out=*|--plugin=*|-I*) ;;
    --*_out=*)
      lang="${{arg%%_out=*}}"
      lang="${{lang#--}}"
      out="${{arg#*_out=}}"
      out="${{out##*:}}"
      ;;
    *) proto="$arg" ;;
  esac
done
{failure}dir=$(dirname "$proto")
base=$(basename "$proto" .proto)
mkdir -p "$out/$dir"
case "$lang" in
  python) touch "$out/$dir/${{base}}_pb2.py" ;;
  ruby) touch "$out/$dir/${{base}}_pb.rb" ;;
  go) touch "$out/$dir/$base.pb.go" ;;
  *) touch "$out/$dir/$base.$lang" ;;
esac
"#,
        log = log.display(),
    )
}
