/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

use async_trait::async_trait;
use tracing::debug;

use crate::error::{error_chain, PackagerError, PackagerResult};

/// Retrieves the proto repository archive.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> PackagerResult<Vec<u8>>;
}

/// Fetches archives over HTTP(S).
pub struct HttpArchiveFetcher {
    client: reqwest::Client,
}

impl HttpArchiveFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpArchiveFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch(&self, url: &str) -> PackagerResult<Vec<u8>> {
        let fetch_error = |e: reqwest::Error| PackagerError::Fetch {
            url: url.to_string(),
            message: error_chain(&e),
        };

        debug!(url, "Downloading proto archive");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(fetch_error)?
            .error_for_status()
            .map_err(fetch_error)?;
        let bytes = response.bytes().await.map_err(fetch_error)?;
        debug!(url, size = bytes.len(), "Downloaded proto archive");
        Ok(bytes.to_vec())
    }
}
