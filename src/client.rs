//! Authenticated GitHub REST client
//!
//! Thin wrapper over `reqwest` that adds the GitHub headers to every request and
//! turns non-2xx answers into [`TransportError::Status`].

use crate::config::{API_VERSION, Config};
use crate::error::{Error, Result, TransportError};
use crate::types::{ArtifactDescriptor, ArtifactPage, RunDescriptor, RunTarget};
use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Artifacts requested per listing page (GitHub maximum)
const ARTIFACTS_PER_PAGE: usize = 100;

/// Connect timeout for streamed archive downloads
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// GitHub REST client bound to one API base URL and token
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    request_timeout: Duration,
}

impl GitHubClient {
    /// Build a client for the configured API with the given bearer token
    ///
    /// # Errors
    /// Returns an error if the token contains characters that are not valid in a
    /// header, or if the HTTP client cannot be created.
    pub fn new(config: &Config, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::MissingToken("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.api.user_agent.clone())
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(TransportError::Network)?;

        Ok(Self {
            http,
            api_url: config.api.url.trim_end_matches('/').to_string(),
            request_timeout: config.api.request_timeout,
        })
    }

    /// REST base URL this client talks to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn run_url(&self, target: &RunTarget) -> String {
        format!(
            "{}/repos/{}/actions/runs/{}",
            self.api_url, target.repo, target.run_id
        )
    }

    /// GET a JSON document and decode it
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(TransportError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response.text().await.map_err(TransportError::Network)?;
        serde_json::from_str(&body).map_err(|e| {
            TransportError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Fetch run details from `GET /repos/{repo}/actions/runs/{run_id}`
    pub async fn get_run(&self, target: &RunTarget) -> Result<RunDescriptor> {
        let url = self.run_url(target);
        info!(url = %url, "fetching workflow run details");
        self.get_json(&url).await
    }

    /// Fetch every artifact of a run, expired ones included, in API order
    ///
    /// Follows pagination until `total_count` artifacts have been collected or a
    /// short page arrives.
    pub async fn get_artifacts(&self, target: &RunTarget) -> Result<Vec<ArtifactDescriptor>> {
        let base = format!("{}/artifacts", self.run_url(target));
        info!(url = %base, "fetching artifacts list");

        let mut artifacts = Vec::new();
        let mut page = 1;
        loop {
            let url = format!("{}?per_page={}&page={}", base, ARTIFACTS_PER_PAGE, page);
            let batch: ArtifactPage = self.get_json(&url).await?;
            let received = batch.artifacts.len();
            artifacts.extend(batch.artifacts);

            if received < ARTIFACTS_PER_PAGE || artifacts.len() as u64 >= batch.total_count {
                break;
            }
            page += 1;
        }

        debug!(count = artifacts.len(), pages = page, "artifact listing complete");
        Ok(artifacts)
    }

    /// Stream `url` into `writer`, returning the number of bytes written
    ///
    /// Redirects to blob storage are followed; reqwest drops the `Authorization`
    /// header when the redirect leaves the API host.
    pub async fn download_to<W>(&self, url: &str, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        info!(url, "downloading archive");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(TransportError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let mut stream = response.bytes_stream();
        let mut bytes_downloaded = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(TransportError::Network)?;
            writer.write_all(&chunk).await?;
            bytes_downloaded += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(bytes_downloaded)
    }
}
