use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::info;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("timed out fetching {url}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not reach {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    fn from_request(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            FetchError::Timeout { url, source }
        } else {
            FetchError::Transport { url, source }
        }
    }
}

pub fn build_client(settings: &Settings) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(settings.timeout())
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(FetchError::Client)
}

/// GET a published document and return its body text.
pub fn fetch_document(client: &Client, url: &str) -> Result<String, FetchError> {
    info!("Fetching document: {}", url);
    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::from_request(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response
        .text()
        .map_err(|e| FetchError::from_request(url, e))?;
    info!(bytes = body.len(), "Fetched document");
    Ok(body)
}

/// Read a saved copy of a document from disk.
pub fn read_document(path: &Path) -> Result<String, FetchError> {
    info!("Reading document: {}", path.display());
    std::fs::read_to_string(path).map_err(|source| FetchError::Read {
        path: path.to_path_buf(),
        source,
    })
}
