//! Image acquisition for the report pipeline.
//!
//! Required images (cover and back cover) and the optional chart go through two separate paths:
//! a failure on a required image aborts the report, while a broken chart is dropped.

use std::future::Future;

use log::{debug, warn};
use reqwest::Client;

use crate::config::AssemblerConfig;
use crate::encoding;
use crate::error::{FetchError, ReportError};
use crate::model::ImageSource;

/// Downloads remote images.
pub trait ImageFetcher {
    /// Returns the body of `url`, failing on transport errors and non-success statuses.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

impl<T: ImageFetcher + Sync> ImageFetcher for &T {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        (**self).fetch(url)
    }
}

/// [`ImageFetcher`] backed by a `reqwest` client.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client honouring the configured timeout and user agent.
    pub fn from_config(config: &AssemblerConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.fetch_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |err: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source: Box::new(err),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("Fetched {} bytes from {url}", body.len());
        // The response buffer is reference counted; keep an owned copy for decoding.
        Ok(body.to_vec())
    }
}

/// Resolves a required image to raw bytes.
pub async fn acquire_required<F: ImageFetcher>(
    fetcher: &F,
    source: &ImageSource,
    role: &'static str,
) -> Result<Vec<u8>, ReportError> {
    debug!("Acquiring {role} image from {}", source.describe());
    match source {
        ImageSource::Url(url) => fetcher
            .fetch(url)
            .await
            .map_err(|source| ReportError::Fetch { role, source }),
        ImageSource::DataUri(uri) => {
            encoding::decode_data_uri(uri).map_err(|source| ReportError::Decode { role, source })
        }
        ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        ImageSource::Path(path) => {
            read_path(path).map_err(|source| ReportError::Fetch { role, source })
        }
    }
}

/// Resolves the optional chart image.  Every failure degrades to an empty buffer.
pub async fn acquire_optional<F: ImageFetcher>(fetcher: &F, source: &ImageSource) -> Vec<u8> {
    match source {
        ImageSource::DataUri(uri) => encoding::data_uri_bytes_or_empty(uri),
        ImageSource::Url(url) => fetcher.fetch(url).await.unwrap_or_else(|err| {
            warn!("Skipping chart image: {err}");
            Vec::new()
        }),
        ImageSource::Bytes(bytes) => bytes.clone(),
        ImageSource::Path(path) => read_path(path).unwrap_or_else(|err| {
            warn!("Skipping chart image: {err}");
            Vec::new()
        }),
    }
}

fn read_path(path: &str) -> Result<Vec<u8>, FetchError> {
    std::fs::read(path).map_err(|source| FetchError::Io {
        path: path.to_string(),
        source,
    })
}
