/// Backend Client: the single point of entry for calls to the PromptLens
/// generation backend.
///
/// The backend owns inference, authoritative segmentation and authoritative
/// explanations. Every request from this service goes through here so that
/// retries, timeouts and error mapping stay in one place.
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod wire;

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Backend unavailable after {retries} attempts")]
    RetriesExhausted { retries: u32 },

    #[error("No generation backend is configured")]
    NotConfigured,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Option<String>,
}

impl BackendClient {
    /// `base_url = None` builds a client whose every call fails with
    /// `NotConfigured`.
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// POSTs `body` as JSON to `path` and deserializes the JSON reply.
    /// Retries on 429 and 5xx with exponential backoff.
    pub async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, BackendError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.send_with_retry(path, |client, url| client.post(url).json(body))
            .await
    }

    /// GETs `path` and deserializes the JSON reply. Same retry policy as
    /// `post_json`.
    pub async fn get_json<Resp>(&self, path: &str) -> Result<Resp, BackendError>
    where
        Resp: DeserializeOwned,
    {
        self.send_with_retry(path, |client, url| client.get(url)).await
    }

    async fn send_with_retry<Resp, F>(&self, path: &str, build: F) -> Result<Resp, BackendError>
    where
        Resp: DeserializeOwned,
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let base_url = self.base_url.as_deref().ok_or(BackendError::NotConfigured)?;
        let url = format!("{base_url}{path}");

        let mut last_error: Option<BackendError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s
                let delay = Duration::from_millis(BACKOFF_BASE_MS * (1 << (attempt - 1)));
                warn!(
                    "Backend call to {} failed (attempt {}), retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build(&self.client, &url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(BackendError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Backend returned {} for {}: {}", status, path, body);
                last_error = Some(BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BackendError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
            }

            let text = response.text().await?;
            debug!("Backend call to {} succeeded ({} bytes)", path, text.len());
            return serde_json::from_str(&text).map_err(BackendError::Parse);
        }

        Err(last_error.unwrap_or(BackendError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }
}

/// Pulls `message` out of a backend error body, falling back to the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<BackendErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}
