// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::AthleteId;

/// Source of athlete pages. Implemented over HTTP for real runs and over an
/// in-memory map in tests.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, athlete_id: AthleteId) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// `<base>/<id>`, tolerating a trailing slash on the base.
pub fn athlete_url(base: &str, athlete_id: AthleteId) -> String {
    format!("{}/{}", base.trim_end_matches('/'), athlete_id)
}

/// Run `attempt` until it succeeds, fails permanently, or `max_retries` extra
/// attempts are spent. The delay doubles after every transient failure.
pub async fn with_retry<F, Fut>(
    url: &str,
    max_retries: u32,
    initial_backoff_ms: u64,
    mut attempt: F,
) -> Result<String, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, FetchError>>,
{
    let mut attempts = 0;
    loop {
        match attempt().await {
            Ok(t) => return Ok(t),
            Err(e) if e.is_transient() && attempts < max_retries => {
                attempts += 1;
                let backoff = initial_backoff_ms * 2u64.pow(attempts - 1);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => {
                if attempts > 0 {
                    error!(%url, error = %e, "Exhausted retries");
                }
                return Err(e);
            }
        }
    }
}

/// Fetches athlete pages with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    max_retries: u32,
    initial_backoff_ms: u64,
}

impl HttpFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.as_str())
            .cookie_store(true)
            .gzip(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            max_retries: cfg.max_retries,
            initial_backoff_ms: cfg.retry_backoff_ms,
        })
    }

    async fn get_text_core(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching text from {}", url);
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(transport)
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, athlete_id: AthleteId) -> Result<String, FetchError> {
        let url = athlete_url(&self.base_url, athlete_id);
        with_retry(&url, self.max_retries, self.initial_backoff_ms, || {
            self.get_text_core(&url)
        })
        .await
    }
}
