// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::AthleteId;

pub const DEFAULT_BASE_URL: &str = "https://www.olympedia.org/athletes";

/// What to do with a results row that opens a new Games context and also carries
/// a position or medal of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SingleEntryPolicy {
    /// Emit the row as a result under the context it sets.
    #[default]
    Retain,
    /// Treat it as context only, like every other row that has a Games value.
    Drop,
}

impl std::str::FromStr for SingleEntryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" => Ok(Self::Retain),
            "drop" => Ok(Self::Drop),
            other => Err(format!("unknown single-entry policy `{}`", other)),
        }
    }
}

/// Run configuration. Every field has a default, so an empty YAML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub user_agent: String,
    pub start_id: AthleteId,
    /// Inclusive.
    pub end_id: AthleteId,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Pause between dispatching two ids.
    pub request_delay_ms: u64,
    pub concurrency: usize,
    pub progress_every: usize,
    pub out_dir: PathBuf,
    pub errors_file: PathBuf,
    pub parquet: bool,
    pub single_entry: SingleEntryPolicy,
    pub log_level: String,
    /// ERROR-level events are also appended here when set.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("athscrape/", env!("CARGO_PKG_VERSION")).to_string(),
            start_id: 1,
            end_id: 199_999,
            timeout_secs: 60,
            max_retries: 0,
            retry_backoff_ms: 2_000,
            request_delay_ms: 0,
            concurrency: 1,
            progress_every: 250,
            out_dir: PathBuf::from("data").join("raw"),
            errors_file: PathBuf::from("errors_list.txt"),
            parquet: false,
            single_entry: SingleEntryPolicy::Retain,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load from a YAML file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(p) => {
                let text =
                    fs::read_to_string(p).with_context(|| format!("reading config {:?}", p))?;
                serde_yaml::from_str::<Config>(&text)
                    .with_context(|| format!("parsing config {:?}", p))?
            }
            None => Config::default(),
        };
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_id == 0 {
            bail!("athlete ids start at 1");
        }
        if self.start_id > self.end_id {
            bail!(
                "empty id range: start {} is after end {}",
                self.start_id,
                self.end_id
            );
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        url::Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url `{}`", self.base_url))?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn id_count(&self) -> usize {
        (self.end_id - self.start_id) as usize + 1
    }
}
