// src/error.rs

use thiserror::Error;

use crate::process::TableKind;

/// Failure to retrieve an athlete page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("GET {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { .. } => None,
        }
    }

    /// Rate limiting, server-side errors and transport failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Transport { .. } => true,
        }
    }
}

/// The page was fetched but its tables could not be turned into records.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{0} table not found on page")]
    TableNotFound(TableKind),
    #[error("{table} table is malformed: {reason}")]
    Malformed { table: TableKind, reason: String },
}

impl ExtractionError {
    pub fn malformed(table: TableKind, reason: impl Into<String>) -> Self {
        Self::Malformed {
            table,
            reason: reason.into(),
        }
    }
}

/// Anything that makes a single athlete id end up in the error list.
#[derive(Debug, Error)]
pub enum AthleteError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl AthleteError {
    pub fn kind(&self) -> &'static str {
        match self {
            AthleteError::Fetch(_) => "fetch",
            AthleteError::Extraction(_) => "extraction",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AthleteError::Fetch(e) => e.status(),
            AthleteError::Extraction(_) => None,
        }
    }
}
