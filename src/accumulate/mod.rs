// src/accumulate/mod.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::AthleteError;
use crate::process::{AthletePage, BioRecord, ResultRow};
use crate::AthleteId;

/// Collected output of a run, kept in arrival order.
#[derive(Debug, Default)]
pub struct Accumulator {
    bios: Vec<BioRecord>,
    results: Vec<ResultRow>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bio(&mut self, bio: BioRecord) {
        self.bios.push(bio);
    }

    pub fn add_results(&mut self, rows: impl IntoIterator<Item = ResultRow>) {
        self.results.extend(rows);
    }

    /// Take both parts of a processed page.
    pub fn add_page(&mut self, page: AthletePage) {
        self.add_bio(page.bio);
        self.add_results(page.results);
    }

    pub fn bios(&self) -> &[BioRecord] {
        &self.bios
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.results
    }

    /// Stable, so rows of one athlete keep their table order.
    pub fn sort_by_athlete(&mut self) {
        self.bios.sort_by_key(|b| b.athlete_id);
        self.results.sort_by_key(|r| r.athlete_id);
    }

    pub fn is_empty(&self) -> bool {
        self.bios.is_empty() && self.results.is_empty()
    }
}

/// One failed athlete id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub athlete_id: AthleteId,
    /// `fetch` or `extraction`.
    pub kind: &'static str,
    pub status: Option<u16>,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ErrorTracker {
    records: Vec<ErrorRecord>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, athlete_id: AthleteId, err: &AthleteError) {
        warn!(athlete_id, kind = err.kind(), error = %err, "athlete failed");
        self.records.push(ErrorRecord {
            athlete_id,
            kind: err.kind(),
            status: err.status(),
            reason: err.to_string(),
            recorded_at: Utc::now(),
        });
    }

    pub fn all(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Failed ids in the order they were recorded.
    pub fn ids(&self) -> Vec<AthleteId> {
        self.records.iter().map(|r| r.athlete_id).collect()
    }

    pub fn sort_by_athlete(&mut self) {
        self.records.sort_by_key(|r| r.athlete_id);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
