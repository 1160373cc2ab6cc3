// src/pipeline/mod.rs
//
// Drives a scrape over a range of athlete ids. With a concurrency of 1 every
// id is fetched and processed in order on the calling task. Above that, ids
// are dispatched to worker tasks bounded by a semaphore; workers send their
// outcome over a channel to a single consumer task that owns the collections.

use anyhow::Result;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::{mpsc, Semaphore},
    time::{sleep, Instant},
};
use tracing::{info, instrument, warn};

use crate::accumulate::{Accumulator, ErrorTracker};
use crate::config::{Config, SingleEntryPolicy};
use crate::error::AthleteError;
use crate::fetch::Fetcher;
use crate::process::{process_page, AthletePage};
use crate::AthleteId;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub start_id: AthleteId,
    /// Inclusive.
    pub end_id: AthleteId,
    pub concurrency: usize,
    pub progress_every: usize,
    pub request_delay: Duration,
    pub single_entry: SingleEntryPolicy,
}

impl From<&Config> for RunOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            start_id: cfg.start_id,
            end_id: cfg.end_id,
            concurrency: cfg.concurrency.max(1),
            progress_every: cfg.progress_every,
            request_delay: cfg.request_delay(),
            single_entry: cfg.single_entry,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunOutput {
    pub accumulator: Accumulator,
    pub errors: ErrorTracker,
    /// Ids that were attempted, successfully or not.
    pub processed: usize,
    /// Set when the run stopped early on the cancel flag.
    pub cancelled: bool,
}

type Outcome = (AthleteId, Result<AthletePage, AthleteError>);

/// Fetch one athlete and extract both tables from the page.
pub async fn scrape_one<F: Fetcher>(
    fetcher: &F,
    athlete_id: AthleteId,
    policy: SingleEntryPolicy,
) -> Result<AthletePage, AthleteError> {
    let page = fetcher.fetch(athlete_id).await?;
    Ok(process_page(&page, athlete_id, policy)?)
}

/// Collections owned by whoever consumes outcomes.
#[derive(Debug)]
struct Collector {
    out: RunOutput,
    progress_every: usize,
    started: Instant,
}

impl Collector {
    fn new(progress_every: usize) -> Self {
        Self {
            out: RunOutput::default(),
            progress_every,
            started: Instant::now(),
        }
    }

    fn absorb(&mut self, (athlete_id, outcome): Outcome) {
        match outcome {
            Ok(page) => self.out.accumulator.add_page(page),
            Err(e) => self.out.errors.record(athlete_id, &e),
        }
        self.out.processed += 1;
        if self.progress_every > 0 && self.out.processed % self.progress_every == 0 {
            info!(
                processed = self.out.processed,
                last_id = athlete_id,
                errors = self.out.errors.len(),
                elapsed = ?self.started.elapsed(),
                "progress"
            );
        }
    }
}

/// Scrape `start_id..=end_id`. Failures are recorded per id and never stop the
/// run; only the cancel flag does, and what was collected until then is kept.
#[instrument(skip(fetcher, cancel))]
pub async fn run<F: Fetcher + 'static>(
    fetcher: Arc<F>,
    opts: &RunOptions,
    cancel: Arc<AtomicBool>,
) -> Result<RunOutput> {
    info!(
        start = opts.start_id,
        end = opts.end_id,
        concurrency = opts.concurrency,
        "starting scrape"
    );
    let out = if opts.concurrency <= 1 {
        run_sequential(fetcher.as_ref(), opts, &cancel).await
    } else {
        run_concurrent(fetcher, opts, &cancel).await?
    };
    if out.cancelled {
        warn!(processed = out.processed, "scrape cancelled; keeping partial output");
    }
    info!(
        processed = out.processed,
        bios = out.accumulator.bios().len(),
        results = out.accumulator.results().len(),
        errors = out.errors.len(),
        "scrape finished"
    );
    Ok(out)
}

async fn run_sequential<F: Fetcher>(
    fetcher: &F,
    opts: &RunOptions,
    cancel: &AtomicBool,
) -> RunOutput {
    let mut collector = Collector::new(opts.progress_every);
    for athlete_id in opts.start_id..=opts.end_id {
        if cancel.load(Ordering::SeqCst) {
            collector.out.cancelled = true;
            break;
        }
        let outcome = scrape_one(fetcher, athlete_id, opts.single_entry).await;
        collector.absorb((athlete_id, outcome));
        if !opts.request_delay.is_zero() && athlete_id < opts.end_id {
            sleep(opts.request_delay).await;
        }
    }
    collector.out
}

async fn run_concurrent<F: Fetcher + 'static>(
    fetcher: Arc<F>,
    opts: &RunOptions,
    cancel: &AtomicBool,
) -> Result<RunOutput> {
    let (tx, mut rx) = mpsc::channel::<Outcome>(opts.concurrency * 2);
    let sem = Arc::new(Semaphore::new(opts.concurrency));

    let progress_every = opts.progress_every;
    let consumer = tokio::spawn(async move {
        let mut collector = Collector::new(progress_every);
        while let Some(outcome) = rx.recv().await {
            collector.absorb(outcome);
        }
        collector.out
    });

    let mut cancelled = false;
    for athlete_id in opts.start_id..=opts.end_id {
        if cancel.load(Ordering::SeqCst) {
            cancelled = true;
            break;
        }
        let permit = sem.clone().acquire_owned().await?;
        let fetcher = fetcher.clone();
        let tx = tx.clone();
        let policy = opts.single_entry;
        tokio::spawn(async move {
            let _permit = permit;
            let outcome = scrape_one(fetcher.as_ref(), athlete_id, policy).await;
            if tx.send((athlete_id, outcome)).await.is_err() {
                warn!(athlete_id, "consumer gone; dropping outcome");
            }
        });
        if !opts.request_delay.is_zero() {
            sleep(opts.request_delay).await;
        }
    }
    // in-flight workers hold their own senders; the consumer ends after the last one
    drop(tx);

    let mut out = consumer.await?;
    out.cancelled = cancelled;
    out.accumulator.sort_by_athlete();
    out.errors.sort_by_athlete();
    Ok(out)
}
