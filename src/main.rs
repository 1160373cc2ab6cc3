use anyhow::{Context, Result};
use athscrape::{
    config::{Config, SingleEntryPolicy},
    fetch::HttpFetcher,
    logging,
    pipeline::{self, RunOptions},
    store::{self, Store},
};
use clap::{Args, Parser, Subcommand};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::time::Instant;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about = "Scrape Olympedia athlete biographies and results")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape a range of athlete ids into bios.csv / results.csv.
    Scrape(ScrapeArgs),
    /// Keep the rows of a written CSV whose columns match the given values.
    Filter(FilterArgs),
}

#[derive(Args)]
struct ScrapeArgs {
    /// YAML config file; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    start: Option<u32>,
    /// Inclusive.
    #[arg(long)]
    end: Option<u32>,
    #[arg(long)]
    concurrency: Option<usize>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    #[arg(long)]
    parquet: bool,
    #[arg(long)]
    single_entry: Option<SingleEntryPolicy>,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(short, long)]
    input: PathBuf,
    /// `COL=V1,V2`; repeatable, all must match.
    #[arg(short, long = "where", value_name = "COL=V1,V2")]
    filters: Vec<String>,
    /// Defaults to `<input stem>_filtered.csv`.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ScrapeArgs {
    fn into_config(self) -> Result<Config> {
        let mut cfg = Config::load(self.config.as_deref())?;
        if let Some(v) = self.start {
            cfg.start_id = v;
        }
        if let Some(v) = self.end {
            cfg.end_id = v;
        }
        if let Some(v) = self.concurrency {
            cfg.concurrency = v;
        }
        if let Some(v) = self.out_dir {
            cfg.out_dir = v;
        }
        if self.parquet {
            cfg.parquet = true;
        }
        if let Some(v) = self.single_entry {
            cfg.single_entry = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scrape(args) => scrape(args).await,
        Command::Filter(args) => {
            logging::init("info", None)?;
            filter(args)
        }
    }
}

async fn scrape(args: ScrapeArgs) -> Result<()> {
    let cfg = args.into_config()?;
    logging::init(&cfg.log_level, cfg.log_file.as_deref())?;
    info!(ids = cfg.id_count(), base_url = %cfg.base_url, "startup");

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; finishing in-flight ids");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let start = Instant::now();
    let fetcher = Arc::new(HttpFetcher::new(&cfg)?);
    let out = pipeline::run(fetcher, &RunOptions::from(&cfg), cancel).await?;

    let store = Store::from_config(&cfg);
    let report = store.flush_all(&out.accumulator, &out.errors).map_err(|e| {
        error!(error = %e, "writing output failed");
        e
    })?;

    info!(
        processed = out.processed,
        bios = report.bio_rows,
        results = report.result_rows,
        errors = report.error_ids,
        cancelled = out.cancelled,
        elapsed = ?start.elapsed(),
        "all done"
    );
    Ok(())
}

fn filter(args: FilterArgs) -> Result<()> {
    let filters = store::parse_filters(args.filters.as_slice())?;

    let table = store::load_table(&args.input)?;
    let kept = store::apply_filters(&table, &filters);

    let output = match args.output {
        Some(p) => p,
        None => {
            let stem = args
                .input
                .file_stem()
                .with_context(|| format!("{:?} has no file name", args.input))?
                .to_string_lossy();
            args.input.with_file_name(format!("{}_filtered.csv", stem))
        }
    };
    store::save_table(&kept, &output)?;
    info!(
        input = %args.input.display(),
        output = %output.display(),
        rows = kept.len(),
        of = table.len(),
        "filtered"
    );
    Ok(())
}
