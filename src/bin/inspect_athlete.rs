use anyhow::Result;
use athscrape::{
    config::{Config, SingleEntryPolicy},
    fetch::HttpFetcher,
    pipeline::scrape_one,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// Fetch one athlete page and print what would be written for it.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    athlete_id: u32,
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    single_entry: Option<SingleEntryPolicy>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = Config::load(args.config.as_deref())?;
    let policy = args.single_entry.unwrap_or(cfg.single_entry);

    let fetcher = HttpFetcher::new(&cfg)?;
    let page = scrape_one(&fetcher, args.athlete_id, policy).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
