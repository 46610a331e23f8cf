//! Jobsniffer: crawl job listing sites from the command line.
//!
//! Records are written as JSON lines; logs and the final summary go to stderr.

mod sink;

use anyhow::{anyhow, Result};
use clap::Parser;
use jobsniffer::{
    config::{CrawlRequest, CrawlerConfig},
    core::SourceId,
    crawler::Crawler,
    events::LoggingEventSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::sink::JsonLinesSink;

#[derive(Parser)]
#[command(name = "jobsniffer")]
#[command(about = "Crawl job listing sites for a job title and location")]
#[command(version)]
struct Cli {
    /// Job title to search for
    job_title: String,

    /// Location to search in
    location: String,

    /// Listing pages to crawl per source
    #[arg(short, long, default_value = "3")]
    max_pages: u32,

    /// Source to crawl (repeatable): hellowork, wttj
    #[arg(short, long = "source", value_parser = parse_source)]
    sources: Vec<SourceId>,

    /// Engine configuration file (JSON)
    #[arg(short, long, env = "JOBSNIFFER_CONFIG")]
    config: Option<PathBuf>,

    /// Write records to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render service endpoint for script-rendered sources
    #[arg(long, env = "JOBSNIFFER_RENDER_ENDPOINT")]
    render_endpoint: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_source(value: &str) -> Result<SourceId, String> {
    value.parse().map_err(|e: jobsniffer::errors::ConfigurationError| e.message)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if cli.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut config = match &cli.config {
        Some(path) => CrawlerConfig::from_file(path)?,
        None => CrawlerConfig::default(),
    };
    if let Some(endpoint) = &cli.render_endpoint {
        config.fetch.render_endpoint = Some(endpoint.clone());
    }

    let events = if cli.verbose > 0 {
        LoggingEventSink::debug()
    } else {
        LoggingEventSink::info()
    };
    let crawler = Crawler::builder()
        .with_config(config)
        .with_event_sink(Arc::new(events))
        .build()?;

    let sources = if cli.sources.is_empty() {
        vec![SourceId::HelloWork]
    } else {
        cli.sources.clone()
    };
    let request = CrawlRequest::new(cli.job_title.clone(), cli.location.clone())
        .with_max_pages(cli.max_pages)
        .with_sources(sources);

    let sink = match &cli.output {
        Some(path) => JsonLinesSink::create(path).await?,
        None => JsonLinesSink::stdout(),
    };

    let run = crawler.start(request)?;
    let token = run.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling crawl");
            token.cancel("interrupted");
        }
    });

    let summary = run.drain_into(&sink).await?;
    eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
