use anyhow::Context;
use attendcore::dashboard::DatePreset;
use attendcore::dates::Locale;
use chrono::NaiveDate;
use clap::Parser;
use feed_server::server::FeedServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use terminal::view::OutputFormat;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::MonitorConfig;
use workflow::runner::{Runner, StartupFilter};

mod feed_server;
mod terminal;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Terminal attendance monitor")]
struct Args {
    /// Load monitor settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Feed URL; a `t` cache-busting parameter is appended on every request
    #[arg(long, conflicts_with = "feed_file")]
    feed_url: Option<String>,
    /// Read the feed from a local JSON file instead of HTTP
    #[arg(long)]
    feed_file: Option<PathBuf>,
    #[arg(long)]
    interval_secs: Option<u64>,
    /// Start in history mode for this date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Start in history mode for a named day: today or yesterday
    #[arg(long)]
    preset: Option<DatePreset>,
    /// Label language: en or id
    #[arg(long)]
    locale: Option<Locale>,
    /// Render a single refresh and exit
    #[arg(long, default_value_t = false)]
    once: bool,
    /// Print updates as JSON lines instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Serve this feed file over HTTP and poll it unless another feed is set
    #[arg(long)]
    serve: Option<PathBuf>,
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.config {
        MonitorConfig::load(path)?
    } else {
        MonitorConfig::default()
    };
    config.apply_overrides(
        args.feed_url.clone(),
        args.feed_file.clone(),
        args.interval_secs,
        args.locale,
    );

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let startup = StartupFilter {
        preset: args.preset,
        date: args.date,
    };

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    runtime.block_on(async move {
        let _server = match &args.serve {
            Some(feed_file) => {
                let server = FeedServer::new(feed_file.clone());
                let (addr, task) = server.spawn(args.bind)?;
                if config.feed_url.is_none() && config.feed_file.is_none() {
                    config.feed_url = Some(server.feed_url(addr));
                }
                Some(task)
            }
            None => None,
        };

        Runner::new(config, format).execute(startup, args.once).await
    })
}
