//! Run one CloudFront origin-request event through the rewriter.
//!
//! Reads the event JSON from `--event` (or stdin), resolves it against an
//! in-memory index seeded from `--records`, and prints the resulting request
//! or denial as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! exodus-origin-request --config edge.toml --records records.json --event event.json
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use exodus_edge::build_handler;
use exodus_edge::config::EdgeConfig;
use exodus_edge::config::load_config;
use exodus_edge::records::load_index;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "exodus-origin-request")]
struct Args {
    /// Path to TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of content records to serve from.
    #[arg(long)]
    records: PathBuf,

    /// Event file; reads stdin when omitted or `-`.
    #[arg(long)]
    event: Option<PathBuf>,

    /// Override the index table name.
    #[arg(long)]
    table: Option<String>,

    /// Override the original-uri header name.
    #[arg(long)]
    original_uri_header: Option<String>,

    /// Print compact instead of pretty JSON.
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn overrides(&self) -> EdgeConfig {
        let mut config = EdgeConfig::default();
        if let Some(table) = &self.table {
            config.table.name = table.clone();
        }
        if let Some(header) = &self.original_uri_header {
            config.original_uri_header = header.clone();
        }
        config
    }
}

fn init_tracing(default_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or("info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn read_event(path: Option<&PathBuf>) -> Result<serde_json::Value> {
    let raw = match path {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read event {}", path.display()))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("failed to read event from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.overrides()).context("failed to load configuration")?;
    init_tracing(config.log_filter.as_deref());

    info!(
        table = %config.table.name,
        region = %config.table.region,
        origin_aliases = config.aliases.origin.len(),
        rhui_aliases = config.aliases.rhui.len(),
        "starting origin request rewriter"
    );

    let index = load_index(&config.table.name, &args.records).await?;
    let handler = build_handler(&config, index);

    let event = read_event(args.event.as_ref())?;
    let response = handler.handle_event(event).await.context("origin request failed")?;

    let output = if args.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{output}");
    Ok(())
}
