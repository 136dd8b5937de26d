//! CLI entry point: build the index and print it to stdout as JSON.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use content_index::{emitter, IndexBuilder, IndexConfig, MergePolicy};

#[derive(Parser)]
#[command(
    name = "content-index",
    version,
    about = "Builds a JSON lookup index over front-matter documents"
)]
struct Cli {
    /// Root content directory to scan.
    #[arg(short, long, default_value = content_index::config::DEFAULT_ROOT)]
    root: PathBuf,

    /// File extension to match (without the leading dot).
    #[arg(short, long, default_value = content_index::config::DEFAULT_EXTENSION)]
    extension: String,

    /// How duplicate identifiers are resolved.
    #[arg(long, value_enum, default_value_t = MergePolicy::LastWins)]
    on_collision: MergePolicy,

    /// Maximum number of files read concurrently (unbounded when omitted).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Per-file read timeout in milliseconds (no timeout when omitted).
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Pretty-print the emitted JSON.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = IndexConfig::new(cli.root)
        .with_extension(cli.extension)
        .with_policy(cli.on_collision);
    if let Some(jobs) = cli.jobs {
        config = config.with_max_in_flight(jobs);
    }
    if let Some(ms) = cli.read_timeout_ms {
        config = config.with_read_timeout(Duration::from_millis(ms));
    }

    let output = match IndexBuilder::new(config).build().await {
        Ok(output) => output,
        Err(err) => {
            eprintln!("Error building index: {err}");
            process::exit(1);
        }
    };

    tracing::debug!(
        "indexed {} of {} candidate(s), {} soft failure(s), {} collision(s)",
        output.report.indexed,
        output.report.scanned,
        output.report.soft_failures,
        output.report.collisions.len()
    );

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = emitter::emit(&output.index, cli.pretty, &mut stdout) {
        eprintln!("Error writing index: {err}");
        process::exit(1);
    }
}
