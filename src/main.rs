use clap::Parser;
use failure::ResultExt;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use tanglestats::{DepthProfile, Stats, Tangle};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Shape and growth statistics for a two-parent transaction DAG.
#[derive(Parser, Debug)]
#[command(name = "tanglestats", version)]
struct Opts {
    /// Ledger file: transaction count, then one `left right timestamp` line each
    file: PathBuf,
    /// Print the graph before the statistics
    #[arg(long)]
    graph: bool,
    /// Print statistics as JSON
    #[arg(long)]
    json: bool,
    /// Also report exact shortest and longest depths
    #[arg(long)]
    exact_depth: bool,
    /// Increase log verbosity, RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Report<'a> {
    stats: &'a Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth_profile: Option<&'a DepthProfile>,
}

fn main() {
    let opts = Opts::parse();
    init_logging(opts.verbose);

    if let Err(err) = run(&opts) {
        eprint!("{}", error_report(&err));
        process::exit(1);
    }
}

fn error_report(err: &failure::Error) -> String {
    let mut report = format!("error: {}\n", err);
    for cause in err.iter_chain().skip(1) {
        report.push_str(&format!("caused by: {}\n", cause));
    }
    report
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(opts: &Opts) -> Result<(), failure::Error> {
    let f = File::open(&opts.file)
        .with_context(|_| format!("failed to open {}", opts.file.display()))?;
    let tangle = Tangle::parse(BufReader::new(f))
        .with_context(|_| format!("failed to load {}", opts.file.display()))?;
    info!(
        transactions = tangle.vertex_count(),
        file = %opts.file.display(),
        "loaded ledger"
    );

    // compute everything before printing so a failure emits no statistics
    let stats = tangle.compute_stats()?;
    let depth_profile = if opts.exact_depth {
        Some(tangle.depth_profile()?)
    } else {
        None
    };

    if opts.graph {
        println!("{}", tangle);
    }
    if opts.json {
        let report = Report {
            stats: &stats,
            depth_profile: depth_profile.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", stats);
        if let Some(profile) = depth_profile {
            println!("{}", profile);
        }
    }
    Ok(())
}
