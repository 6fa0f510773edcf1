use std::path::PathBuf;

use clap::Parser;
use tracing::instrument;

use unreach_core::config::AnalysisConfig;
use unreach_core::error::ConfigError;
use unreach_core::pipeline::{join_only, run_analysis};
use unreach_index::JsonIndexStore;
use unreach_syntax::parse_files_parallel;

mod discovery;
mod output;

/// Finds declarations with no path from a configured entry point.
#[derive(Parser, Debug)]
#[command(name = "unreach", version, about = "Finds declarations unreachable from any entry point")]
struct Cli {
    /// Directory root to analyze.
    project_path: PathBuf,

    /// Directory containing the compiler-produced index database.
    #[arg(long)]
    index_store_path: PathBuf,

    /// Comma-separated directory names to skip during file discovery.
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Detailed progress logs and a per-occurrence mapping log.
    #[arg(long)]
    verbose: bool,

    /// Emit the cross-view symbol dump and exit before graph building.
    #[arg(long)]
    dump_symbols: bool,

    /// Include joiner scoring and fallback detail in the symbol dump.
    #[arg(long)]
    debug_usr: bool,

    /// Restrict unused-property pruning to private/fileprivate properties.
    #[arg(long)]
    respect_public_api: bool,
}

#[instrument(skip_all)]
fn run(cli: &Cli) -> anyhow::Result<()> {
    if !cli.project_path.is_dir() {
        return Err(ConfigError::InvalidPath(cli.project_path.display().to_string()).into());
    }
    if !cli.index_store_path.is_dir() {
        return Err(ConfigError::InvalidIndexStorePath(cli.index_store_path.display().to_string()).into());
    }

    let mut config = AnalysisConfig::load_or_default(&cli.project_path)?;
    if !cli.exclude.is_empty() {
        config.discovery.exclude_dirs = cli.exclude.clone();
    }
    config.reachability.respect_public_api = cli.respect_public_api || config.reachability.respect_public_api;

    let files = discovery::discover_source_files(&cli.project_path, &config.discovery.exclude_dirs)?;
    let (decls, failures) = parse_files_parallel(&files, &config.entry_points);
    for failure in &failures {
        eprintln!("warning: {failure}");
    }

    let index = JsonIndexStore::open(&cli.index_store_path)
        .map_err(|err| unreach_core::error::IndexError::Unreadable(err.to_string()))?;

    if cli.dump_symbols {
        let (hydrated, traces) = join_only(decls, &index, &config)?;
        for hd in &hydrated {
            match &hd.usr {
                Some(usr) => println!("{} -> {usr}", hd.decl.name),
                None => println!("{} -> <unjoined>", hd.decl.name),
            }
        }
        if cli.debug_usr {
            for trace in &traces {
                println!(
                    "{}: {} exact candidate(s), {} fuzzy candidate(s), fuzzy used: {}, winner: {:?}",
                    trace.decl_name,
                    trace.exact_line_candidates.len(),
                    trace.fuzzy_candidates.len(),
                    trace.used_fuzzy,
                    trace.winner
                );
            }
        }
        return Ok(());
    }

    let report = run_analysis(decls, &index, &config)?;

    print!("{}", output::render_mapping_log(&report.mapping_log, cli.verbose));
    print!("{}", output::render_dead_code_report(&report.graph, &report.dead_symbols));

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match run(&cli) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
