use anyhow::Context;
use clap::Parser;

mod bootstrap;
mod cli;
mod output;
mod pipeline;

fn main() {
    if let Err(error) = run() {
        eprintln!("cmut error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = bootstrap::load_config(&cli)?;
    let mutation = pipeline::mutate_file(&cli.input, &config)?;

    if cli.dump_scopes {
        let dump = serde_json::to_string_pretty(&mutation.tree.view())
            .context("failed to serialize scope tree")?;
        eprintln!("{dump}");
    }

    output::emit(mutation.outcome.bytes(), cli.output_path())?;

    if mutation.report.dropped > 0 {
        tracing::warn!(dropped = mutation.report.dropped, "some edits were not applied");
    }
    tracing::info!(
        retained = mutation.stats.retained,
        planned = mutation.planned,
        applied = mutation.report.applied,
        "done"
    );
    if !cli.quiet {
        eprintln!("{}", mutation.outcome.status());
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("CMUT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
