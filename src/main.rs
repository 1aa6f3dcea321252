//! biobeat - main entry point

use clap::Parser;

use biobeat::cli::{cmd_blend, cmd_preprocess, cmd_report, cmd_run, cmd_tune, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biobeat=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            models,
            weights,
        } => cmd_run(data, models, weights)?,
        Commands::Preprocess { data } => cmd_preprocess(data)?,
        Commands::Blend {
            submissions,
            output,
            weights,
        } => cmd_blend(submissions, output, weights)?,
        Commands::Report { comparison, output } => cmd_report(comparison, output)?,
        Commands::Tune {
            data,
            target,
            trials,
            seed,
        } => cmd_tune(data, target, trials, seed)?,
    }

    Ok(())
}
