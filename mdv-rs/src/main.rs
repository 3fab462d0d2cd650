use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;

use mdv::cli::Cli;
use mdv::RunConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    match try_main(&cli) {
        Ok(config) => {
            println!("Formatted content saved to {}", config.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("mdv: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> anyhow::Result<RunConfig> {
    let config = RunConfig::from_cli(cli)?;
    mdv::run(&config).with_context(|| format!("failed to render {}", config.input.display()))?;
    Ok(config)
}
