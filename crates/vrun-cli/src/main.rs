use anyhow::Result;
use clap::Parser;

mod cli;
mod config_cmds;
mod error_hints;
mod pipeline;
mod run_cmd;

use cli::{Cli, Commands, ConfigCommands};
use vrun_config::FAILURE_EXIT_CODE;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let output_format = cli.format.clone();

    let result = match cli.command {
        Commands::Run(args) => run_cmd::handle_run(args).await,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show { source, overrides } => {
                config_cmds::handle_config_show(source, overrides, output_format).map(|()| 0)
            }
            ConfigCommands::Validate { source, overrides } => {
                config_cmds::handle_config_validate(source, overrides, output_format)
            }
        },
    };

    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(hint) = error_hints::suggest_fix(&err) {
                eprintln!("{hint}");
            }
            std::process::exit(FAILURE_EXIT_CODE);
        }
    }
}
