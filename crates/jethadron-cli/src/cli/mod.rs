mod commands;
mod helpers;

use clap::Parser;
use jethadron_core::domain::AnalysisError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let analysis_error = error.as_analysis_error();
            eprintln!("{}", analysis_error.diagnostic_line());
            eprintln!("{}", analysis_error.fatal_exit_line());
            analysis_error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "jethadron",
    version,
    about = "Charged jet-hadron correlation analysis with event mixing"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Run the analysis over a JSON Lines event stream
    Run(commands::RunArgs),
    /// Print the default configuration as JSON
    DefaultConfig,
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run(args) => commands::run_analysis_command(args),
        CliCommand::DefaultConfig => commands::run_default_config_command(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(AnalysisError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_analysis_error(&self) -> AnalysisError {
        match self {
            Self::Usage(message) => {
                AnalysisError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => AnalysisError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
