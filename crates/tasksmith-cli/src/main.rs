//! Tasksmith CLI
//!
//! Main entry point for the `tasksmith` binary.

use std::process::ExitCode;

use clap::Parser;
use tasksmith_cli::cli::{Cli, OutputFormat};
use tasksmith_cli::error::{CliError, ErrorFormatter};
use tasksmith_common_log::{LogConfig, LogError, LogLevel};
use tracing::debug;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    ConfigError = 2,
    IoError = 3,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("error: failed to initialize logging: {e}");
        return match e {
            LogError::FileError(_) => Exit::IoError.into(),
            LogError::InitError(_) => Exit::ConfigError.into(),
        };
    }

    let format = cli.format;
    let verbose = cli.verbose > 0;

    match run(cli) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            debug!(code = e.code(), "command failed");
            let formatter = ErrorFormatter::new().verbose(verbose);
            match format {
                OutputFormat::Json => eprintln!("{}", formatter.format_json(&e)),
                OutputFormat::Text => formatter.print(&e),
            }
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config)
}

fn init_logging(cli: &Cli) -> Result<(), LogError> {
    let mut config = LogConfig::from_env();
    // Explicit flags win over the environment.
    if cli.verbose > 0 || cli.quiet {
        config = config.with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    }
    tasksmith_common_log::init(config)
}
