//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::BoolishValueParser;
use followup_core::config::{self, Config};
use tokio::runtime::Runtime;

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "followup")]
#[command(version)]
#[command(about = "Ask a human a follow-up question in a new terminal window")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    overrides: ConfigArgs,
}

/// Flags that override the environment configuration.
#[derive(clap::Args, Debug, Clone, Default)]
struct ConfigArgs {
    /// Minutes to wait for an answer; below 1 means no limit
    #[arg(long, global = true, value_name = "N", allow_negative_numbers = true)]
    timeout_minutes: Option<i64>,

    /// Close the prompt window when it finishes (true/false)
    #[arg(long, global = true, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    close_terminal: Option<bool>,

    /// Terminal emulator to try first on Linux/BSD
    #[arg(long, global = true, value_name = "BINARY")]
    terminal: Option<String>,
}

impl ConfigArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(minutes) = self.timeout_minutes {
            config.timeout = config::TimeoutPolicy::from_minutes(minutes);
        }
        if let Some(close) = self.close_terminal {
            config.close_terminal = close;
        }
        if let Some(terminal) = self.terminal.as_deref() {
            let terminal = terminal.trim();
            config.terminal = (!terminal.is_empty()).then(|| terminal.to_string());
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show the prompt in this terminal and write the answer file (used by
    /// the launched terminal)
    Prompt {
        /// Where to write the answer JSON
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// JSON file with the question and options
        #[arg(long, value_name = "PATH")]
        payload_file: PathBuf,
    },

    /// Ask a question in a new terminal window and print the response JSON
    Ask {
        /// The question to show
        question: String,

        /// An option to offer (repeatable; defaults apply when omitted)
        #[arg(short, long = "option", value_name = "TEXT")]
        options: Vec<String>,
    },

    /// Serve the follow-up tools as an MCP server over stdio
    Serve,
}

/// Parses arguments and runs the command. Returns the process exit code.
///
/// # Errors
/// Returns an error if the command fails.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    cli.overrides.apply(&mut config);

    match cli.command {
        // The prompt is a synchronous terminal UI; no async runtime needed.
        Commands::Prompt {
            output,
            payload_file,
        } => {
            let _guard = logging::init_prompt_file().ok();
            commands::prompt::run(&output, &payload_file)?;
            Ok(0)
        }
        Commands::Ask { question, options } => {
            logging::init_stderr();
            block_on(async move { commands::ask::run(question, options, &config).await })?
        }
        Commands::Serve => {
            logging::init_stderr();
            block_on(crate::server::serve(config))??;
            Ok(0)
        }
    }
}

/// Runs a future on one tokio runtime for the whole command.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = Runtime::new().context("create tokio runtime")?;
    Ok(rt.block_on(future))
}
