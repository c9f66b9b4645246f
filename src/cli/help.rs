//! CLI help: command naming for logs.

use crate::cli::parse::Commands;

/// Stable name of a command, used as a log field.
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Sample { .. } => "sample",
        Commands::Resolve { .. } => "resolve",
        Commands::Candidates { .. } => "candidates",
    }
}
