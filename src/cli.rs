//! CLI domain: parse, route, help, output, and presentation only.
//! No generation logic; the route table dispatches to the engine.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{
    format_candidates_json, format_candidates_text, format_resolution_json,
    format_resolution_text, format_samples,
};
pub use route::{Resolution, RunContext};
