//! NavigAIte planner command-line front end.
//!
//! # Responsibility
//! - Expose planner operations as subcommands that print JSON.
//! - Bootstrap configuration, logging and one connection per invocation.

mod cli;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.run() {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
        std::process::exit(1);
    }
}
