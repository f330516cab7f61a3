//! reviewlens - extract product reviews from e-commerce pages

use clap::Parser;

use reviewlens::cli::{Cli, Commands};
use reviewlens::error::Result;

mod commands;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            url,
            profile,
            generic,
            max_pages,
            timeout,
            registry,
            no_halve,
            json,
            summarize,
        } => commands::cmd_scrape(
            &url, profile, generic, max_pages, timeout, registry, no_halve, json, summarize,
        ),
        Commands::Platforms { json } => commands::cmd_platforms(json),
        Commands::Doctor => commands::cmd_doctor(),
    }
}
