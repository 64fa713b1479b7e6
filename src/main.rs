mod agents;
mod cli;
mod debian;
mod error;
mod repository;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var(utils::VERBOSE_ENV, "1");
        }
    }

    let result = match cli.command {
        Commands::Diff {
            old,
            new,
            docs,
            output,
            resolver,
        } => workflow::execute_diff(&old, &new, &docs, &output, resolver.into_settings()),
        Commands::Snap {
            old_root,
            new_root,
            name,
            repo,
            resolver,
        } => workflow::execute_snap(&old_root, &new_root, &name, &repo, resolver.into_settings()),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
