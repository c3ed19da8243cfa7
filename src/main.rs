//! pluck - capture product-page selectors and extract product data

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pluck::cli::{Cli, Commands};
use pluck::config::Config;
use pluck::error::Result;

mod commands;
mod utils;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Crawl { html, url, selectors, export, json } => {
            commands::cmd_crawl(&config, &html, url, &selectors, export, json)
        }
        Commands::Capture { html, url, field, target, write } => {
            commands::cmd_capture(&config, &html, url, field, &target, write)
        }
        Commands::Specs { text, json } => commands::cmd_specs(text, json),
        Commands::ExportConfig { selectors, url, out } => {
            commands::cmd_export_config(&config, &selectors, url, out)
        }
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}

/// Logs go to stderr so `--json` output stays clean
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 => config.level().unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging already initialised");
    }
}
