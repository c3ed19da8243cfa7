//! Miscellaneous commands: specs, export-config, completions

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use pluck::cli::{Cli, CompletionShell};
use pluck::config::Config;
use pluck::error::Result;
use pluck::export::{write_json, ConfigExport, CONFIG_EXPORT_FILE};
use pluck::specs::parse_spec_block;

use crate::utils::read_selectors;

/// Parse a spec block from the argument or stdin
pub fn cmd_specs(text: Option<String>, json: bool) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let specs = parse_spec_block(&text);
    if json {
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    if specs.is_empty() {
        println!("{}", "No known spec labels found".yellow());
        return Ok(());
    }
    for (label, value) in &specs {
        println!("  {}: {}", label.bold(), value);
    }
    Ok(())
}

/// Write crawler-config.json
pub fn cmd_export_config(
    config: &Config,
    selectors_path: &Path,
    urls: Vec<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let selectors = read_selectors(selectors_path)?;
    let export = ConfigExport::new(urls, selectors);
    if export.urls.is_empty() {
        println!("{}", "No URLs given; exporting selectors only".yellow());
    }

    let dir = out.unwrap_or_else(|| config.export_dir());
    let path = write_json(&dir, CONFIG_EXPORT_FILE, &export)?;
    println!(
        "{} Exported {} URL(s) and {} selector(s) to {}",
        "✓".green(),
        export.urls.len(),
        export.selectors.captured_count(),
        path.display()
    );
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "pluck", &mut io::stdout());
    Ok(())
}
