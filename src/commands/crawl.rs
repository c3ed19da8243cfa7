//! Crawl command: extract every captured field from a saved page

use colored::Colorize;
use std::path::Path;

use pluck::config::Config;
use pluck::crawl::{crawl_page, ExtractionRecord};
use pluck::error::{PluckError, Result};
use pluck::export::{crawl_export_name, write_json};
use pluck::specs::SpecMap;

use crate::utils::{load_page, read_selectors, truncate_str};

pub fn cmd_crawl(
    config: &Config,
    html: &Path,
    url: Option<String>,
    selectors_path: &Path,
    export: bool,
    json: bool,
) -> Result<()> {
    let selectors = read_selectors(selectors_path)?;
    if selectors.captured_count() == 0 {
        return Err(PluckError::ConfigError(format!(
            "No selectors captured in {}",
            selectors_path.display()
        )));
    }

    let page = load_page(html, url, config)?;
    let record = crawl_page(&page, &selectors);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    if export {
        let path = write_json(
            &config.export_dir(),
            &crawl_export_name(record.timestamp),
            &record,
        )?;
        if json {
            eprintln!("Exported to {}", path.display());
        } else {
            println!("\n  {} Exported to {}", "✓".green(), path.display());
        }
    }

    Ok(())
}

fn print_record(record: &ExtractionRecord) {
    println!("\n{} {}", "Crawled".cyan().bold(), record.source_url);
    if !record.page_title.is_empty() {
        println!("  Title: {}", record.page_title);
    }
    println!();

    for (field, value) in &record.fields {
        match value {
            Some(value) => println!("  {} {:<18} {}", "✓".green(), field.as_str(), truncate_str(value, 80)),
            None => println!("  {} {:<18} {}", "✗".red(), field.as_str(), "(not found)".dimmed()),
        }
    }

    if let Some(specs) = &record.tech_specs {
        print_specs("techSpecs", specs);
    }
    if let Some(specs) = &record.tech_specs_2 {
        print_specs("techSpecs2", specs);
    }

    let missing = record.missing_fields().len();
    if missing > 0 {
        println!(
            "\n{}",
            format!("{} of {} fields had no value", missing, record.fields.len()).yellow()
        );
    }
}

fn print_specs(name: &str, specs: &SpecMap) {
    println!("\n  {} ({} entries)", name.bold(), specs.len());
    if specs.is_empty() {
        println!("    {}", "(nothing recognised)".dimmed());
    }
    for (label, value) in specs {
        println!("    {}: {}", label, value);
    }
}
