use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::field::FieldName;

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "pluck")]
#[command(author, version, about = "Capture product-page selectors and extract product data", long_about = None)]
#[command(after_help = r#"Examples:
  pluck capture page.html --url https://shop.example/p/1 --field price --target ".price-box span"
  pluck crawl page.html --url https://shop.example/p/1 --selectors selectors.json
  pluck specs "Key Specs Display Type LED Resolution 4K UHD"
  pluck export-config --selectors selectors.json --url https://shop.example/p/1

Quick Start:
  1. Save a product page as HTML
  2. pluck capture page.html --field price --target "<css>" --write selectors.json
  3. pluck crawl page.html --selectors selectors.json --export
"#)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every captured field from a saved page
    #[command(after_help = r#"Examples:
  pluck crawl page.html --url https://shop.example/p/1 --selectors selectors.json
  pluck crawl page.html --selectors selectors.json --json | jq '.fields.price'
  pluck crawl page.html --selectors selectors.json --export   Write crawled-data-<time>.json
"#)]
    Crawl {
        /// Saved HTML of the product page
        #[arg(value_name = "HTML")]
        html: PathBuf,

        /// Address the page was loaded from (defaults to base_url from config)
        #[arg(long)]
        url: Option<String>,

        /// Selector file: {"price": ".price"} or {"selector_price": ".price"}
        #[arg(long, short = 's')]
        selectors: PathBuf,

        /// Write the record to the export directory
        #[arg(long)]
        export: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture a selector for a field by clicking an element
    #[command(after_help = r##"Examples:
  pluck capture page.html --field price --target ".pricing > span"
  pluck capture page.html --field image --target "#gallery img" --write selectors.json
"##)]
    Capture {
        /// Saved HTML of the product page
        #[arg(value_name = "HTML")]
        html: PathBuf,

        /// Address the page was loaded from (defaults to base_url from config)
        #[arg(long)]
        url: Option<String>,

        /// Field to capture (sku, price, image, productName, attributeSection1, attributeSection2)
        #[arg(long, short = 'f')]
        field: FieldName,

        /// CSS selector of the element to click (first match is used)
        #[arg(long, short = 't')]
        target: String,

        /// Merge the captured selector into this selector file
        #[arg(long, short = 'w')]
        write: Option<PathBuf>,
    },

    /// Parse a "key value key value" spec block (reads stdin when TEXT is omitted)
    Specs {
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write crawler-config.json with the URLs to crawl and their selectors
    ExportConfig {
        /// Selector file to export
        #[arg(long, short = 's')]
        selectors: PathBuf,

        /// Page URLs (can be specified multiple times)
        #[arg(long)]
        url: Vec<String>,

        /// Output directory (defaults to export_dir from config)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  pluck completions bash > ~/.local/share/bash-completion/completions/pluck
  pluck completions zsh > ~/.zfunc/_pluck
  pluck completions fish > ~/.config/fish/completions/pluck.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}
