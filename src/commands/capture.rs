//! Capture command: simulate the operator clicking an element for a field

use colored::Colorize;
use std::path::{Path, PathBuf};

use pluck::config::Config;
use pluck::error::{PluckError, Result};
use pluck::field::{FieldName, SelectorMap};
use pluck::locate::locate;
use pluck::overlay::MarkerOverlay;
use pluck::page::Page;
use pluck::protocol::{Event, PageController, Request};
use pluck::selector::synthesize_with_tier;

use crate::utils::{load_page, read_selectors};

pub fn cmd_capture(
    config: &Config,
    html: &Path,
    url: Option<String>,
    field: FieldName,
    target: &str,
    write: Option<PathBuf>,
) -> Result<()> {
    Page::parse_selector(target)?;
    let page = load_page(html, url, config)?;
    let el = page
        .select_first(target)
        .ok_or_else(|| PluckError::TargetNotFound(target.to_string()))?;

    let mut controller = PageController::new(&page, MarkerOverlay::new());
    controller.handle(Request::StartElementSelection { field });
    controller.hover(el);
    let Some(Event::SelectorCaptured { selector, .. }) = controller.click(el) else {
        return Err(PluckError::ConfigError("Capture session ended without a selection".into()));
    };

    let tier = synthesize_with_tier(&page, el).tier;
    println!("\n{} {}", "Captured".cyan().bold(), field);
    println!("  Element:  <{}>", el.value().name());
    println!("  Selector: {}", selector.bold());
    println!("  Rule:     {:?}", tier);

    match locate(&page, &selector, field) {
        Some(found) if found.id() == el.id() => {
            println!("  {} Selector resolves back to the clicked element", "✓".green())
        }
        Some(found) => println!(
            "  {} Selector resolves to a different <{}> element",
            "!".yellow(),
            found.value().name()
        ),
        None => println!("  {} Selector does not resolve on this page", "✗".red()),
    }
    if !tier.is_verified() {
        println!("  {}", "Uniqueness of this selector was not checked".dimmed());
    }

    if let Some(path) = write {
        let mut selectors = if path.exists() {
            read_selectors(&path)?
        } else {
            SelectorMap::new()
        };
        selectors.insert(field, selector);
        std::fs::write(&path, serde_json::to_string_pretty(&selectors)?)?;
        println!("\n  {} Saved to {}", "✓".green(), path.display());
    }

    Ok(())
}
