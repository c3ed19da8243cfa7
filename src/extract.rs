use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::fmt;
use tracing::{debug, warn};

use crate::field::{FieldName, SelectorMap};
use crate::locate::{locate_with_source, Located};
use crate::overlay::label_text;
use crate::page::{rendered_text, raw_text, Page};

/// Lazy-loading attributes probed after `src`
pub const LAZY_IMAGE_ATTRIBUTES: [&str; 4] = ["data-src", "data-original", "data-lazy-src", "data-image"];

/// Elements whose `src` the browser exposes as a resolved URL
const SRC_RESOLVING_TAGS: [&str; 9] = [
    "img", "source", "iframe", "script", "embed", "input", "audio", "video", "track",
];

static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("Invalid img selector"));

/// One case-insensitive matcher per field for the capture overlay label
static OVERLAY_LABEL_RES: Lazy<Vec<(FieldName, Regex)>> = Lazy::new(|| {
    FieldName::ALL
        .into_iter()
        .map(|field| {
            let pattern = format!("(?i){}", regex::escape(&label_text(field)));
            (field, Regex::new(&pattern).expect("Invalid overlay label regex"))
        })
        .collect()
});

/// Why a field ended up without a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFailure {
    /// No selector was captured for the field
    NotCaptured,
    /// Neither the selector nor any fallback matched
    NotFound { selector: String },
    /// An element was found but yielded nothing usable
    NoValue,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFailure::NotCaptured => f.write_str("no selector captured"),
            FieldFailure::NotFound { selector } => write!(f, "no element for '{}'", selector),
            FieldFailure::NoValue => f.write_str("element has no value"),
        }
    }
}

/// Pull a value for `field` out of a located element.
///
/// Images yield an absolute URL; every other field yields trimmed text.
/// Returns `None` when the element carries nothing usable.
pub fn extract(page: &Page, el: ElementRef<'_>, field: FieldName) -> Option<String> {
    let value = match field {
        FieldName::Image => extract_image(page, el),
        _ => extract_text(el, field),
    };
    value.filter(|v| !v.is_empty())
}

/// Locate and extract a single field from the selector map
pub fn extract_field(
    page: &Page,
    selectors: &SelectorMap,
    field: FieldName,
) -> std::result::Result<String, FieldFailure> {
    let selector = selectors.get(field).ok_or(FieldFailure::NotCaptured)?;

    let (el, located) = locate_with_source(page, selector, field).ok_or_else(|| {
        FieldFailure::NotFound {
            selector: selector.to_string(),
        }
    })?;

    let value = extract(page, el, field).ok_or(FieldFailure::NoValue)?;

    debug!(
        field = %field,
        tag = el.value().name(),
        fallback = matches!(located, Located::Fallback(_)),
        value = %preview(&value),
        "extracted field"
    );
    Ok(value)
}

/// Image URL from the element itself, else from its first descendant `img`
fn extract_image(page: &Page, el: ElementRef<'_>) -> Option<String> {
    let url = probe_image(page, el).or_else(|| {
        el.select(&IMG_SELECTOR)
            .next()
            .and_then(|img| probe_image(page, img))
    })?;
    Some(absolutize(page, &url))
}

/// `src` (resolved, as the DOM property would be), raw `src`, lazy-load
/// attributes, then `href`
fn probe_image(page: &Page, el: ElementRef<'_>) -> Option<String> {
    let element = el.value();
    let attr = |name: &str| element.attr(name).map(str::trim).filter(|v| !v.is_empty());

    if let Some(src) = attr("src") {
        if SRC_RESOLVING_TAGS.contains(&element.name()) {
            if let Some(resolved) = page.resolve(src) {
                return Some(resolved);
            }
        }
        return Some(src.to_string());
    }

    LAZY_IMAGE_ATTRIBUTES
        .iter()
        .find_map(|name| attr(*name))
        .or_else(|| attr("href"))
        .map(String::from)
}

/// Root-relative URLs get the page origin prefixed
fn absolutize(page: &Page, url: &str) -> String {
    if url.starts_with("//") {
        format!("{}:{}", page.url().scheme(), url)
    } else if url.starts_with('/') {
        format!("{}{}", page.origin(), url)
    } else {
        url.to_string()
    }
}

/// Rendered text (raw text when nothing renders) without the capture label
fn extract_text(el: ElementRef<'_>, field: FieldName) -> Option<String> {
    let mut text = rendered_text(el);
    if text.trim().is_empty() {
        text = raw_text(el);
    }
    Some(strip_overlay_label(&text, field).trim().to_string())
}

/// Remove every `Selected: <field>` label the capture overlay may have left
pub fn strip_overlay_label(text: &str, field: FieldName) -> String {
    match OVERLAY_LABEL_RES.iter().find(|(f, _)| *f == field) {
        Some((_, re)) => re.replace_all(text, "").into_owned(),
        None => {
            warn!(field = %field, "no overlay label matcher");
            text.to_string()
        }
    }
}

fn preview(value: &str) -> String {
    let truncated: String = value.chars().take(50).collect();
    if truncated.len() < value.len() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
