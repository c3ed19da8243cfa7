//! Parsing of undelimited "label value label value ..." specification blobs.
//!
//! Attribute sections render as label/value pairs glued together with no
//! punctuation. Values are recovered by locating every known label from a
//! fixed catalogue and cutting each value at the nearest following label.
//! Labels missing from the catalogue are silently absorbed into the previous
//! value; that is a known precision limit of the approach.

use std::collections::BTreeMap;
use tracing::debug;

use crate::page::collapse_whitespace;

/// Parsed specification: label → value
pub type SpecMap = BTreeMap<String, String>;

/// A known specification label and the literal text that marks it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCatalogueEntry {
    pub label: &'static str,
    pub token: &'static str,
}

const fn entry(label: &'static str) -> SpecCatalogueEntry {
    SpecCatalogueEntry { label, token: label }
}

/// Catalogue order drives segmentation, not output order
pub const SPEC_CATALOGUE: &[SpecCatalogueEntry] = &[
    entry("Display Type"),
    entry("Resolution"),
    entry("Screen Size Class"),
    entry("High Dynamic Range (HDR)"),
    entry("Panel Type"),
    entry("Backlight Type"),
    entry("Refresh Rate"),
    entry("Smart Platform"),
    entry("Featured Streaming Services"),
    entry("Number of HDMI Inputs (Total)"),
    entry("TV Tuner Type"),
    entry("Works With"),
    entry("Voice Assistant"),
];

/// Section heading scraped along with the pairs
pub const BOILERPLATE_HEADING: &str = "Key Specs";

/// What a clean-up rule does to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Replace the whole value
    ReplaceWith(&'static str),
    /// Replace the matched text inside the value
    Substitute(&'static str),
}

/// Literal fix for a known concatenation artifact on one label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupRule {
    pub label: &'static str,
    pub contains: &'static str,
    pub action: Cleanup,
}

pub const CLEANUP_RULES: &[CleanupRule] = &[
    // "No" glued to the next row's "LED"
    CleanupRule {
        label: "High Dynamic Range (HDR)",
        contains: "NoLED",
        action: Cleanup::ReplaceWith("No"),
    },
    CleanupRule {
        label: "Voice Assistant",
        contains: "Built-inAmazon",
        action: Cleanup::Substitute("Built-in Amazon"),
    },
];

/// Split a spec blob into label → value using [`SPEC_CATALOGUE`]
pub fn parse_spec_block(raw: &str) -> SpecMap {
    let normalized = collapse_whitespace(raw);
    let text = normalized.replacen(BOILERPLATE_HEADING, "", 1);

    let mut specs = SpecMap::new();

    for spec in SPEC_CATALOGUE {
        let Some(start) = text.find(spec.token) else {
            continue;
        };
        let value_start = start + spec.token.len();
        let value_end = next_label_position(&text, value_start, spec).unwrap_or(text.len());

        let value = text[value_start..value_end].trim();
        if value.is_empty() {
            continue;
        }

        let cleaned = strip_trailing_labels(apply_cleanup(spec.label, value), spec);
        if cleaned.is_empty() {
            continue;
        }

        debug!(label = spec.label, value = %cleaned, "parsed spec");
        specs.insert(spec.label.to_string(), cleaned);
    }

    specs
}

/// Earliest position at or after `from` where another catalogue label starts
fn next_label_position(text: &str, from: usize, current: &SpecCatalogueEntry) -> Option<usize> {
    let rest = &text[from..];
    SPEC_CATALOGUE
        .iter()
        .filter(|other| other.token != current.token)
        .filter_map(|other| rest.find(other.token))
        .min()
        .map(|offset| from + offset)
}

fn apply_cleanup(label: &str, value: &str) -> String {
    let mut value = value.to_string();
    for rule in CLEANUP_RULES.iter().filter(|r| r.label == label) {
        if !value.contains(rule.contains) {
            continue;
        }
        value = match rule.action {
            Cleanup::ReplaceWith(replacement) => replacement.to_string(),
            Cleanup::Substitute(replacement) => value.replace(rule.contains, replacement),
        };
    }
    value
}

/// Drop another label's text left dangling at the end of a value
fn strip_trailing_labels(mut value: String, current: &SpecCatalogueEntry) -> String {
    for other in SPEC_CATALOGUE.iter().filter(|o| o.token != current.token) {
        if let Some(stripped) = value.strip_suffix(other.token) {
            value = stripped.trim_end().to_string();
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(map: &SpecMap, label: &str) -> Option<String> {
        map.get(label).cloned()
    }

    #[test]
    fn test_basic_block_with_heading() {
        let specs = parse_spec_block("Key SpecsDisplay Type LED Resolution 4K UHD Smart Platform Roku");
        assert_eq!(specs.len(), 3);
        assert_eq!(spec(&specs, "Display Type").as_deref(), Some("LED"));
        assert_eq!(spec(&specs, "Resolution").as_deref(), Some("4K UHD"));
        assert_eq!(spec(&specs, "Smart Platform").as_deref(), Some("Roku"));
    }

    #[test]
    fn test_whitespace_and_newlines_collapse() {
        let specs = parse_spec_block("\n  Panel Type\n\n  IPS  \n  Refresh Rate   60Hz\n");
        assert_eq!(spec(&specs, "Panel Type").as_deref(), Some("IPS"));
        assert_eq!(spec(&specs, "Refresh Rate").as_deref(), Some("60Hz"));
    }

    #[test]
    fn test_text_order_differs_from_catalogue_order() {
        let specs = parse_spec_block("Voice Assistant Alexa Display Type OLED");
        assert_eq!(spec(&specs, "Voice Assistant").as_deref(), Some("Alexa"));
        assert_eq!(spec(&specs, "Display Type").as_deref(), Some("OLED"));
    }

    #[test]
    fn test_hdr_cleanup() {
        let specs = parse_spec_block("High Dynamic Range (HDR) NoLED Backlight Type Direct Lit");
        assert_eq!(spec(&specs, "High Dynamic Range (HDR)").as_deref(), Some("No"));
        assert_eq!(spec(&specs, "Backlight Type").as_deref(), Some("Direct Lit"));
    }

    #[test]
    fn test_voice_assistant_cleanup() {
        let specs = parse_spec_block("Works With Google Assistant Voice Assistant Built-inAmazon Alexa");
        assert_eq!(spec(&specs, "Works With").as_deref(), Some("Google Assistant"));
        assert_eq!(spec(&specs, "Voice Assistant").as_deref(), Some("Built-in Amazon Alexa"));
    }

    #[test]
    fn test_full_tv_block() {
        let raw = "Key Specs Display Type LED Resolution 4K (2160p) Screen Size Class 55 inches \
                   High Dynamic Range (HDR) Yes Panel Type VA Backlight Type Full Array \
                   Refresh Rate 60Hz Smart Platform Google TV Featured Streaming Services Netflix, YouTube \
                   Number of HDMI Inputs (Total) 4 TV Tuner Type ATSC 3.0 Works With Apple AirPlay \
                   Voice Assistant Google Assistant";
        let specs = parse_spec_block(raw);
        assert_eq!(specs.len(), SPEC_CATALOGUE.len());
        assert_eq!(spec(&specs, "Screen Size Class").as_deref(), Some("55 inches"));
        assert_eq!(spec(&specs, "Number of HDMI Inputs (Total)").as_deref(), Some("4"));
        assert_eq!(spec(&specs, "Featured Streaming Services").as_deref(), Some("Netflix, YouTube"));
        assert_eq!(spec(&specs, "Voice Assistant").as_deref(), Some("Google Assistant"));
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let specs = parse_spec_block("Display Type Resolution 1080p");
        assert!(!specs.contains_key("Display Type"));
        assert_eq!(spec(&specs, "Resolution").as_deref(), Some("1080p"));
    }

    #[test]
    fn test_no_catalogue_labels() {
        assert!(parse_spec_block("Color Black Weight 12 lbs").is_empty());
        assert!(parse_spec_block("").is_empty());
    }

    #[test]
    fn test_label_inside_value_cuts_it_short() {
        // "Resolution" inside the panel value ends it early
        let specs = parse_spec_block("Panel Type IPS High Resolution Refresh Rate 60Hz");
        assert_eq!(spec(&specs, "Panel Type").as_deref(), Some("IPS High"));
        assert!(!specs.contains_key("Resolution"));
        assert_eq!(spec(&specs, "Refresh Rate").as_deref(), Some("60Hz"));
    }

    #[test]
    fn test_strip_trailing_labels() {
        let current = SPEC_CATALOGUE[0];
        assert_eq!(strip_trailing_labels("LED Works With".to_string(), &current), "LED");
        assert_eq!(strip_trailing_labels("Display Type".to_string(), &SPEC_CATALOGUE[1]), "");
    }
}
