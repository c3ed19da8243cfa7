//! Shared helpers for the command implementations

use std::path::Path;
use url::Url;

use pluck::config::Config;
use pluck::error::{PluckError, Result};
use pluck::field::SelectorMap;
use pluck::page::Page;

/// Page URL from --url, else base_url from config, else the file's own path
pub fn resolve_page_url(url: Option<String>, config: &Config, html_path: &Path) -> Result<Url> {
    if let Some(url) = url.or_else(|| config.base_url.clone()) {
        return Ok(Url::parse(&url)?);
    }
    let absolute = std::fs::canonicalize(html_path)?;
    Url::from_file_path(&absolute).map_err(|_| {
        PluckError::ConfigError(format!("Cannot build a URL for {}", absolute.display()))
    })
}

/// Read and parse a saved HTML page
pub fn load_page(html_path: &Path, url: Option<String>, config: &Config) -> Result<Page> {
    let page_url = resolve_page_url(url, config, html_path)?;
    let html = std::fs::read_to_string(html_path)?;
    Ok(Page::from_parts(page_url, &html))
}

/// Read a selector file in either supported format
pub fn read_selectors(path: &Path) -> Result<SelectorMap> {
    let content = std::fs::read_to_string(path)?;
    SelectorMap::from_json(&content)
}

/// Truncate a string to max length, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("€€€€€€", 5), "€€...");
    }

    #[test]
    fn test_explicit_url_wins() {
        let config = Config {
            base_url: Some("https://base.example/".into()),
            ..Config::default()
        };
        let url = resolve_page_url(Some("https://shop.example/p".into()), &config, Path::new("x.html")).unwrap();
        assert_eq!(url.as_str(), "https://shop.example/p");

        let url = resolve_page_url(None, &config, Path::new("x.html")).unwrap();
        assert_eq!(url.as_str(), "https://base.example/");
    }
}
