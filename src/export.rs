use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::field::SelectorMap;

pub const CONFIG_EXPORT_FILE: &str = "crawler-config.json";

/// Pages to crawl together with the selectors captured for them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigExport {
    pub urls: Vec<String>,
    pub selectors: SelectorMap,
}

impl ConfigExport {
    /// Blank URLs are dropped
    pub fn new<I, S>(urls: I, selectors: SelectorMap) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls = urls
            .into_iter()
            .map(Into::into)
            .filter(|u: &String| !u.trim().is_empty())
            .collect();
        Self { urls, selectors }
    }
}

/// `crawled-data-<timestamp>.json`, with `:` and `.` made file-name safe
pub fn crawl_export_name(timestamp: DateTime<Utc>) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("crawled-data-{}.json", stamp)
}

/// Write `value` as pretty JSON to `dir/name`, creating `dir` if needed
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, content)?;
    info!(path = %path.display(), "wrote export");
    Ok(path)
}
