use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluckError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("No element matches capture target: {0}")]
    TargetNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PluckError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PluckError::InvalidSelector(_) => Some(
                "Check the selector syntax, or re-capture it:\n  pluck capture page.html --field <field> --target \"<css>\""
            ),
            PluckError::UnknownField(_) => Some(
                "Known fields: sku, price, image, productName, attributeSection1, attributeSection2"
            ),
            PluckError::TargetNotFound(_) => Some(
                "The --target selector must match at least one element in the saved page"
            ),
            PluckError::UrlParseError(_) => Some(
                "Pass the page address with --url https://..., or set base_url in the config file"
            ),
            PluckError::JsonError(_) => Some(
                "Selector files are JSON objects: {\"price\": \".price\"} or {\"selector_price\": \".price\"}"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PluckError>;
