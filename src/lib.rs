pub mod capture;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod export;
pub mod extract;
pub mod field;
pub mod locate;
pub mod overlay;
pub mod page;
pub mod protocol;
pub mod selector;
pub mod sku;
pub mod specs;

pub use error::{PluckError, Result};
