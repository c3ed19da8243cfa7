//! Command implementations for pluck CLI

mod capture;
mod crawl;
mod misc;

pub use capture::*;
pub use crawl::*;
pub use misc::*;
