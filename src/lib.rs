pub mod adapter;
pub mod cli;
pub mod dedup;
pub mod detect;
pub mod error;
pub mod fetch;
pub mod infer;
pub mod profile;
pub mod record;
pub mod registry;
pub mod scrape;
pub mod sentiment;
pub mod summarize;
pub mod utils;

pub use error::{Result, ScrapeError};
