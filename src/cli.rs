use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reviewlens")]
#[command(author, version, about = "Extract product reviews from e-commerce pages", long_about = None)]
#[command(after_help = r#"Examples:
  reviewlens scrape "https://www.flipkart.com/product/p/itm123"   Extract reviews
  reviewlens scrape URL --json | jq '.reviews[].text'             JSON for scripting
  reviewlens scrape URL --generic                                 Skip site profiles
  reviewlens scrape URL --summarize                               Add pros/cons summary
  reviewlens platforms                                            List known platforms
  reviewlens doctor                                               Check runtime health
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract product info and reviews from a URL
    #[command(after_help = r#"Examples:
  reviewlens scrape "https://www.flipkart.com/product/p/itm123"
  reviewlens scrape URL --max-pages 5 --timeout 2m
  reviewlens scrape URL --profile flipkart     # Force a specific site profile
  reviewlens scrape URL --generic              # Heuristic detection only
  reviewlens scrape URL --json --summarize
"#)]
    Scrape {
        /// Product or reviews page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Use this platform profile instead of auto-detection
        #[arg(long, conflicts_with = "generic")]
        profile: Option<String>,

        /// Skip site profiles and use generic review detection
        #[arg(long)]
        generic: bool,

        /// Maximum pages to fetch when paginating
        #[arg(long, default_value_t = 3)]
        max_pages: usize,

        /// Overall deadline (e.g. 30s, 2m); partial results on expiry
        #[arg(long)]
        timeout: Option<String>,

        /// Load platform profiles from this file instead of the defaults
        #[arg(long, value_name = "PATH")]
        registry: Option<PathBuf>,

        /// Keep ratings above 5 as-is instead of halving them
        #[arg(long)]
        no_halve: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Append a rule-based pros/cons summary
        #[arg(long)]
        summarize: bool,
    },

    /// List platforms with selector profiles
    Platforms {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check external dependencies and configuration
    Doctor,
}
