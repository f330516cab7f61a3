//! Extraction orchestrator.
//!
//! One call, one URL, one `ScrapeResult`. The registry decides whether the
//! URL belongs to a known platform; known platforms go through the selector
//! adapter with pagination, everything else through generic detection. A
//! known-site pass that finds no reviews falls back to generic detection on
//! the same document before giving up.

use std::time::Duration;

use scraper::{Html, Selector};

use crate::adapter;
use crate::detect::{self, DetectorConfig};
use crate::error::{Result, ScrapeError};
use crate::fetch::Fetcher;
use crate::infer;
use crate::profile::PlatformProfile;
use crate::record::{ProductRecord, ReviewRecord, ScrapeResult, DEFAULT_PRODUCT_NAME};
use crate::registry::SiteRegistry;
use crate::sentiment::{LexiconSentiment, SentimentModel};
use crate::utils::Deadline;

/// Knobs for one extraction call
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Pagination cap for known sites
    pub max_pages: usize,
    /// Soft deadline over the whole call; expiry returns partial results
    pub timeout: Option<Duration>,
    /// Generic-path detection thresholds
    pub detector: DetectorConfig,
    /// Halve ratings above 5 on the assumption they are 10-scale
    pub ten_scale_halving: bool,
    /// Randomized delay between page fetches, in milliseconds
    pub page_delay_ms: (u64, u64),
    /// Skip the registry and force generic detection
    pub force_generic: bool,
    /// Use this platform's profile regardless of what the registry says
    pub profile_override: Option<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        ScrapeOptions {
            max_pages: adapter::DEFAULT_MAX_PAGES,
            timeout: None,
            detector: DetectorConfig::default(),
            ten_scale_halving: true,
            page_delay_ms: adapter::DEFAULT_PAGE_DELAY_MS,
            force_generic: false,
            profile_override: None,
        }
    }
}

/// Extract product and reviews from a URL.
pub fn scrape(
    fetcher: &dyn Fetcher,
    registry: &SiteRegistry,
    url: &str,
    opts: &ScrapeOptions,
) -> Result<ScrapeResult> {
    scrape_with(fetcher, registry, url, opts, &LexiconSentiment)
}

/// Same as [`scrape`] with an explicit sentiment model.
pub fn scrape_with(
    fetcher: &dyn Fetcher,
    registry: &SiteRegistry,
    url: &str,
    opts: &ScrapeOptions,
    sentiment: &dyn SentimentModel,
) -> Result<ScrapeResult> {
    if registry.is_blocked(url) {
        let domain = crate::utils::extract_domain(url).unwrap_or_else(|| url.to_string());
        return Err(ScrapeError::BlockedDomain(domain));
    }

    let platform = if opts.force_generic {
        None
    } else if let Some(key) = &opts.profile_override {
        Some(
            registry
                .get(key)
                .ok_or_else(|| {
                    ScrapeError::ConfigError(format!("unknown platform '{}'", key))
                })?
                .profile
                .clone(),
        )
    } else {
        registry.identify(url).and_then(|key| registry.profile(key)).cloned()
    };

    match platform {
        Some(prof) => scrape_known(fetcher, url, &prof, opts, sentiment),
        None => scrape_generic(fetcher, url, opts, sentiment),
    }
}

/// Known-site path: selector adapter plus pagination.
fn scrape_known(
    fetcher: &dyn Fetcher,
    url: &str,
    prof: &PlatformProfile,
    opts: &ScrapeOptions,
    sentiment: &dyn SentimentModel,
) -> Result<ScrapeResult> {
    let deadline = opts
        .timeout
        .map(Deadline::after)
        .unwrap_or_else(Deadline::none);

    let first_page = fetcher.fetch(url)?;
    let doc = Html::parse_document(&first_page.html);

    let mut product = adapter::extract_product(&doc, prof, url, opts.ten_scale_halving);

    // A reviews-only URL often lacks product metadata; rebuild the product
    // URL from the path and fetch that page for the metadata alone.
    if product.name == DEFAULT_PRODUCT_NAME {
        if let Some(marker) = prof.reviews_path_marker.as_deref() {
            if url.contains(marker) {
                if let Some(product_url) = adapter::product_url_from_reviews_url(url, prof) {
                    if let Ok(page) = fetcher.fetch(&product_url) {
                        let product_doc = Html::parse_document(&page.html);
                        product = adapter::extract_product(
                            &product_doc,
                            prof,
                            url,
                            opts.ten_scale_halving,
                        );
                    }
                }
            }
        }
    }

    let paginated = adapter::scrape_reviews_paginated(
        fetcher,
        url,
        &first_page.html,
        prof,
        opts.max_pages,
        opts.page_delay_ms,
        &deadline,
        opts.ten_scale_halving,
    );

    let mut reviews = paginated.reviews;
    let mut pages_fetched = paginated.pages_fetched.max(1);

    // Stale selectors degrade to generic detection rather than failing
    if reviews.is_empty() {
        reviews = generic_reviews(&doc, &opts.detector, sentiment);
        pages_fetched = 1;
    }
    if reviews.is_empty() {
        return Err(ScrapeError::NoReviewsExtracted);
    }

    Ok(ScrapeResult {
        product,
        reviews,
        scraped_at: chrono::Utc::now(),
        pages_fetched,
    })
}

/// Generic path: heuristic detection on a single page.
fn scrape_generic(
    fetcher: &dyn Fetcher,
    url: &str,
    opts: &ScrapeOptions,
    sentiment: &dyn SentimentModel,
) -> Result<ScrapeResult> {
    let page = fetcher.fetch(url)?;
    let doc = Html::parse_document(&page.html);

    let candidates = detect::detect(&doc, &opts.detector);
    if candidates.is_empty() {
        return Err(ScrapeError::NoCandidatesFound);
    }

    let reviews = generic_reviews(&doc, &opts.detector, sentiment);
    if reviews.is_empty() {
        return Err(ScrapeError::NoReviewsExtracted);
    }

    Ok(ScrapeResult {
        product: generic_product(&doc, url),
        reviews,
        scraped_at: chrono::Utc::now(),
        pages_fetched: 1,
    })
}

/// Run detection and turn surviving candidates into full records.
pub fn generic_reviews(
    doc: &Html,
    cfg: &DetectorConfig,
    sentiment: &dyn SentimentModel,
) -> Vec<ReviewRecord> {
    let min_len = cfg.min_text_len.saturating_sub(1);
    detect::detect(doc, cfg)
        .into_iter()
        .filter_map(|c| {
            let mut record = ReviewRecord::new(&c.text, min_len)?;
            record.rating = infer::infer_rating(&record.text, Some(c.element), sentiment);
            record.author = infer::infer_author(&record.text, Some(c.element));
            record.date = infer::infer_date(&record.text, Some(c.element));
            record.score = Some(c.score);
            Some(record)
        })
        .collect()
}

/// Product metadata without a selector profile: document title and
/// open-graph image, placeholders otherwise.
fn generic_product(doc: &Html, url: &str) -> ProductRecord {
    let mut product = ProductRecord::fallback(url);

    let title_sel = Selector::parse("h1, title").expect("invalid title selector");
    if let Some(el) = doc.select(&title_sel).next() {
        let name = detect::element_text(el);
        if !name.is_empty() {
            product.name = name;
        }
    }

    let og_sel =
        Selector::parse(r#"meta[property="og:image"]"#).expect("invalid og:image selector");
    if let Some(content) = doc
        .select(&og_sel)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        if let Some(resolved) = crate::utils::resolve_url(url, content) {
            product.image_url = resolved;
        }
    }

    product
}
