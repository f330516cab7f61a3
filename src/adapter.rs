//! Known-site adapter: selector-profile-driven extraction.
//!
//! Every field follows the same rule: try the profile's selectors in
//! order, first non-empty match wins, no merging across selectors. The
//! review-block field picks one winning selector that defines the block
//! set for the whole page; fields inside each block are then extracted
//! independently under the same rule.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use scraper::{Html, Selector};

use crate::detect::{element_text, Candidate, CandidateOrigin};
use crate::fetch::Fetcher;
use crate::profile::{self, PlatformProfile};
use crate::record::{
    clamp_product_rating, ProductRecord, Rating, ReviewRecord, DEFAULT_PRODUCT_NAME,
    DEFAULT_RATING, PLACEHOLDER_IMAGE,
};
use crate::utils::{resolve_url, Deadline};

/// Review text must exceed this many characters to be accepted
const MIN_REVIEW_TEXT_LEN: usize = 10;

/// Hard cap on pages fetched per call
pub const DEFAULT_MAX_PAGES: usize = 3;

/// Randomized delay between successive page fetches, in milliseconds
pub const DEFAULT_PAGE_DELAY_MS: (u64, u64) = (2_000, 4_000);

/// Currency-prefixed first number, separators allowed
static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\$₹€£¥]?([\d,]+\.?\d*)").expect("invalid price regex"));

/// Any first number
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("invalid number regex"));

/// In-text rating fallback ("4 star", "4 stars")
static STAR_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*star").expect("invalid star regex"));

/// Next-page controls tried when the profile doesn't configure any
static DEFAULT_NEXT_SELECTORS: Lazy<Vec<String>> = Lazy::new(|| {
    ["a[aria-label=Next]", "a[rel=next]", "a.next", "li.a-last a"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

fn first_number(text: &str) -> Option<f32> {
    NUMBER_RE
        .captures(text)
        .and_then(|caps| caps[1].parse::<f32>().ok())
}

/// Extract product metadata. Missing fields fall back to placeholders so
/// the record is never incomplete.
pub fn extract_product(
    doc: &Html,
    prof: &PlatformProfile,
    url: &str,
    ten_scale_halving: bool,
) -> ProductRecord {
    let name = profile::first_text(doc, &prof.product_name)
        .or_else(|| page_title(doc))
        .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string());

    let image_url = profile::first_attr(doc, &prof.product_image, &["src", "data-src"])
        .and_then(|src| resolve_url(url, &src))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let price = profile::first_text(doc, &prof.product_price).and_then(|text| {
        PRICE_RE
            .captures(&text)
            .map(|caps| caps[1].replace(',', ""))
            .filter(|p| !p.is_empty())
    });

    let rating = profile::first_text(doc, &prof.product_rating)
        .and_then(|text| first_number(&text))
        .map(|raw| clamp_product_rating(raw, ten_scale_halving));

    ProductRecord {
        name,
        image_url,
        price,
        rating,
        source_url: url.to_string(),
    }
}

fn page_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Block elements for the page, from the first review-block selector that
/// matches anything. Falls back to treating each review-text match as its
/// own block for text-only profiles.
pub fn review_block_candidates<'a>(
    doc: &'a Html,
    prof: &PlatformProfile,
) -> Vec<Candidate<'a>> {
    let mut blocks = profile::first_selection(doc, &prof.review_block);
    if blocks.is_empty() {
        blocks = profile::first_selection(doc, &prof.review_text);
    }
    blocks
        .into_iter()
        .map(|element| Candidate {
            text: element_text(element),
            element,
            score: 0,
            origin: CandidateOrigin::SelectorMatch,
        })
        .collect()
}

/// Extract reviews from one page. A block is accepted only if its text
/// exceeds the minimum length; a missing rating falls back to an in-text
/// "n star" pattern, then to the neutral default.
pub fn extract_reviews(
    doc: &Html,
    prof: &PlatformProfile,
    ten_scale_halving: bool,
) -> Vec<ReviewRecord> {
    let mut reviews = Vec::new();

    for block in review_block_candidates(doc, prof) {
        let text = if prof.review_text.is_empty() {
            Some(block.text.clone())
        } else {
            profile::first_text_in(block.element, &prof.review_text)
                .or_else(|| (prof.review_block.is_empty()).then(|| block.text.clone()))
        };
        let Some(text) = text else { continue };

        let Some(mut record) = ReviewRecord::new(&text, MIN_REVIEW_TEXT_LEN) else {
            continue;
        };

        let explicit = profile::first_text_in(block.element, &prof.review_rating)
            .and_then(|t| first_number(&t));
        let raw_rating = explicit
            .or_else(|| {
                STAR_TEXT_RE
                    .captures(&record.text)
                    .and_then(|caps| caps[1].parse::<f32>().ok())
            })
            .unwrap_or(DEFAULT_RATING);
        record.rating = Rating::from_raw_with(raw_rating, ten_scale_halving);

        record.title = profile::first_text_in(block.element, &prof.review_title);
        if let Some(author) = profile::first_text_in(block.element, &prof.reviewer_name) {
            record.author = author;
        }
        record.date = profile::first_text_in(block.element, &prof.review_date);

        reviews.push(record);
    }

    reviews
}

/// Rebuild the canonical product URL from a reviews-only URL using the
/// profile's path marker and template.
pub fn product_url_from_reviews_url(url: &str, prof: &PlatformProfile) -> Option<String> {
    let marker = prof.reviews_path_marker.as_deref()?;
    let template = prof.product_url_template.as_deref()?;

    let (_, tail) = url.split_once(marker)?;
    let id: &str = tail
        .split(['/', '?'])
        .next()
        .filter(|id| !id.is_empty())?;

    Some(template.replace("{id}", id))
}

fn page_url(base: &str, param: &str, page: usize) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", base, separator, param, page)
}

fn has_next_control(doc: &Html, prof: &PlatformProfile) -> bool {
    if prof.next_page.is_empty() {
        profile::any_match(doc, &DEFAULT_NEXT_SELECTORS)
    } else {
        profile::any_match(doc, &prof.next_page)
    }
}

/// Reviews gathered across pages plus how many pages were actually fetched
#[derive(Debug)]
pub struct PaginatedReviews {
    pub reviews: Vec<ReviewRecord>,
    pub pages_fetched: usize,
}

/// Follow pagination up to `max_pages`, starting from an already-fetched
/// first page. Stops early when no next control exists, a later page yields
/// nothing new, a page fetch fails, or the deadline expires. Fetch failures
/// here never fail the call; the reviews gathered so far are returned.
pub fn scrape_reviews_paginated(
    fetcher: &dyn Fetcher,
    url: &str,
    first_page_html: &str,
    prof: &PlatformProfile,
    max_pages: usize,
    page_delay_ms: (u64, u64),
    deadline: &Deadline,
    ten_scale_halving: bool,
) -> PaginatedReviews {
    let mut reviews: Vec<ReviewRecord> = Vec::new();
    let mut pages_fetched = 0usize;
    let mut first_doc = Some(Html::parse_document(first_page_html));

    for page in 1..=max_pages.max(1) {
        let doc = match first_doc.take() {
            Some(doc) => doc,
            None => {
                let target = page_url(url, prof.page_param(), page);
                match fetcher.fetch(&target) {
                    Ok(content) => Html::parse_document(&content.html),
                    Err(e) => {
                        eprintln!(
                            "  Page {} fetch failed ({}), stopping pagination",
                            page, e
                        );
                        break;
                    }
                }
            }
        };
        pages_fetched += 1;

        let page_reviews = extract_reviews(&doc, prof, ten_scale_halving);

        if page_reviews.is_empty() && page > 1 {
            break;
        }
        reviews.extend(page_reviews);

        if page == max_pages || !has_next_control(&doc, prof) {
            break;
        }
        if deadline.expired() {
            eprintln!("  Deadline reached after page {}, returning partial results", page);
            break;
        }

        let delay = if page_delay_ms.1 > page_delay_ms.0 {
            rand::thread_rng().gen_range(page_delay_ms.0..=page_delay_ms.1)
        } else {
            page_delay_ms.0
        };
        if delay > 0 {
            std::thread::sleep(std::time::Duration::from_millis(delay));
        }
    }

    PaginatedReviews {
        reviews,
        pages_fetched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flipkart_like_profile() -> PlatformProfile {
        PlatformProfile {
            product_name: vec!["h1.missing".into(), "span.product-title".into()],
            product_image: vec!["img.hero".into()],
            product_price: vec!["div.price".into()],
            product_rating: vec!["div.avg-rating".into()],
            review_block: vec![
                "[data-hook=review]".into(),
                "div.review-card".into(),
            ],
            review_rating: vec!["span.stars".into()],
            review_text: vec!["div.body".into()],
            review_title: vec!["p.headline".into()],
            reviewer_name: vec!["span.who".into()],
            review_date: vec!["span.when".into()],
            reviews_path_marker: Some("/product-reviews/".into()),
            product_url_template: Some("https://shop.example.com/p/{id}".into()),
            ..Default::default()
        }
    }

    const PRODUCT_PAGE: &str = r#"<html><head><title>Fallback Title</title></head><body>
        <span class="product-title">Acme Wireless Earbuds</span>
        <img class="hero" src="/images/earbuds.jpg">
        <div class="price">₹1,499.00</div>
        <div class="avg-rating">8.6 based on 120 ratings</div>
        <div class="review-card">
            <span class="stars">4</span>
            <p class="headline">Worth it</p>
            <div class="body">Bass is punchy and the case feels premium for the price.</div>
            <span class="who">Asha</span>
            <span class="when">12 Aug 2024</span>
        </div>
        <div class="review-card">
            <div class="body">ok</div>
        </div>
        <div class="review-card">
            <div class="body">Stopped charging after two weeks, 1 star from me honestly.</div>
        </div>
    </body></html>"#;

    #[test]
    fn test_extract_product_fields() {
        let doc = Html::parse_document(PRODUCT_PAGE);
        let prof = flipkart_like_profile();
        let product = extract_product(&doc, &prof, "https://shop.example.com/p/abc", true);
        assert_eq!(product.name, "Acme Wireless Earbuds");
        assert_eq!(product.image_url, "https://shop.example.com/images/earbuds.jpg");
        assert_eq!(product.price.as_deref(), Some("1499.00"));
        // 8.6 treated as out of 10
        assert_eq!(product.rating, Some(4.3));
        assert_eq!(product.source_url, "https://shop.example.com/p/abc");
    }

    #[test]
    fn test_extract_product_defaults() {
        let doc = Html::parse_document("<html><body><p>nothing useful</p></body></html>");
        let prof = flipkart_like_profile();
        let product = extract_product(&doc, &prof, "https://shop.example.com/p/abc", true);
        assert_eq!(product.name, DEFAULT_PRODUCT_NAME);
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(product.price, None);
        assert_eq!(product.rating, None);
    }

    #[test]
    fn test_extract_product_title_fallback() {
        let doc = Html::parse_document(
            "<html><head><title>Earbuds - Shop</title></head><body></body></html>",
        );
        let prof = flipkart_like_profile();
        let product = extract_product(&doc, &prof, "https://shop.example.com/p/abc", true);
        assert_eq!(product.name, "Earbuds - Shop");
    }

    #[test]
    fn test_extract_reviews_fields_and_gate() {
        let doc = Html::parse_document(PRODUCT_PAGE);
        let prof = flipkart_like_profile();
        let reviews = extract_reviews(&doc, &prof, true);

        // "ok" fails the 10-char gate
        assert_eq!(reviews.len(), 2);

        let first = &reviews[0];
        assert_eq!(first.rating.value(), 4.0);
        assert_eq!(first.title.as_deref(), Some("Worth it"));
        assert_eq!(first.author, "Asha");
        assert_eq!(first.date.as_deref(), Some("12 Aug 2024"));

        // No explicit rating node: inferred from in-text "1 star"
        let second = &reviews[1];
        assert_eq!(second.rating.value(), 1.0);
        assert_eq!(second.author, "Anonymous");
    }

    #[test]
    fn test_missing_rating_defaults_to_three() {
        let html = r#"<html><body><div class="review-card">
            <div class="body">Decent enough for daily use, nothing remarkable either way.</div>
        </div></body></html>"#;
        let doc = Html::parse_document(html);
        let prof = flipkart_like_profile();
        let reviews = extract_reviews(&doc, &prof, true);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating.value(), 3.0);
    }

    #[test]
    fn test_block_candidates_are_selector_origin() {
        let doc = Html::parse_document(PRODUCT_PAGE);
        let prof = flipkart_like_profile();
        let candidates = review_block_candidates(&doc, &prof);
        assert_eq!(candidates.len(), 3);
        assert!(candidates
            .iter()
            .all(|c| c.origin == CandidateOrigin::SelectorMatch));
    }

    #[test]
    fn test_product_url_rewrite() {
        let prof = flipkart_like_profile();
        assert_eq!(
            product_url_from_reviews_url(
                "https://shop.example.com/product-reviews/itm9cfd?pid=MOB123",
                &prof
            ),
            Some("https://shop.example.com/p/itm9cfd".to_string())
        );
        assert_eq!(
            product_url_from_reviews_url("https://shop.example.com/p/itm9cfd", &prof),
            None
        );
    }

    #[test]
    fn test_page_url_building() {
        assert_eq!(
            page_url("https://x.com/reviews", "page", 2),
            "https://x.com/reviews?page=2"
        );
        assert_eq!(
            page_url("https://x.com/reviews?pid=1", "page", 3),
            "https://x.com/reviews?pid=1&page=3"
        );
    }

    #[test]
    fn test_ten_scale_review_rating_halved() {
        let html = r#"<html><body><div class="review-card">
            <span class="stars">9</span>
            <div class="body">Really impressive audio quality for this price bracket.</div>
        </div></body></html>"#;
        let doc = Html::parse_document(html);
        let prof = flipkart_like_profile();
        let reviews = extract_reviews(&doc, &prof, true);
        assert_eq!(reviews[0].rating.value(), 4.5);
    }
}
