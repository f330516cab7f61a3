//! Externally supplied, site-specific selector tables.
//!
//! A profile carries an ordered list of CSS selectors per semantic field.
//! For every field the first selector yielding a non-empty match wins
//! outright; results are never merged across selectors, even when an
//! earlier selector matched nothing.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::detect::element_text;
use crate::error::{Result, ScrapeError};

/// Ordered selector table for one platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformProfile {
    pub product_name: Vec<String>,
    pub product_image: Vec<String>,
    pub product_price: Vec<String>,
    pub product_rating: Vec<String>,
    pub review_block: Vec<String>,
    pub review_rating: Vec<String>,
    pub review_text: Vec<String>,
    pub review_title: Vec<String>,
    pub reviewer_name: Vec<String>,
    pub review_date: Vec<String>,

    /// Selectors locating a "next page" control
    pub next_page: Vec<String>,
    /// Query parameter incremented when no next control is configured
    pub page_param: String,
    /// Path fragment marking a reviews-only URL (e.g. "/product-reviews/")
    pub reviews_path_marker: Option<String>,
    /// Template rebuilding the canonical product URL from the id that
    /// follows the marker; `{id}` is substituted
    pub product_url_template: Option<String>,
}

impl PlatformProfile {
    /// A profile must name at least one way to find review text, and every
    /// selector it carries must parse as CSS.
    pub fn validate(&self) -> Result<()> {
        if self.review_block.is_empty() && self.review_text.is_empty() {
            return Err(ScrapeError::MalformedProfile(
                "no reviewBlock or reviewText selectors".to_string(),
            ));
        }

        let fields: [(&str, &[String]); 11] = [
            ("productName", &self.product_name),
            ("productImage", &self.product_image),
            ("productPrice", &self.product_price),
            ("productRating", &self.product_rating),
            ("reviewBlock", &self.review_block),
            ("reviewRating", &self.review_rating),
            ("reviewText", &self.review_text),
            ("reviewTitle", &self.review_title),
            ("reviewerName", &self.reviewer_name),
            ("reviewDate", &self.review_date),
            ("nextPage", &self.next_page),
        ];
        for (field, selectors) in fields {
            for raw in selectors {
                if Selector::parse(raw).is_err() {
                    return Err(ScrapeError::MalformedProfile(format!(
                        "{}: unparsable selector '{}'",
                        field, raw
                    )));
                }
            }
        }
        Ok(())
    }

    /// Effective page query parameter
    pub fn page_param(&self) -> &str {
        if self.page_param.is_empty() {
            "page"
        } else {
            &self.page_param
        }
    }
}

fn parse_selector(raw: &str) -> Option<Selector> {
    Selector::parse(raw).ok()
}

/// First selector whose first match has non-empty text wins.
pub fn first_text(doc: &Html, selectors: &[String]) -> Option<String> {
    for raw in selectors {
        let Some(sel) = parse_selector(raw) else { continue };
        if let Some(el) = doc.select(&sel).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Same rule, scoped to one element subtree.
pub fn first_text_in(root: ElementRef, selectors: &[String]) -> Option<String> {
    for raw in selectors {
        let Some(sel) = parse_selector(raw) else { continue };
        if let Some(el) = root.select(&sel).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First selector whose first match carries one of the attributes wins.
pub fn first_attr(doc: &Html, selectors: &[String], attrs: &[&str]) -> Option<String> {
    for raw in selectors {
        let Some(sel) = parse_selector(raw) else { continue };
        if let Some(el) = doc.select(&sel).next() {
            for attr in attrs {
                if let Some(value) = el.value().attr(attr) {
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// First selector matching at least one element defines the whole set;
/// later selectors are never consulted once one has matched.
pub fn first_selection<'a>(doc: &'a Html, selectors: &[String]) -> Vec<ElementRef<'a>> {
    for raw in selectors {
        let Some(sel) = parse_selector(raw) else { continue };
        let matched: Vec<ElementRef<'a>> = doc.select(&sel).collect();
        if !matched.is_empty() {
            return matched;
        }
    }
    Vec::new()
}

/// Whether any of the selectors matches anything at all.
pub fn any_match(doc: &Html, selectors: &[String]) -> bool {
    selectors.iter().any(|raw| {
        parse_selector(raw)
            .map(|sel| doc.select(&sel).next().is_some())
            .unwrap_or(false)
    })
}
