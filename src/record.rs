//! Output records handed to the caller.
//!
//! These are the only values that outlive an extraction call. Everything
//! else (parsed documents, candidate lists) is scoped to the call itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder used when no product image can be located
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x300?text=No+Image";

/// Fallback product name when nothing on the page identifies it
pub const DEFAULT_PRODUCT_NAME: &str = "Product";

/// Author used when no reviewer name can be inferred
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Rating assigned to known-site reviews that carry no rating signal at all
pub const DEFAULT_RATING: f32 = 3.0;

/// A review rating, clamped to [1, 5] at construction.
///
/// Raw values above 5 are assumed to be on a 10-point scale and halved.
/// That assumption can misfire on genuinely out-of-range 5-point values;
/// callers who know better can disable it via [`Rating::from_raw_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(f32);

impl Rating {
    /// Build a rating from a raw scraped value, applying the 10-scale
    /// halving assumption for values above 5.
    pub fn from_raw(raw: f32) -> Self {
        Self::from_raw_with(raw, true)
    }

    /// Build a rating, optionally halving values above 5.
    pub fn from_raw_with(raw: f32, ten_scale_halving: bool) -> Self {
        let adjusted = if ten_scale_halving && raw > 5.0 {
            raw / 2.0
        } else {
            raw
        };
        Rating(adjusted.clamp(1.0, 5.0))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

/// One extracted review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Trimmed, non-empty review body
    pub text: String,
    /// Rating in [1, 5]
    pub rating: Rating,
    /// Review headline, if the site exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Reviewer name, `"Anonymous"` when unknown
    pub author: String,
    /// Free-form date string exactly as it appeared on the page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Review-likeness score (generic detection path only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
}

impl ReviewRecord {
    /// Build a record if the trimmed text exceeds `min_len` characters.
    /// Rating defaults until a caller infers or overrides it.
    pub fn new(text: &str, min_len: usize) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.chars().count() <= min_len {
            return None;
        }
        Some(ReviewRecord {
            text: trimmed.to_string(),
            rating: Rating::from_raw(DEFAULT_RATING),
            title: None,
            author: DEFAULT_AUTHOR.to_string(),
            date: None,
            score: None,
        })
    }
}

/// Product metadata extracted alongside the reviews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub image_url: String,
    /// Numeric price string with separators stripped (e.g. "1499.00")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Aggregate product rating in [0, 5]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    pub source_url: String,
}

impl ProductRecord {
    /// A never-incomplete fallback record for when extraction finds nothing
    pub fn fallback(url: &str) -> Self {
        ProductRecord {
            name: DEFAULT_PRODUCT_NAME.to_string(),
            image_url: PLACEHOLDER_IMAGE.to_string(),
            price: None,
            rating: None,
            source_url: url.to_string(),
        }
    }
}

/// Clamp an aggregate product rating to [0, 5], halving 10-scale values.
pub fn clamp_product_rating(raw: f32, ten_scale_halving: bool) -> f32 {
    let adjusted = if ten_scale_halving && raw > 5.0 {
        raw / 2.0
    } else {
        raw
    };
    adjusted.clamp(0.0, 5.0)
}

/// The durable output of one extraction call
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    pub product: ProductRecord,
    pub reviews: Vec<ReviewRecord>,
    pub scraped_at: DateTime<Utc>,
    /// Pages actually fetched (1 unless pagination ran)
    pub pages_fetched: usize,
}
