//! Best-effort field inference for review fragments.
//!
//! Every function here resolves a miss to a default instead of failing, so
//! one missing field never sinks a whole record.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::detect::element_text;
use crate::record::{Rating, DEFAULT_AUTHOR};
use crate::sentiment::SentimentModel;

/// How many nearby elements to scan for author/date fragments
const SIBLING_LIMIT: usize = 5;

/// Sibling text longer than this is body copy, not a name or date
const SIBLING_MAX_LEN: usize = 50;

/// Explicit numeric rating shapes, tried in order. The star-symbol pattern
/// is last; its rating is the run length, not a captured number.
static RATING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\d+(?:\.\d+)?)\s*(?:out of|/)\s*5",
        r"(?i)(\d+)\s*star",
        r"(?i)rating:\s*(\d+)",
        r"★{1,5}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid rating pattern"))
    .collect()
});

static AUTHOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)by\s+([A-Za-z][A-Za-z\s]*)",
        r"(?i)reviewer:\s*([A-Za-z][A-Za-z\s]*)",
        r"(?i)customer:\s*([A-Za-z][A-Za-z\s]*)",
        r"(?i)user:\s*([A-Za-z][A-Za-z\s]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid author pattern"))
    .collect()
});

/// Numeric-separator and month-name date shapes
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b",
        r"(?i)\b(\d{1,2}\s+(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{2,4})\b",
        r"(?i)\b((?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+\d{1,2},?\s+\d{2,4})\b",
        r"\b(\d{2,4}-\d{1,2}-\d{1,2})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid date pattern"))
    .collect()
});

fn rating_from_patterns(text: &str) -> Option<Rating> {
    for pattern in RATING_PATTERNS.iter() {
        if let Some(m) = pattern.find(text) {
            if m.as_str().contains('★') {
                return Some(Rating::from_raw(m.as_str().chars().count() as f32));
            }
            if let Some(caps) = pattern.captures(text) {
                if let Ok(raw) = caps[1].parse::<f32>() {
                    return Some(Rating::from_raw(raw));
                }
            }
        }
    }
    None
}

/// Infer a rating from a fragment's text, its parent's text, or text
/// polarity as the last resort. Never fails.
pub fn infer_rating(
    text: &str,
    element: Option<ElementRef>,
    sentiment: &dyn SentimentModel,
) -> Rating {
    if let Some(rating) = rating_from_patterns(text) {
        return rating;
    }

    if let Some(parent) = element.and_then(|el| el.parent()).and_then(ElementRef::wrap) {
        let parent_text = element_text(parent);
        if let Some(rating) = rating_from_patterns(&parent_text) {
            return rating;
        }
    }

    // Polarity buckets onto the five-point scale
    let polarity = sentiment.polarity(text);
    let raw = if polarity > 0.3 {
        5.0
    } else if polarity > 0.1 {
        4.0
    } else if polarity > -0.1 {
        3.0
    } else if polarity > -0.3 {
        2.0
    } else {
        1.0
    };
    Rating::from_raw(raw)
}

/// Nearby short-text elements: the first few element children of the parent
fn short_siblings(element: ElementRef) -> Vec<String> {
    let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
        return Vec::new();
    };
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .take(SIBLING_LIMIT)
        .map(element_text)
        .filter(|t| !t.is_empty() && t.chars().count() < SIBLING_MAX_LEN)
        .collect()
}

fn author_from_patterns(text: &str) -> Option<String> {
    for pattern in AUTHOR_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let name = caps[1].trim().to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

/// Infer the reviewer name from the fragment or its nearby short-text
/// siblings. Defaults to `"Anonymous"`.
pub fn infer_author(text: &str, element: Option<ElementRef>) -> String {
    if let Some(author) = author_from_patterns(text) {
        return author;
    }

    if let Some(el) = element {
        for sibling in short_siblings(el) {
            if let Some(author) = author_from_patterns(&sibling) {
                return author;
            }
        }
    }

    DEFAULT_AUTHOR.to_string()
}

fn date_from_patterns(text: &str) -> Option<String> {
    for pattern in DATE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Infer a review date from the fragment or its nearby short-text siblings.
/// The first match is returned verbatim; no normalization is attempted.
pub fn infer_date(text: &str, element: Option<ElementRef>) -> Option<String> {
    if let Some(date) = date_from_patterns(text) {
        return Some(date);
    }

    element.and_then(|el| {
        short_siblings(el)
            .iter()
            .find_map(|sibling| date_from_patterns(sibling))
    })
}
