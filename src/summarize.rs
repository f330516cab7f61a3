//! Pros/cons summarization over extracted reviews.
//!
//! The core pipeline never depends on summarization succeeding; it is a
//! seam with one rule-based implementation. Reviews split into positive
//! (rating >= 4) and negative (rating <= 2) groups, then each group is
//! mined for recurring aspect phrases.

use crate::error::{Result, ScrapeError};
use crate::record::ReviewRecord;

/// At most this many entries per list
pub const MAX_POINTS: usize = 5;

/// A theme counts only when at least this many reviews mention it
const MIN_MENTIONS: usize = 2;

/// Condensed verdict over a review set
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReviewSummary {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Summarization seam. Implementations may fail; callers treat the summary
/// as optional decoration over the extraction result.
pub trait Summarizer {
    fn summarize(&self, reviews: &[ReviewRecord]) -> Result<ReviewSummary>;
}

/// One recognizable product aspect: trigger phrases plus the sentence
/// emitted when enough reviews hit a trigger.
struct Theme {
    phrases: &'static [&'static str],
    message: &'static str,
}

const POSITIVE_THEMES: &[Theme] = &[
    Theme {
        phrases: &["excellent quality", "good quality", "high quality", "premium quality"],
        message: "Customers praise the build quality and materials",
    },
    Theme {
        phrases: &["great performance", "excellent performance", "smooth performance"],
        message: "Users report smooth and reliable performance",
    },
    Theme {
        phrases: &["good value", "value for money", "worth the price", "affordable"],
        message: "Reviewers consider it good value for money",
    },
    Theme {
        phrases: &["beautiful design", "attractive design", "sleek design", "elegant"],
        message: "Many customers appreciate the design",
    },
    Theme {
        phrases: &["long battery", "excellent battery", "good battery life"],
        message: "Battery life receives positive feedback",
    },
    Theme {
        phrases: &["good camera", "excellent camera", "great photos", "clear pictures"],
        message: "Camera quality is well regarded",
    },
    Theme {
        phrases: &["fast", "quick", "responsive"],
        message: "Fast and responsive operation praised by users",
    },
    Theme {
        phrases: &["sturdy", "durable", "well built", "solid construction"],
        message: "Sturdy construction and durability noted by reviewers",
    },
];

const NEGATIVE_THEMES: &[Theme] = &[
    Theme {
        phrases: &["poor quality", "bad quality", "cheap quality", "low quality"],
        message: "Some customers report concerns about build quality",
    },
    Theme {
        phrases: &["poor performance", "slow performance", "laggy"],
        message: "Performance issues mentioned by several users",
    },
    Theme {
        phrases: &["poor battery", "battery drain", "short battery life"],
        message: "Battery life disappoints some customers",
    },
    Theme {
        phrases: &["poor camera", "bad camera", "blurry photos"],
        message: "Camera quality falls short of some expectations",
    },
    Theme {
        phrases: &["fragile", "flimsy", "breaks easily", "poor construction"],
        message: "Durability concerns raised by some reviewers",
    },
    Theme {
        phrases: &["overpriced", "too expensive", "not worth the price"],
        message: "Several reviewers find the price too high",
    },
    Theme {
        phrases: &["delayed delivery", "poor packaging", "damaged packaging"],
        message: "Delivery or packaging problems mentioned",
    },
    Theme {
        phrases: &["poor service", "bad customer service", "unhelpful support"],
        message: "Customer service complaints appear in reviews",
    },
];

const DEFAULT_PROS: &[&str] = &[
    "Customers generally satisfied with product quality",
    "Good value for money according to reviews",
    "Positive feedback on overall performance",
];

const DEFAULT_CONS: &[&str] = &[
    "Some customers experienced minor issues",
    "Delivery or packaging concerns mentioned",
    "Room for improvement in certain features",
];

/// Count themes, one hit per review, most-mentioned first. Ties break by
/// table order so output is deterministic.
fn common_themes(texts: &[&str], themes: &[Theme]) -> Vec<String> {
    let mut counts = vec![0usize; themes.len()];
    for text in texts {
        let lower = text.to_lowercase();
        for (i, theme) in themes.iter().enumerate() {
            if theme.phrases.iter().any(|p| lower.contains(p)) {
                counts[i] += 1;
            }
        }
    }

    let mut ranked: Vec<(usize, usize)> = counts
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, count)| *count >= MIN_MENTIONS)
        .map(|(i, count)| (count, i))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    ranked
        .into_iter()
        .take(MAX_POINTS)
        .map(|(_, i)| themes[i].message.to_string())
        .collect()
}

fn pad(mut points: Vec<String>, defaults: &[&str]) -> Vec<String> {
    for d in defaults {
        if points.len() >= 3 {
            break;
        }
        if !points.iter().any(|p| p == d) {
            points.push(d.to_string());
        }
    }
    points.truncate(MAX_POINTS);
    points
}

/// Rule-based summarizer over rating-split review groups
#[derive(Debug, Default)]
pub struct KeywordSummarizer;

impl Summarizer for KeywordSummarizer {
    fn summarize(&self, reviews: &[ReviewRecord]) -> Result<ReviewSummary> {
        if reviews.is_empty() {
            return Err(ScrapeError::SummaryError(
                "no reviews to summarize".to_string(),
            ));
        }

        let positive: Vec<&str> = reviews
            .iter()
            .filter(|r| r.rating.value() >= 4.0)
            .map(|r| r.text.as_str())
            .collect();
        let negative: Vec<&str> = reviews
            .iter()
            .filter(|r| r.rating.value() <= 2.0)
            .map(|r| r.text.as_str())
            .collect();

        Ok(ReviewSummary {
            pros: pad(common_themes(&positive, POSITIVE_THEMES), DEFAULT_PROS),
            cons: pad(common_themes(&negative, NEGATIVE_THEMES), DEFAULT_CONS),
        })
    }
}
