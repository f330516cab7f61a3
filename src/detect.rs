//! Generic review detection: score arbitrary DOM fragments for
//! review-likeness and return a ranked candidate list.
//!
//! No single markup cue is reliable across unrelated sites, so the score
//! adds independent signals: text length, topical vocabulary, class/id
//! naming, explicit rating markers, and stock review phrasing. Detection is
//! a pure function of the document and the pattern tables; re-running it on
//! the same document yields the same ranked list.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::dedup;

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    /// Matched a profile selector (known-site path)
    SelectorMatch,
    /// Passed the heuristic scorer (generic path)
    Heuristic,
}

/// A DOM fragment provisionally identified as review content.
/// Borrows from the parsed document and never outlives the extraction pass.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub element: ElementRef<'a>,
    pub text: String,
    pub score: i32,
    pub origin: CandidateOrigin,
}

/// Detection thresholds.
///
/// The defaults (15 / 0.8 / 50 / 20) come straight from observed behavior
/// on real pages and have never been tuned systematically; treat them as
/// adjustable rather than authoritative.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Minimum additive score for a fragment to become a candidate
    pub score_threshold: i32,
    /// Lowercase-text similarity above which two candidates are duplicates
    pub similarity_threshold: f32,
    /// Maximum candidates surviving deduplication
    pub max_candidates: usize,
    /// Candidates shorter than this are dropped outright
    pub min_text_len: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            score_threshold: 15,
            similarity_threshold: 0.8,
            max_candidates: 50,
            min_text_len: 20,
        }
    }
}

/// Topical vocabulary, +3 per match
static TOPIC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(review|rating|star|customer|buyer|user|feedback|opinion|experience)\b",
        r"(?i)\b(good|bad|excellent|poor|amazing|terrible|love|hate|recommend|avoid)\b",
        r"(?i)\b(quality|price|value|delivery|service|product|item)\b",
        r"(?i)\b(satisfied|disappointed|happy|unhappy|pleased|frustrated)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid topic pattern"))
    .collect()
});

/// Explicit rating marker ("4 out of 5", "3 stars", "4/5"), +8
static RATING_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[1-5]\s*(star|out of|/5)\b").expect("invalid rating marker regex"));

/// Class-name tokens that indicate review content, +5
const CLASS_KEYWORDS: &[&str] = &[
    "review", "rating", "comment", "feedback", "testimonial", "customer",
    "user", "buyer", "opinion", "experience",
];

/// Element id substrings that indicate review content, +5
const ID_KEYWORDS: &[&str] = &["review", "rating", "comment", "feedback"];

/// Canonical review phrasing, +4 each
const REVIEW_PHRASES: &[&str] = &[
    "i bought",
    "purchased",
    "received",
    "delivery",
    "shipping",
    "would recommend",
    "not recommend",
    "satisfied",
    "disappointed",
    "good quality",
    "poor quality",
    "value for money",
    "waste of money",
];

/// Element types worth scoring at all
static SCORABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, p, span, article, section, li").expect("invalid scorable selector"));

/// Whole-element text with per-node trimming and single-space joins
pub fn element_text(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Additive review-likeness score for one element
pub fn score_element(el: ElementRef, text: &str) -> i32 {
    let mut score = 0i32;
    let lower = text.to_lowercase();
    let len = lower.chars().count();

    // Reviews are usually 20-2000 characters
    if (20..=2000).contains(&len) {
        score += 10;
    } else if (10..20).contains(&len) {
        score += 5;
    } else if len > 2000 {
        score -= 5;
    } else {
        score -= 10;
    }

    for pattern in TOPIC_PATTERNS.iter() {
        score += pattern.find_iter(&lower).count() as i32 * 3;
    }

    for class in el.value().classes() {
        if CLASS_KEYWORDS.iter().any(|kw| class.to_lowercase().contains(kw)) {
            score += 5;
        }
    }

    if let Some(id) = el.value().attr("id") {
        let id_lower = id.to_lowercase();
        if ID_KEYWORDS.iter().any(|kw| id_lower.contains(kw)) {
            score += 5;
        }
    }

    if RATING_MARKER_RE.is_match(&lower) || lower.contains('★') {
        score += 8;
    }

    for phrase in REVIEW_PHRASES {
        if lower.contains(phrase) {
            score += 4;
        }
    }

    score
}

/// Find review-like fragments and return them ranked by descending score,
/// deduplicated and capped per `cfg`.
pub fn detect<'a>(doc: &'a Html, cfg: &DetectorConfig) -> Vec<Candidate<'a>> {
    let mut candidates: Vec<Candidate<'a>> = Vec::new();

    for el in doc.select(&SCORABLE) {
        let text = element_text(el);
        let score = score_element(el, &text);
        if score >= cfg.score_threshold {
            candidates.push(Candidate {
                element: el,
                text,
                score,
                origin: CandidateOrigin::Heuristic,
            });
        }
    }

    // Stable sort keeps document order for equal scores, so the ranking
    // is deterministic for an unchanged document.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    dedup::filter_candidates(candidates, cfg)
}
