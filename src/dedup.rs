//! Near-duplicate suppression over a ranked candidate list.
//!
//! Sites repeat review text in summaries, tooltips, and nested wrappers;
//! scoring alone cannot tell those apart. Two candidates whose lowercase
//! text similarity exceeds the configured ratio are duplicates, and the
//! lower-ranked one is dropped.

use similar::TextDiff;

use crate::detect::{Candidate, DetectorConfig};

/// Character-level similarity ratio of two strings in [0, 1]
pub fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// Single forward pass over a ranked list: drop candidates shorter than the
/// minimum length, drop near-duplicates of already-accepted text, stop at
/// the output cap. Rank order is preserved.
pub fn filter_candidates<'a>(
    ranked: Vec<Candidate<'a>>,
    cfg: &DetectorConfig,
) -> Vec<Candidate<'a>> {
    let mut accepted: Vec<Candidate<'a>> = Vec::new();
    let mut seen_texts: Vec<String> = Vec::new();

    for candidate in ranked {
        if candidate.text.chars().count() < cfg.min_text_len {
            continue;
        }

        let lower = candidate.text.to_lowercase();
        let duplicate = seen_texts
            .iter()
            .any(|seen| similarity(&lower, seen) > cfg.similarity_threshold);
        if duplicate {
            continue;
        }

        seen_texts.push(lower);
        accepted.push(candidate);

        if accepted.len() >= cfg.max_candidates {
            break;
        }
    }

    accepted
}
