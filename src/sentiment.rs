//! Polarity classification used as the last-resort rating signal.
//!
//! Injected as a trait so tests can substitute a deterministic stub and
//! callers can plug in a heavier model without touching the inference code.

/// A sentiment classifier producing polarity in [-1, 1]
pub trait SentimentModel: Send + Sync {
    fn polarity(&self, text: &str) -> f32;
}

/// Word-list polarity: (positive hits - negative hits) / total hits
#[derive(Debug, Default)]
pub struct LexiconSentiment;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "love", "loved",
    "perfect", "best", "happy", "satisfied", "pleased", "recommend",
    "recommended", "quality", "worth", "fantastic", "wonderful", "nice",
    "fast", "durable", "comfortable", "beautiful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "terrible", "awful", "horrible", "hate", "hated",
    "worst", "disappointed", "disappointing", "unhappy", "frustrated",
    "waste", "broken", "defective", "refund", "avoid", "cheap", "useless",
    "slow", "fake", "damaged", "returned",
];

impl SentimentModel for LexiconSentiment {
    fn polarity(&self, text: &str) -> f32 {
        let mut positive = 0usize;
        let mut negative = 0usize;

        for token in text.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            let lower = token.to_lowercase();
            if POSITIVE_WORDS.contains(&lower.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&lower.as_str()) {
                negative += 1;
            }
        }

        let total = positive + negative;
        if total == 0 {
            return 0.0;
        }
        (positive as f32 - negative as f32) / total as f32
    }
}
