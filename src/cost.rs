//! Cost estimation for conversations.
//!
//! The estimator is pure: a set of turns and a model profile map to an
//! estimated USD cost with no side effects, so it can be unit tested
//! without network access. Token counts come from the `cl100k_base` BPE
//! vocabulary for every profile regardless of the actual model — a known
//! approximation, not a billing reconciliation.

use std::sync::OnceLock;

use tiktoken_rs::{CoreBPE, cl100k_base};

use crate::types::{ContentBlock, ModelProfile, Turn};

/// Flat per-image charge, expressed in token equivalents.
pub const IMAGE_TOKEN_EQUIVALENT: usize = 300;

/// Counts tokens in a piece of text.
///
/// The production counter is BPE-backed; tests may substitute a
/// deterministic counter with known outputs.
pub trait TokenCounter: Send + Sync {
    /// Returns the number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// The `cl100k_base` BPE counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cl100kCounter;

fn cl100k() -> &'static CoreBPE {
    static BPE: OnceLock<CoreBPE> = OnceLock::new();
    BPE.get_or_init(|| cl100k_base().expect("embedded cl100k_base vocabulary should load"))
}

impl TokenCounter for Cl100kCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        cl100k().encode_ordinary(text).len()
    }
}

/// Maps turns and a model profile to an estimated USD cost.
pub struct CostEstimator {
    counter: Box<dyn TokenCounter>,
}

impl CostEstimator {
    /// Creates an estimator backed by the `cl100k_base` counter.
    pub fn new() -> Self {
        Self {
            counter: Box::new(Cl100kCounter),
        }
    }

    /// Creates an estimator with a custom token counter.
    pub fn with_counter(counter: Box<dyn TokenCounter>) -> Self {
        Self { counter }
    }

    /// Counts tokens in a piece of text with this estimator's counter.
    pub fn count_text(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Estimates the cost of sending `turns` to the model described by
    /// `profile`.
    ///
    /// Text blocks charge `tokens * input_cost_per_mtok * 1e-6`; image
    /// blocks charge a flat [`IMAGE_TOKEN_EQUIVALENT`] tokens at the same
    /// rate. A profile with a zero multiplier estimates to 0.0.
    pub fn estimate<'a, I>(&self, turns: I, profile: &ModelProfile) -> f64
    where
        I: IntoIterator<Item = &'a Turn>,
    {
        let rate = profile.input_cost_per_mtok * 1e-6;
        let mut total = 0.0;
        for turn in turns {
            for block in &turn.content {
                match block {
                    ContentBlock::Text(text) => {
                        total += self.counter.count(&text.text) as f64 * rate;
                    }
                    ContentBlock::Image(_) => {
                        total += IMAGE_TOKEN_EQUIVALENT as f64 * rate;
                    }
                }
            }
        }
        total
    }

    /// Estimates the cost of a single turn.
    pub fn estimate_turn(&self, turn: &Turn, profile: &ModelProfile) -> f64 {
        self.estimate(std::iter::once(turn), profile)
    }
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a running cost as a dollar amount with five fractional digits,
/// e.g. `$0.00023`.
pub fn format_cost(cost: f64) -> String {
    format!("${cost:.5}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderKind;

    /// Counts whitespace-separated words; deterministic and obvious.
    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    fn profile(rate: f64) -> ModelProfile {
        ModelProfile::new("test-model", ProviderKind::OpenAi, rate)
    }

    #[test]
    fn golden_text_estimate() {
        let estimator = CostEstimator::with_counter(Box::new(WordCounter));
        let turns = vec![Turn::user_text("one two three four")];
        let cost = estimator.estimate(&turns, &profile(0.5));
        assert!((cost - 4.0 * 0.5e-6).abs() < 1e-15);
    }

    #[test]
    fn image_block_charges_flat_equivalent() {
        let estimator = CostEstimator::with_counter(Box::new(WordCounter));
        let turns = vec![Turn::user_image("data:image/jpeg;base64,AA==")];
        let cost = estimator.estimate(&turns, &profile(0.5));
        assert!((cost - 300.0 * 0.5e-6).abs() < 1e-15);
    }

    #[test]
    fn zero_multiplier_estimates_zero() {
        let estimator = CostEstimator::with_counter(Box::new(WordCounter));
        let turns = vec![Turn::user_text("anything at all")];
        assert_eq!(estimator.estimate(&turns, &profile(0.0)), 0.0);
    }

    #[test]
    fn estimator_is_deterministic() {
        let estimator = CostEstimator::new();
        let turns = vec![
            Turn::user_text("The quick brown fox jumps over the lazy dog."),
            Turn::user_image("https://example.com/fox.jpg"),
        ];
        let first = estimator.estimate(&turns, &profile(10.0));
        let second = estimator.estimate(&turns, &profile(10.0));
        assert_eq!(first, second);
        assert!(first > 0.0);
    }

    #[test]
    fn cl100k_counter_basics() {
        let counter = Cl100kCounter;
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("Hello") >= 1);
        assert_eq!(counter.count("Hello"), counter.count("Hello"));
        // Longer text never counts fewer tokens than a prefix of itself.
        assert!(counter.count("Hello, world! How are you?") > counter.count("Hello"));
    }

    #[test]
    fn cost_formatting() {
        assert_eq!(format_cost(0.0), "$0.00000");
        assert_eq!(format_cost(1.0e-4), "$0.00010");
        assert_eq!(format_cost(0.00023), "$0.00023");
        assert_eq!(format_cost(1.5), "$1.50000");
    }
}
