//! Token Estimation
//!
//! Character-ratio estimation used for every budget decision:
//! `tokens = ceil(chars / chars_per_token)`. Characters are Unicode scalar
//! values, never bytes.

use tracing::debug;

use crate::constants::evidence::DEFAULT_CHARS_PER_TOKEN;
use crate::types::{Result, SurfaceError};

/// Fixed-ratio token counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCounter {
    chars_per_token: usize,
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl TokenCounter {
    pub fn new(chars_per_token: usize) -> Result<Self> {
        if chars_per_token == 0 {
            return Err(SurfaceError::InvalidBudget(
                "chars_per_token must be greater than 0".to_string(),
            ));
        }
        Ok(Self { chars_per_token })
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }

    /// Estimate token count for a string
    pub fn count(&self, text: &str) -> usize {
        self.count_chars(text.chars().count())
    }

    pub fn count_chars(&self, chars: usize) -> usize {
        chars.div_ceil(self.chars_per_token)
    }

    /// Largest character count that still fits in `tokens`
    pub fn char_capacity(&self, tokens: usize) -> usize {
        tokens.saturating_mul(self.chars_per_token)
    }
}

/// Running token total against a hard ceiling
#[derive(Debug)]
pub struct TokenBudget {
    max_tokens: usize,
    current_tokens: usize,
}

impl TokenBudget {
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            current_tokens: 0,
        }
    }

    /// Add `tokens` if they fit; leaves the total untouched otherwise
    pub fn try_add(&mut self, tokens: usize) -> bool {
        if self.current_tokens + tokens <= self.max_tokens {
            self.current_tokens += tokens;
            debug!("Added {} tokens, total: {}/{}", tokens, self.current_tokens, self.max_tokens);
            true
        } else {
            debug!(
                "Cannot add {} tokens, would exceed budget: {}/{}",
                tokens,
                self.current_tokens + tokens,
                self.max_tokens
            );
            false
        }
    }

    pub fn current(&self) -> usize {
        self.current_tokens
    }

    pub fn remaining(&self) -> usize {
        self.max_tokens.saturating_sub(self.current_tokens)
    }

    pub fn max(&self) -> usize {
        self.max_tokens
    }

    /// Check if budget has room for minimum content size
    pub fn has_room(&self, min_tokens: usize) -> bool {
        self.remaining() >= min_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_rounds_up() {
        let counter = TokenCounter::default();
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("abc"), 1);
        assert_eq!(counter.count("abcd"), 1);
        assert_eq!(counter.count("abcde"), 2);
        assert_eq!(counter.count(&"x".repeat(1000)), 250);
    }

    #[test]
    fn test_count_uses_chars_not_bytes() {
        let counter = TokenCounter::new(2).unwrap();
        assert_eq!(counter.count("éééé"), 2);
    }

    #[test]
    fn test_zero_ratio_rejected() {
        assert!(matches!(TokenCounter::new(0), Err(SurfaceError::InvalidBudget(_))));
    }

    #[test]
    fn test_budget_tracking() {
        let mut budget = TokenBudget::new(100);
        assert!(budget.try_add(60));
        assert!(!budget.try_add(50));
        assert_eq!(budget.current(), 60);
        assert_eq!(budget.remaining(), 40);
        assert!(budget.has_room(40));
        assert!(!budget.has_room(41));
        assert!(budget.try_add(40));
        assert_eq!(budget.remaining(), 0);
    }
}
