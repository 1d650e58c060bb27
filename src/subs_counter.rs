//! Reference-counted registry of subscription patterns.
//!
//! Answers "is anyone subscribed to exactly this pattern" without walking the
//! trie. Counts are per registration, so two handlers on `a/+` give a count
//! of two.

use std::collections::HashMap;

use arcstr::ArcStr;
use thiserror::Error;

/// Errors from counter bookkeeping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
	/// Decrement requested for a pattern whose count is already zero.
	///
	/// The counter is left unchanged.
	#[error("Subscription count for '{pattern}' would drop below zero")]
	Underflow {
		/// Pattern that was decremented
		pattern: String,
	},
}

/// Pattern → live subscription count
#[derive(Debug, Default, Clone)]
pub struct SubsCounter {
	counts: HashMap<ArcStr, usize>,
}

impl SubsCounter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Increments the count for `pattern`, returning the new count.
	pub fn increment(&mut self, pattern: impl Into<ArcStr>) -> usize {
		let count = self.counts.entry(pattern.into()).or_insert(0);
		*count += 1;
		*count
	}

	/// Decrements the count for `pattern`, returning the new count.
	///
	/// Rejects with [`CounterError::Underflow`] when the count is zero;
	/// entries reaching zero are forgotten.
	pub fn decrement(&mut self, pattern: &str) -> Result<usize, CounterError> {
		let Some(count) = self.counts.get_mut(pattern) else {
			return Err(CounterError::Underflow {
				pattern: pattern.to_string(),
			});
		};
		*count -= 1;
		let remaining = *count;
		if remaining == 0 {
			self.counts.remove(pattern);
		}
		Ok(remaining)
	}

	/// Live subscription count for `pattern`
	pub fn count(&self, pattern: &str) -> usize {
		self.counts.get(pattern).copied().unwrap_or(0)
	}

	/// True if at least one subscription is registered under `pattern`
	pub fn includes(&self, pattern: &str) -> bool {
		self.count(pattern) > 0
	}

	/// Patterns with a non-zero count
	pub fn patterns(&self) -> impl Iterator<Item = &ArcStr> {
		self.counts.keys()
	}

	/// Number of distinct live patterns
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	pub fn clear(&mut self) {
		self.counts.clear();
	}
}
