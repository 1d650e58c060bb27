//! Settings shared by every transport implementation

use serde::{Deserialize, Serialize};

use crate::topic::TopicSyntax;

/// What to do when the same handler subscribes twice to the same pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
	/// Every registration is independent and fires once per matching publish
	#[default]
	Allow,
	/// A second identical `(pattern, handler)` registration is a no-op
	Ignore,
}

/// Transport-level behavior settings
#[derive(Debug, Clone)]
pub struct TransportSettings {
	/// Separator and wildcard markers
	pub syntax: TopicSyntax,
	/// Duplicate `(pattern, handler)` handling
	pub duplicate_policy: DuplicatePolicy,
	/// Capacity of the lifecycle/error event channel (must be > 0)
	pub event_capacity: usize,
}

impl Default for TransportSettings {
	fn default() -> Self {
		Self {
			syntax: TopicSyntax::default(),
			duplicate_policy: DuplicatePolicy::Allow,
			event_capacity: 64,
		}
	}
}

impl TransportSettings {
	pub fn with_syntax(mut self, syntax: TopicSyntax) -> Self {
		self.syntax = syntax;
		self
	}

	pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
		self.duplicate_policy = policy;
		self
	}
}
