//! Composite error type for the topic module
//!
//! Individual error types stay in their respective modules; this enum
//! aggregates them for callers that handle topic failures generically.

use thiserror::Error;

use super::topic_path::TopicNameError;
use super::topic_pattern_item::TopicPatternError;
use super::topic_syntax::TopicSyntaxError;

/// Comprehensive error type for all topic-related operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
	/// Subscription pattern parsing or validation error
	#[error("Topic pattern error: {0}")]
	Pattern(#[from] TopicPatternError),

	/// Concrete topic validation error
	#[error("Topic name error: {0}")]
	Name(#[from] TopicNameError),

	/// Inconsistent separator/marker configuration
	#[error("Topic syntax error: {0}")]
	Syntax(#[from] TopicSyntaxError),
}
