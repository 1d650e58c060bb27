//! Subscription pattern segment types

use arcstr::Substr;
use thiserror::Error;

use super::topic_syntax::TopicSyntax;

/// Error types for subscription pattern parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicPatternError {
	/// Multi-level wildcard used anywhere but the last segment
	#[error(
		"Invalid topic pattern '{pattern}': multi-level wildcard can only be \
		 the last segment"
	)]
	HashPosition {
		/// The invalid pattern
		pattern: String,
	},

	/// Pattern contains an empty segment (leading, trailing or doubled
	/// separator)
	#[error("Invalid topic pattern '{pattern}': empty segment at position {position}")]
	EmptySegment {
		/// The invalid pattern
		pattern: String,
		/// Zero-based segment index
		position: usize,
	},

	/// Wildcard marker embedded inside a literal segment, e.g. `a+`
	#[error("Invalid wildcard usage in segment '{segment}'")]
	WildcardUsage {
		/// The offending segment
		segment: String,
	},
}

impl TopicPatternError {
	/// Creates a new HashPosition error
	pub fn hash_position(pattern: impl Into<String>) -> Self {
		Self::HashPosition {
			pattern: pattern.into(),
		}
	}

	/// Creates a new EmptySegment error
	pub fn empty_segment(pattern: impl Into<String>, position: usize) -> Self {
		Self::EmptySegment {
			pattern: pattern.into(),
			position,
		}
	}

	/// Creates a new WildcardUsage error
	pub fn wildcard_usage(segment: impl Into<String>) -> Self {
		Self::WildcardUsage {
			segment: segment.into(),
		}
	}
}

/// Pattern segment: literal string or wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPatternItem {
	/// Literal string segment
	Str(Substr),
	/// Single-level wildcard, matches exactly one segment
	Plus,
	/// Multi-level wildcard, matches zero or more trailing segments
	Hash,
}

impl TopicPatternItem {
	/// Parses one segment under the given syntax.
	///
	/// `pattern` and `position` are only used to build the error.
	pub fn parse(
		segment: Substr,
		syntax: &TopicSyntax,
		pattern: &str,
		position: usize,
	) -> Result<Self, TopicPatternError> {
		let res = match segment.as_str() {
			| "" => {
				return Err(TopicPatternError::empty_segment(pattern, position));
			}
			| s if s == syntax.single_level() => TopicPatternItem::Plus,
			| s if s == syntax.multi_level() => TopicPatternItem::Hash,
			| s if syntax.contains_marker(s) => {
				return Err(TopicPatternError::wildcard_usage(s));
			}
			| _ => TopicPatternItem::Str(segment),
		};
		Ok(res)
	}

	/// Returns true if this item is a wildcard.
	pub fn is_wildcard(&self) -> bool {
		matches!(self, TopicPatternItem::Plus | TopicPatternItem::Hash)
	}
}
