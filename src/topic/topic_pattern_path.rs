use std::fmt::{self, Display};
use std::slice::Iter;

use arcstr::ArcStr;
use smallvec::SmallVec;

use super::topic_pattern_item::{TopicPatternError, TopicPatternItem};
use super::topic_syntax::TopicSyntax;

/// Parsed subscription pattern with wildcard support
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPatternPath {
	pattern: ArcStr,
	segments: SmallVec<[TopicPatternItem; 8]>,
}

impl TopicPatternPath {
	/// Parses a pattern under `syntax`.
	///
	/// The empty string is a valid pattern with zero segments and matches
	/// only the empty topic.
	pub fn new_from_string(
		pattern: impl Into<ArcStr>,
		syntax: &TopicSyntax,
	) -> Result<Self, TopicPatternError> {
		let pattern = pattern.into();

		let segments = syntax
			.split(&pattern)
			.enumerate()
			.map(|(position, s)| {
				TopicPatternItem::parse(
					pattern.substr_from(s),
					syntax,
					&pattern,
					position,
				)
			})
			.collect::<Result<SmallVec<[_; 8]>, _>>()?;

		if let Some(hash_pos) = segments
			.iter()
			.position(|s| matches!(*s, TopicPatternItem::Hash))
		{
			if hash_pos != segments.len() - 1 {
				return Err(TopicPatternError::hash_position(pattern.as_str()));
			}
		}

		Ok(Self { pattern, segments })
	}

	/// Returns the pattern as it was given.
	pub fn pattern(&self) -> &ArcStr {
		&self.pattern
	}

	/// Returns true if pattern has no segments.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Returns true if the pattern ends with a multi-level wildcard.
	pub fn contains_hash(&self) -> bool {
		self.segments
			.last()
			.is_some_and(|s| matches!(s, TopicPatternItem::Hash))
	}

	/// Returns true if any segment is a wildcard.
	pub fn has_wildcards(&self) -> bool {
		self.segments.iter().any(TopicPatternItem::is_wildcard)
	}

	/// Returns iterator over pattern segments.
	pub fn iter(&self) -> Iter<'_, TopicPatternItem> {
		self.segments.iter()
	}

	/// Returns number of segments in pattern.
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	/// Returns pattern segments as slice.
	pub fn slice(&self) -> &[TopicPatternItem] {
		&self.segments
	}
}

impl Display for TopicPatternPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}
