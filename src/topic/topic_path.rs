use std::fmt;

use arcstr::{ArcStr, Substr};
use smallvec::SmallVec;
use thiserror::Error;

use super::topic_syntax::TopicSyntax;

/// Errors for concrete (publish-side) topics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicNameError {
	/// Topic contains a wildcard marker; topics must be concrete
	#[error("Topic '{topic}' contains a wildcard in segment '{segment}'")]
	ContainsWildcard {
		/// The invalid topic
		topic: String,
		/// The offending segment
		segment: String,
	},

	/// Topic contains an empty segment
	#[error("Topic '{topic}' has an empty segment at position {position}")]
	EmptySegment {
		/// The invalid topic
		topic: String,
		/// Zero-based segment index
		position: usize,
	},
}

/// A concrete topic split into segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPath {
	pub path: ArcStr,
	pub segments: SmallVec<[Substr; 8]>,
}

impl TopicPath {
	/// Parses and validates a concrete topic under `syntax`.
	pub fn new(
		path: impl Into<ArcStr>,
		syntax: &TopicSyntax,
	) -> Result<Self, TopicNameError> {
		let path = path.into();
		let mut segments = SmallVec::new();

		for (position, segment) in syntax.split(&path).enumerate() {
			if segment.is_empty() {
				return Err(TopicNameError::EmptySegment {
					topic: path.to_string(),
					position,
				});
			}
			if syntax.contains_marker(segment) {
				return Err(TopicNameError::ContainsWildcard {
					topic: path.to_string(),
					segment: segment.to_string(),
				});
			}
			segments.push(path.substr_from(segment));
		}

		Ok(Self { path, segments })
	}

	pub fn path(&self) -> ArcStr {
		self.path.clone()
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}
}

impl fmt::Display for TopicPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.path)
	}
}
