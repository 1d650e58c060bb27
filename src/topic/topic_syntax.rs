//! Topic syntax: the separator and wildcard markers in effect for a transport

use arcstr::ArcStr;
use thiserror::Error;

/// Errors raised when a custom [`TopicSyntax`] is inconsistent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicSyntaxError {
	/// A wildcard marker was configured as an empty string
	#[error("Wildcard marker cannot be empty")]
	EmptyMarker,

	/// Both wildcards use the same marker
	#[error("Single-level and multi-level markers must differ, both are '{0}'")]
	AmbiguousMarkers(ArcStr),

	/// A marker contains the separator and could never form a segment
	#[error("Marker '{marker}' contains the separator '{separator}'")]
	MarkerContainsSeparator {
		/// The offending marker
		marker: ArcStr,
		/// The configured separator
		separator: char,
	},
}

/// Separator and wildcard markers used to split topics and patterns.
///
/// Defaults to the MQTT conventions: `/` between segments, `+` for a
/// single-level wildcard and `#` for a multi-level wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSyntax {
	separator: char,
	single_level: ArcStr,
	multi_level: ArcStr,
}

impl Default for TopicSyntax {
	fn default() -> Self {
		Self {
			separator: '/',
			single_level: arcstr::literal!("+"),
			multi_level: arcstr::literal!("#"),
		}
	}
}

impl TopicSyntax {
	/// Creates a syntax with custom separator and markers.
	pub fn new(
		separator: char,
		single_level: impl Into<ArcStr>,
		multi_level: impl Into<ArcStr>,
	) -> Result<Self, TopicSyntaxError> {
		let single_level = single_level.into();
		let multi_level = multi_level.into();

		for marker in [&single_level, &multi_level] {
			if marker.is_empty() {
				return Err(TopicSyntaxError::EmptyMarker);
			}
			if marker.contains(separator) {
				return Err(TopicSyntaxError::MarkerContainsSeparator {
					marker: marker.clone(),
					separator,
				});
			}
		}
		if single_level == multi_level {
			return Err(TopicSyntaxError::AmbiguousMarkers(single_level));
		}

		Ok(Self {
			separator,
			single_level,
			multi_level,
		})
	}

	/// Segment separator
	pub fn separator(&self) -> char {
		self.separator
	}

	/// Single-level wildcard marker
	pub fn single_level(&self) -> &str {
		&self.single_level
	}

	/// Multi-level wildcard marker
	pub fn multi_level(&self) -> &str {
		&self.multi_level
	}

	/// Returns true if `segment` contains either wildcard marker anywhere.
	pub fn contains_marker(&self, segment: &str) -> bool {
		segment.contains(self.single_level.as_str())
			|| segment.contains(self.multi_level.as_str())
	}

	/// Splits a topic or pattern into segments.
	///
	/// The empty string has zero segments.
	pub fn split<'a>(&self, path: &'a str) -> impl Iterator<Item = &'a str> {
		let separator = self.separator;
		// `split` on "" yields one empty item, which would read as an empty
		// segment instead of an empty topic
		(!path.is_empty())
			.then(move || path.split(separator))
			.into_iter()
			.flatten()
	}

	/// Joins segments back into a single path.
	pub fn join<I, S>(&self, segments: I) -> String
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut out = String::new();
		for (i, segment) in segments.into_iter().enumerate() {
			if i > 0 {
				out.push(self.separator);
			}
			out.push_str(segment.as_ref());
		}
		out
	}
}
