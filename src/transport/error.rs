use thiserror::Error;

use crate::subs_counter::CounterError;
use crate::topic::{TopicNameError, TopicPatternError, TopicSyntaxError};

/// Errors surfaced by [`Transport`](super::Transport) operations and by the
/// error event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
	/// Malformed subscription pattern
	#[error("Invalid pattern: {0}")]
	InvalidPattern(#[from] TopicPatternError),

	/// Malformed or non-concrete publish topic
	#[error("Invalid topic: {0}")]
	InvalidTopic(#[from] TopicNameError),

	/// Inconsistent topic syntax configuration
	#[error("Invalid topic syntax: {0}")]
	InvalidSyntax(#[from] TopicSyntaxError),

	/// Payload serialization failed; the message was not forwarded
	#[error("Encode error: {0}")]
	Encode(String),

	/// Inbound payload could not be deserialized; the message was dropped
	#[error("Decode error on '{topic}': {reason}")]
	Decode {
		/// Topic the message was delivered on
		topic: String,
		/// Codec failure description
		reason: String,
	},

	/// Operation issued after close began
	#[error("Transport is closed")]
	Closed,

	/// Operation issued before the transport became ready
	#[error("Transport is not ready")]
	NotReady,

	/// Subscription counter bookkeeping failed
	#[error("Counter error: {0}")]
	Underflow(#[from] CounterError),

	/// A handler failed while a message was being delivered
	#[error("Handler failed on '{topic}': {reason}")]
	Handler {
		/// Topic the message was delivered on
		topic: String,
		/// Failure description
		reason: String,
	},

	/// Transport construction failed; the transport never became ready
	#[error("Transport construction failed: {0}")]
	ConstructionFailed(String),

	/// Failure reported by an external transport adapter
	#[error("Adapter error: {0}")]
	Adapter(String),

	/// No factory is registered under the requested transport tag
	#[error("Unknown transport '{0}'")]
	UnknownTransport(String),

	/// Composition options could not be parsed
	#[error("Invalid options: {0}")]
	InvalidOptions(String),
}

impl TransportError {
	/// Creates a new Handler error
	pub fn handler(topic: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Handler {
			topic: topic.into(),
			reason: reason.into(),
		}
	}

	/// Creates a new Decode error
	pub fn decode(topic: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Decode {
			topic: topic.into(),
			reason: reason.into(),
		}
	}
}
