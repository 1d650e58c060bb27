use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::codec::CodecError;
use crate::payload::Payload;

/// Failure returned by a handler during delivery.
///
/// Reported on the transport's error event; other handlers for the same
/// message are still invoked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
	/// Application handler failed
	#[error("{0}")]
	Failed(String),

	/// A decorator could not decode the payload; the message was dropped
	#[error("{0}")]
	Codec(#[from] CodecError),
}

impl HandlerError {
	/// Creates a new Failed error
	pub fn failed(reason: impl Into<String>) -> Self {
		Self::Failed(reason.into())
	}
}

/// Identity of a handler, shared by all its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl fmt::Display for HandlerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "HandlerId({})", self.0)
	}
}

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(0);

type Callback =
	dyn Fn(&str, &Payload) -> Result<(), HandlerError> + Send + Sync;

/// Message callback with an identity.
///
/// Unsubscribe matches on identity, so keep a clone of the handler you
/// subscribed with. Two handlers built from the same closure are distinct.
#[derive(Clone)]
pub struct Handler {
	id: HandlerId,
	callback: Arc<Callback>,
}

impl Handler {
	/// Wraps a fallible callback.
	pub fn new<F>(callback: F) -> Self
	where F: Fn(&str, &Payload) -> Result<(), HandlerError> + Send + Sync + 'static
	{
		Self {
			id: HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed)),
			callback: Arc::new(callback),
		}
	}

	/// Wraps a callback that cannot fail.
	pub fn infallible<F>(callback: F) -> Self
	where F: Fn(&str, &Payload) + Send + Sync + 'static {
		Self::new(move |topic, payload| {
			callback(topic, payload);
			Ok(())
		})
	}

	pub fn id(&self) -> HandlerId {
		self.id
	}

	/// Invokes the callback.
	pub fn call(&self, topic: &str, payload: &Payload) -> Result<(), HandlerError> {
		(self.callback)(topic, payload)
	}
}

impl PartialEq for Handler {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handler").field("id", &self.id).finish()
	}
}
