//! Namespacing decorator: every topic and pattern is moved under a fixed
//! prefix on the way in, and the prefix is stripped again on delivery.

use arcstr::ArcStr;
use async_trait::async_trait;
use tracing::{debug, trace};

use super::WrapperTable;
use crate::payload::{Payload, PublishOptions};
use crate::topic::{TopicPath, TopicSyntax};
use crate::transport::{
	Handler, LifecycleState, Transport, TransportError, TransportEvents,
};

/// Moves all traffic of the wrapped transport under `prefix`.
///
/// Several prefix decorators can share one inner transport; each only sees
/// messages published under its own prefix.
#[derive(Debug)]
pub struct PrefixTransport<T> {
	inner: T,
	prefix: ArcStr,
	wrappers: WrapperTable,
}

impl<T: Transport> PrefixTransport<T> {
	/// Wraps `inner` under `prefix`, a concrete topic of one or more
	/// segments in the inner transport's syntax.
	pub fn new(
		prefix: impl Into<ArcStr>,
		inner: T,
	) -> Result<Self, TransportError> {
		let prefix = TopicPath::new(prefix, inner.syntax())?;
		if prefix.is_empty() {
			return Err(TransportError::InvalidOptions(
				"prefix needs at least one segment".to_string(),
			));
		}
		Ok(Self {
			inner,
			prefix: prefix.path(),
			wrappers: WrapperTable::default(),
		})
	}

	/// Builds the prefix from individual segments.
	pub fn from_segments<I, S>(segments: I, inner: T) -> Result<Self, TransportError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let prefix = inner.syntax().join(segments);
		Self::new(prefix, inner)
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn inner(&self) -> &T {
		&self.inner
	}

	fn prefixed(&self, path: &str) -> ArcStr {
		prefixed(&self.prefix, self.inner.syntax(), path)
	}
}

fn prefixed(prefix: &str, syntax: &TopicSyntax, path: &str) -> ArcStr {
	if path.is_empty() {
		ArcStr::from(prefix)
	} else {
		ArcStr::from(format!("{prefix}{}{path}", syntax.separator()))
	}
}

/// Strips `prefix` and the following separator from `topic`.
///
/// Returns `None` when `topic` lies outside the prefix namespace.
fn strip_prefix<'a>(prefix: &str, separator: char, topic: &'a str) -> Option<&'a str> {
	let rest = topic.strip_prefix(prefix)?;
	if rest.is_empty() {
		return Some(rest);
	}
	rest.strip_prefix(separator)
}

#[async_trait]
impl<T: Transport> Transport for PrefixTransport<T> {
	fn syntax(&self) -> &TopicSyntax {
		self.inner.syntax()
	}

	fn state(&self) -> LifecycleState {
		self.inner.state()
	}

	fn events(&self) -> TransportEvents {
		self.inner.events()
	}

	async fn ready(&self) -> Result<(), TransportError> {
		self.inner.ready().await
	}

	async fn subscribe(
		&self,
		pattern: &str,
		handler: Handler,
	) -> Result<(), TransportError> {
		let full = self.prefixed(pattern);
		let wrapper = match self.wrappers.get(&full, handler.id()) {
			| Some(existing) => existing,
			| None => {
				let prefix = self.prefix.clone();
				let separator = self.inner.syntax().separator();
				let caller = handler.clone();
				Handler::new(move |topic, payload| {
					match strip_prefix(&prefix, separator, topic) {
						| Some(rest) => caller.call(rest, payload),
						| None => {
							trace!(topic, prefix = %prefix, "Dropping message outside prefix");
							Ok(())
						}
					}
				})
			}
		};

		// recorded before awaiting so a concurrent unsubscribe finds it
		self.wrappers.insert(full.clone(), handler.id(), wrapper.clone());
		if let Err(err) = self.inner.subscribe(&full, wrapper).await {
			self.wrappers.take(&full, handler.id());
			return Err(err);
		}
		debug!(pattern = %full, handler_id = %handler.id(), "Prefixed subscription added");
		Ok(())
	}

	async fn unsubscribe(
		&self,
		pattern: &str,
		handler: &Handler,
	) -> Result<(), TransportError> {
		let full = self.prefixed(pattern);
		let Some(wrapper) = self.wrappers.take(&full, handler.id()) else {
			// never registered through us; let the inner transport validate
			// and no-op
			return self.inner.unsubscribe(&full, handler).await;
		};

		if let Err(err) = self.inner.unsubscribe(&full, &wrapper).await {
			self.wrappers.insert(full, handler.id(), wrapper);
			return Err(err);
		}
		Ok(())
	}

	async fn publish(
		&self,
		topic: &str,
		payload: Payload,
		options: PublishOptions,
	) -> Result<(), TransportError> {
		self.inner
			.publish(&self.prefixed(topic), payload, options)
			.await
	}

	async fn close(&self) -> Result<(), TransportError> {
		self.wrappers.clear();
		self.inner.close().await
	}
}
