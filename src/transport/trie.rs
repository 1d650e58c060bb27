//! In-process transport backed by the topic trie.

use std::panic::{self, AssertUnwindSafe};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::config::{DuplicatePolicy, TransportSettings};
use super::error::TransportError;
use super::handler::{Handler, HandlerError};
use super::lifecycle::{
	Lifecycle, LifecycleState, TransportEvent, TransportEvents,
};
use super::Transport;
use crate::payload::{Payload, PublishOptions};
use crate::topic::{
	SubscriptionId, TopicPath, TopicPatternPath, TopicRouter, TopicSyntax,
};

/// In-process, zero-dependency transport.
///
/// Subscriptions live in a trie owned by this instance. Publish resolves the
/// matching handlers under the lock, releases it, then invokes them in
/// registration order, so handlers may freely subscribe or unsubscribe on the
/// same transport without affecting the delivery in progress.
#[derive(Debug)]
pub struct TrieTransport {
	settings: TransportSettings,
	router: Mutex<TopicRouter<Handler>>,
	lifecycle: Lifecycle,
}

impl Default for TrieTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl TrieTransport {
	/// Creates a ready transport with default settings.
	pub fn new() -> Self {
		Self::with_settings(TransportSettings::default())
	}

	/// Creates a ready transport with custom settings.
	pub fn with_settings(settings: TransportSettings) -> Self {
		let lifecycle = Lifecycle::new(settings.event_capacity);
		let transport = Self {
			settings,
			router: Mutex::new(TopicRouter::new()),
			lifecycle,
		};
		transport.lifecycle.mark_ready();
		transport
	}

	/// Live registrations under exactly `pattern`
	pub fn subscription_count(&self, pattern: &str) -> usize {
		self.router.lock().subscription_count(pattern)
	}

	/// True if anyone is registered under exactly `pattern`
	pub fn is_subscribed(&self, pattern: &str) -> bool {
		self.router.lock().is_subscribed(pattern)
	}

	/// Total live registrations
	pub fn len(&self) -> usize {
		self.router.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.router.lock().is_empty()
	}

	/// Number of trie nodes, including the root
	pub fn node_count(&self) -> usize {
		self.router.lock().node_count()
	}

	fn parse_pattern(
		&self,
		pattern: &str,
	) -> Result<TopicPatternPath, TransportError> {
		Ok(TopicPatternPath::new_from_string(pattern, &self.settings.syntax)?)
	}

	fn deliver(
		&self,
		topic: &TopicPath,
		payload: &Payload,
		handlers: &[(SubscriptionId, Handler)],
	) {
		for (id, handler) in handlers {
			let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
				handler.call(&topic.path, payload)
			}));
			let error = match outcome {
				| Ok(Ok(())) => continue,
				| Ok(Err(HandlerError::Codec(err))) => {
					TransportError::decode(topic.path.as_str(), err.to_string())
				}
				| Ok(Err(HandlerError::Failed(reason))) => {
					TransportError::handler(topic.path.as_str(), reason)
				}
				| Err(_) => {
					TransportError::handler(topic.path.as_str(), "handler panicked")
				}
			};
			debug!(subscription_id = %id, handler_id = %handler.id(), "Handler failed");
			self.lifecycle.report(error);
		}
	}
}

#[async_trait]
impl Transport for TrieTransport {
	fn syntax(&self) -> &TopicSyntax {
		&self.settings.syntax
	}

	fn state(&self) -> LifecycleState {
		self.lifecycle.state()
	}

	fn events(&self) -> TransportEvents {
		self.lifecycle.subscribe()
	}

	async fn ready(&self) -> Result<(), TransportError> {
		self.lifecycle.wait_ready().await
	}

	async fn subscribe(
		&self,
		pattern: &str,
		handler: Handler,
	) -> Result<(), TransportError> {
		self.lifecycle.ensure_open()?;
		let pattern = self.parse_pattern(pattern)?;

		let mut router = self.router.lock();
		if self.settings.duplicate_policy == DuplicatePolicy::Ignore
			&& router.contains(&pattern, |h| *h == handler)
		{
			debug!(pattern = %pattern, handler_id = %handler.id(), "Duplicate subscription ignored");
			return Ok(());
		}
		router.add_subscription(&pattern, handler);
		Ok(())
	}

	async fn unsubscribe(
		&self,
		pattern: &str,
		handler: &Handler,
	) -> Result<(), TransportError> {
		self.lifecycle.ensure_open()?;
		let pattern = self.parse_pattern(pattern)?;

		let removed = self
			.router
			.lock()
			.remove_subscription(&pattern, |h| h == handler)?;
		if removed.is_none() {
			debug!(pattern = %pattern, handler_id = %handler.id(), "Unsubscribe for unknown registration");
		}
		Ok(())
	}

	async fn publish(
		&self,
		topic: &str,
		payload: Payload,
		options: PublishOptions,
	) -> Result<(), TransportError> {
		self.lifecycle.ensure_open()?;
		let topic = TopicPath::new(topic, &self.settings.syntax)?;

		let handlers: Vec<(SubscriptionId, Handler)> = self
			.router
			.lock()
			.get_subscribers(&topic)
			.into_iter()
			.map(|(id, handler)| (id, handler.clone()))
			.collect();
		trace!(topic = %topic, matches = handlers.len(), qos = ?options.qos, "Publishing");

		self.deliver(&topic, &payload, &handlers);
		Ok(())
	}

	async fn close(&self) -> Result<(), TransportError> {
		self.lifecycle.begin_close()?;
		self.router.lock().cleanup();
		self.lifecycle.finish_close();
		Ok(())
	}
}
