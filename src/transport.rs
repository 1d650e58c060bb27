//! The capability interface every transport implements.
//!
//! A transport is anything that can route published messages to subscribed
//! handlers: the in-process [`TrieTransport`], an adapter to an external
//! broker, or a decorator wrapping either of those. All of them implement
//! [`Transport`], so decorators compose around any of them.

use std::sync::Arc;

use async_trait::async_trait;
pub mod config;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod trie;

pub use config::{DuplicatePolicy, TransportSettings};
pub use error::TransportError;
pub use handler::{Handler, HandlerError, HandlerId};
pub use lifecycle::{
	Lifecycle, LifecycleState, TransportEvent, TransportEvents,
};
pub use trie::TrieTransport;

use crate::payload::{Payload, PublishOptions};
use crate::topic::TopicSyntax;

/// Publish/subscribe capability shared by all transports.
///
/// Validation failures are returned from the call that caused them.
/// Failures that happen while delivering a message (a handler error, an
/// undecodable payload) have no caller to return to and are sent as
/// [`TransportEvent::Error`] instead.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Separator and wildcard markers used by this transport
	fn syntax(&self) -> &TopicSyntax;

	/// Current lifecycle state
	fn state(&self) -> LifecycleState;

	/// Subscribes to lifecycle and delivery-error events
	fn events(&self) -> TransportEvents;

	/// Waits until the transport is ready, failing with the construction
	/// error or `Closed`.
	async fn ready(&self) -> Result<(), TransportError>;

	/// Registers `handler` for every topic matching `pattern`.
	async fn subscribe(
		&self,
		pattern: &str,
		handler: Handler,
	) -> Result<(), TransportError>;

	/// Removes one registration of `handler` under `pattern`. Unknown
	/// registrations are a no-op.
	async fn unsubscribe(
		&self,
		pattern: &str,
		handler: &Handler,
	) -> Result<(), TransportError>;

	/// Delivers `payload` to every handler whose pattern matches `topic`.
	async fn publish(
		&self,
		topic: &str,
		payload: Payload,
		options: PublishOptions,
	) -> Result<(), TransportError>;

	/// Releases all resources. Every later operation fails with `Closed`.
	async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
	fn syntax(&self) -> &TopicSyntax {
		(**self).syntax()
	}

	fn state(&self) -> LifecycleState {
		(**self).state()
	}

	fn events(&self) -> TransportEvents {
		(**self).events()
	}

	async fn ready(&self) -> Result<(), TransportError> {
		(**self).ready().await
	}

	async fn subscribe(
		&self,
		pattern: &str,
		handler: Handler,
	) -> Result<(), TransportError> {
		(**self).subscribe(pattern, handler).await
	}

	async fn unsubscribe(
		&self,
		pattern: &str,
		handler: &Handler,
	) -> Result<(), TransportError> {
		(**self).unsubscribe(pattern, handler).await
	}

	async fn publish(
		&self,
		topic: &str,
		payload: Payload,
		options: PublishOptions,
	) -> Result<(), TransportError> {
		(**self).publish(topic, payload, options).await
	}

	async fn close(&self) -> Result<(), TransportError> {
		(**self).close().await
	}
}
