//! Payload-encoding decorator.

use std::sync::Arc;

use arcstr::ArcStr;
use async_trait::async_trait;
use tracing::debug;

use super::WrapperTable;
use crate::codec::{CodecError, JsonCodec, PayloadCodec};
use crate::payload::{Payload, PublishOptions};
use crate::topic::TopicSyntax;
use crate::transport::{
	Handler, LifecycleState, Transport, TransportError, TransportEvents,
};

/// Encodes payloads with `C` before publishing and decodes them before
/// handlers see them.
///
/// Handlers registered through this decorator always receive
/// [`Payload::Value`]. A message that fails to decode is dropped and reported
/// as a decode error on the transport's error event.
#[derive(Debug)]
pub struct CodecTransport<T, C = JsonCodec> {
	inner: T,
	codec: Arc<C>,
	wrappers: WrapperTable,
}

impl<T: Transport> CodecTransport<T, JsonCodec> {
	/// Wraps `inner` with the default JSON codec.
	pub fn json(inner: T) -> Self {
		Self::new(inner, JsonCodec::new())
	}
}

impl<T: Transport, C: PayloadCodec> CodecTransport<T, C> {
	pub fn new(inner: T, codec: C) -> Self {
		Self {
			inner,
			codec: Arc::new(codec),
			wrappers: WrapperTable::default(),
		}
	}

	pub fn codec(&self) -> &C {
		&self.codec
	}

	pub fn inner(&self) -> &T {
		&self.inner
	}

	fn wrap(&self, caller: Handler) -> Handler {
		let codec = Arc::clone(&self.codec);
		Handler::new(move |topic, payload| {
			let value = match payload {
				| Payload::Bytes(bytes) => codec.decode(bytes)?,
				// in-process transports may hand a value straight through
				| Payload::Value(value) => value.clone(),
			};
			caller.call(topic, &Payload::Value(value))
		})
	}
}

#[async_trait]
impl<T: Transport, C: PayloadCodec> Transport for CodecTransport<T, C> {
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
		let key = ArcStr::from(pattern);
		let wrapper = self
			.wrappers
			.get(&key, handler.id())
			.unwrap_or_else(|| self.wrap(handler.clone()));

		// recorded before awaiting so a concurrent unsubscribe finds it
		self.wrappers.insert(key.clone(), handler.id(), wrapper.clone());
		if let Err(err) = self.inner.subscribe(pattern, wrapper).await {
			self.wrappers.take(&key, handler.id());
			return Err(err);
		}
		debug!(pattern, handler_id = %handler.id(), "Decoded subscription added");
		Ok(())
	}

	async fn unsubscribe(
		&self,
		pattern: &str,
		handler: &Handler,
	) -> Result<(), TransportError> {
		let key = ArcStr::from(pattern);
		let Some(wrapper) = self.wrappers.take(&key, handler.id()) else {
			return self.inner.unsubscribe(pattern, handler).await;
		};

		if let Err(err) = self.inner.unsubscribe(pattern, &wrapper).await {
			self.wrappers.insert(key, handler.id(), wrapper);
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
		let encoded = self.codec.encode(&payload).map_err(|err| {
			debug!(topic, error = %err, "Payload not forwarded");
			// whatever the codec calls it, a failure here is an encode failure
			match err {
				| CodecError::Encode(reason) | CodecError::Decode(reason) => {
					TransportError::Encode(reason)
				}
			}
		})?;
		self.inner
			.publish(topic, Payload::Bytes(encoded), options)
			.await
	}

	async fn close(&self) -> Result<(), TransportError> {
		self.wrappers.clear();
		self.inner.close().await
	}
}
