//! # topicmux
//!
//! Transport-agnostic publish/subscribe with wildcard topic routing.
//!
//! ## Features
//!
//! - **One capability interface**: every transport implements [`Transport`]
//! - **Trie-based matching**: the in-process [`TrieTransport`] resolves `+`
//!   and `#` patterns with a segment trie
//! - **Composable decorators**: [`PrefixTransport`] namespaces topics,
//!   [`CodecTransport`] encodes payloads, and both wrap any transport
//! - **Lifecycle events**: `Ready`, `Error` and `Closed`, with `Ready`
//!   and `Closed` replayed to late receivers, backed by an explicit state
//!   machine
//! - **Configurable syntax**: separator and wildcard markers
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use topicmux::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let transport = topicmux::build(&BuildOptions::default().with_prefix("app")).await?;
//!
//! let handler = Handler::infallible(|topic, payload| {
//! 	println!("{topic}: {:?}", payload.as_value());
//! });
//! transport.subscribe("sensors/+/temperature", handler.clone()).await?;
//! transport
//! 	.publish(
//! 		"sensors/kitchen/temperature",
//! 		Payload::Value(json!({"celsius": 21.5})),
//! 		PublishOptions::default(),
//! 	)
//! 	.await?;
//!
//! transport.unsubscribe("sensors/+/temperature", &handler).await?;
//! transport.close().await?;
//! # Ok::<(), TransportError>(())
//! # }).unwrap();
//! ```
//!
//! ## Pattern Matching
//!
//! - `+` matches exactly one topic level (`sensors/+/temperature`)
//! - `#` matches zero or more trailing levels (`sensors/#` also matches
//!   `sensors`)
//!
//! ## Custom Codecs
//!
//! Implement [`PayloadCodec`] and wrap with [`CodecTransport::new`]:
//!
//! ```rust
//! use bytes::Bytes;
//! use topicmux::{CodecError, Payload, PayloadCodec};
//!
//! #[derive(Debug)]
//! struct Utf8Codec;
//!
//! impl PayloadCodec for Utf8Codec {
//! 	fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError> {
//! 		match payload {
//! 			Payload::Value(serde_json::Value::String(s)) => {
//! 				Ok(Bytes::from(s.clone()))
//! 			}
//! 			_ => Err(CodecError::Encode("only strings".into())),
//! 		}
//! 	}
//!
//! 	fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError> {
//! 		std::str::from_utf8(bytes)
//! 			.map(|s| serde_json::Value::String(s.to_string()))
//! 			.map_err(|e| CodecError::Decode(e.to_string()))
//! 	}
//! }
//! ```

pub mod builder;
pub mod codec;
pub mod decorator;
pub mod payload;
pub mod subs_counter;
pub mod topic;
pub mod transport;

// === Core Public API ===
pub use builder::{BuildOptions, PrefixOption, TransportRegistry, build};
pub use codec::{CodecError, JsonCodec, PayloadCodec};
pub use decorator::{CodecTransport, PrefixTransport};
pub use payload::{Payload, PublishOptions, QoS};
pub use transport::{
	DuplicatePolicy, Handler, HandlerError, HandlerId, LifecycleState,
	Transport, TransportError, TransportEvent, TransportEvents,
	TransportSettings, TrieTransport,
};

// === Advanced API ===
pub use subs_counter::{CounterError, SubsCounter};
pub use topic::{TopicPath, TopicPatternPath, TopicSyntax};

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Prelude module for convenient imports
///
/// ```rust
/// use topicmux::prelude::*;
/// ```
pub mod prelude {
	//! Essential types for most applications

	pub use crate::{
		BuildOptions, Handler, Payload, PublishOptions, QoS, Transport,
		TransportError, TransportEvent,
	};
}

/// Error types used throughout the library
///
/// ```rust
/// use topicmux::errors::*;
/// ```
pub mod errors {
	//! All error types used in the library

	pub use crate::codec::CodecError;
	pub use crate::subs_counter::CounterError;
	pub use crate::topic::{
		TopicError, TopicNameError, TopicPatternError, TopicSyntaxError,
	};
	pub use crate::transport::{HandlerError, TransportError};
}
