//! Payload codecs used by the codec decorator.

use std::fmt::Debug;

use bytes::Bytes;
use thiserror::Error;

use crate::payload::Payload;

/// Encoding or decoding failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	/// Payload could not be serialized; nothing was forwarded
	#[error("Failed to encode payload: {0}")]
	Encode(String),

	/// Inbound bytes could not be deserialized; the message was dropped
	#[error("Failed to decode payload: {0}")]
	Decode(String),
}

/// Trait for encoding and decoding message payloads.
///
/// Implement this trait to use custom wire formats.
pub trait PayloadCodec: Debug + Send + Sync + 'static {
	/// Convert a payload to its canonical byte encoding
	fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError>;
	/// Convert bytes from the transport back into a structured payload
	fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError>;
}

/// Default codec using JSON text.
///
/// `Value` payloads are serialized; `Bytes` payloads must already hold a JSON
/// document and are forwarded verbatim, so every published message decodes on
/// the receiving side.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
	/// Creates a new codec.
	pub fn new() -> Self {
		Self
	}
}

impl PayloadCodec for JsonCodec {
	fn encode(&self, payload: &Payload) -> Result<Bytes, CodecError> {
		match payload {
			| Payload::Value(value) => serde_json::to_vec(value)
				.map(Bytes::from)
				.map_err(|e| CodecError::Encode(e.to_string())),
			| Payload::Bytes(bytes) => {
				serde_json::from_slice::<serde::de::IgnoredAny>(bytes)
					.map_err(|e| {
						CodecError::Encode(format!(
							"raw payload is not a JSON document: {e}"
						))
					})?;
				Ok(bytes.clone())
			}
		}
	}

	fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError> {
		serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
	}
}
