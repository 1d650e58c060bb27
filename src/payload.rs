//! Message payloads and publish options

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Message payload carried through a transport.
///
/// Transports move `Bytes`; the codec decorator turns `Value` payloads into
/// bytes on the way in and back into values on delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	/// Raw, already-encoded bytes
	Bytes(Bytes),
	/// Structured value in the codec's data model
	Value(serde_json::Value),
}

impl Payload {
	/// Returns the raw bytes, if this is a `Bytes` payload.
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			| Payload::Bytes(bytes) => Some(bytes),
			| Payload::Value(_) => None,
		}
	}

	/// Returns the structured value, if this is a `Value` payload.
	pub fn as_value(&self) -> Option<&serde_json::Value> {
		match self {
			| Payload::Value(value) => Some(value),
			| Payload::Bytes(_) => None,
		}
	}
}

impl From<Bytes> for Payload {
	fn from(bytes: Bytes) -> Self {
		Payload::Bytes(bytes)
	}
}

impl From<Vec<u8>> for Payload {
	fn from(bytes: Vec<u8>) -> Self {
		Payload::Bytes(Bytes::from(bytes))
	}
}

impl From<&'static str> for Payload {
	fn from(text: &'static str) -> Self {
		Payload::Bytes(Bytes::from_static(text.as_bytes()))
	}
}

impl From<serde_json::Value> for Payload {
	fn from(value: serde_json::Value) -> Self {
		Payload::Value(value)
	}
}

/// Delivery guarantee requested from the underlying transport.
///
/// In-process transports deliver synchronously and ignore it.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
	Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum QoS {
	/// Fire and forget
	#[default]
	AtMostOnce,
	/// Acknowledged delivery, duplicates possible
	AtLeastOnce,
	/// Handshake-based delivery
	ExactlyOnce,
}

/// Options passed untouched through decorators to the transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishOptions {
	/// Requested delivery guarantee
	pub qos: QoS,
	/// Ask the transport to retain the message for late subscribers
	pub retain: bool,
}

impl PublishOptions {
	pub fn with_qos(mut self, qos: QoS) -> Self {
		self.qos = qos;
		self
	}

	pub fn retained(mut self) -> Self {
		self.retain = true;
		self
	}
}
