//! Composition of a transport stack from options.
//!
//! A [`TransportRegistry`] maps transport tags to factories. [`build`] picks
//! the factory named in [`BuildOptions`], then layers a [`PrefixTransport`]
//! and a [`CodecTransport`] around the result, in that order, so a publish
//! is encoded first and prefixed second.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decorator::{CodecTransport, PrefixTransport};
use crate::topic::TopicSyntax;
use crate::transport::{Transport, TransportError, TransportSettings, TrieTransport};

/// Tag selected when options name no transport
pub const DEFAULT_TRANSPORT: &str = "trie";

/// Constructs a transport from settings and adapter-specific options.
pub type TransportFactory = Arc<
	dyn Fn(
			&TransportSettings,
			&serde_json::Value,
		) -> Result<Arc<dyn Transport>, TransportError>
		+ Send
		+ Sync,
>;

/// Namespace prefix, either as a single path or as separate segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefixOption {
	/// `"tenant/eu"`, split by the separator in effect
	Path(String),
	/// `["tenant", "eu"]`
	Segments(Vec<String>),
}

impl PrefixOption {
	/// Renders the prefix as a path in `syntax`.
	pub fn to_path(&self, syntax: &TopicSyntax) -> String {
		match self {
			| PrefixOption::Path(path) => path.clone(),
			| PrefixOption::Segments(segments) => syntax.join(segments),
		}
	}
}

impl From<&str> for PrefixOption {
	fn from(path: &str) -> Self {
		PrefixOption::Path(path.to_string())
	}
}

/// Options for [`TransportRegistry::build`].
///
/// ```rust
/// use topicmux::BuildOptions;
///
/// let options = BuildOptions::from_json(
/// 	r#"{"transport": "trie", "prefix": ["tenant", "eu"], "codec": false}"#,
/// )?;
/// assert!(!options.codec);
/// # Ok::<(), topicmux::TransportError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
	/// Registry tag of the transport; `"trie"` when absent
	#[serde(alias = "type")]
	pub transport: Option<String>,
	/// Wraps the transport in a [`PrefixTransport`] when set and non-empty
	pub prefix: Option<PrefixOption>,
	/// Wraps the stack in a JSON [`CodecTransport`]; enabled by default
	#[serde(alias = "json")]
	pub codec: bool,
	/// Passed untouched to the transport factory
	#[serde(alias = "transportOptions")]
	pub transport_options: serde_json::Value,
}

impl Default for BuildOptions {
	fn default() -> Self {
		Self {
			transport: None,
			prefix: None,
			codec: true,
			transport_options: serde_json::Value::Null,
		}
	}
}

impl BuildOptions {
	/// Parses options from a JSON document.
	pub fn from_json(json: &str) -> Result<Self, TransportError> {
		serde_json::from_str(json)
			.map_err(|e| TransportError::InvalidOptions(e.to_string()))
	}

	pub fn with_transport(mut self, tag: impl Into<String>) -> Self {
		self.transport = Some(tag.into());
		self
	}

	pub fn with_prefix(mut self, prefix: impl Into<PrefixOption>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	pub fn without_codec(mut self) -> Self {
		self.codec = false;
		self
	}

	pub fn with_transport_options(mut self, options: serde_json::Value) -> Self {
		self.transport_options = options;
		self
	}

	fn tag(&self) -> &str {
		self.transport.as_deref().unwrap_or(DEFAULT_TRANSPORT)
	}
}

/// Tag → factory map used to select a transport implementation.
#[derive(Clone)]
pub struct TransportRegistry {
	factories: HashMap<String, TransportFactory>,
}

impl Default for TransportRegistry {
	/// Registry with the in-process `"trie"` transport.
	fn default() -> Self {
		let mut registry = Self::empty();
		registry.register(DEFAULT_TRANSPORT, |settings, _| {
			Ok(Arc::new(TrieTransport::with_settings(settings.clone())))
		});
		registry
	}
}

impl fmt::Debug for TransportRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tags: Vec<_> = self.factories.keys().collect();
		tags.sort();
		f.debug_struct("TransportRegistry").field("tags", &tags).finish()
	}
}

impl TransportRegistry {
	/// Registry without any transport.
	pub fn empty() -> Self {
		Self {
			factories: HashMap::new(),
		}
	}

	/// Registers `factory` under `tag`, returning the factory it replaced.
	pub fn register<F>(
		&mut self,
		tag: impl Into<String>,
		factory: F,
	) -> Option<TransportFactory>
	where
		F: Fn(
				&TransportSettings,
				&serde_json::Value,
			) -> Result<Arc<dyn Transport>, TransportError>
			+ Send
			+ Sync
			+ 'static,
	{
		let tag = tag.into();
		debug!(tag = %tag, "Registering transport factory");
		self.factories.insert(tag, Arc::new(factory))
	}

	pub fn contains(&self, tag: &str) -> bool {
		self.factories.contains_key(tag)
	}

	/// Looks up the factory for `tag`.
	pub fn resolve(&self, tag: &str) -> Result<&TransportFactory, TransportError> {
		self.factories
			.get(tag)
			.ok_or_else(|| TransportError::UnknownTransport(tag.to_string()))
	}

	/// Builds a stack with default [`TransportSettings`].
	pub async fn build(
		&self,
		options: &BuildOptions,
	) -> Result<Arc<dyn Transport>, TransportError> {
		self.build_with_settings(options, &TransportSettings::default())
			.await
	}

	/// Builds the transport named in `options`, wraps it in the configured
	/// decorators, and waits until it is ready.
	pub async fn build_with_settings(
		&self,
		options: &BuildOptions,
		settings: &TransportSettings,
	) -> Result<Arc<dyn Transport>, TransportError> {
		let tag = options.tag();
		let factory = self.resolve(tag)?;
		let mut transport = factory(settings, &options.transport_options)?;

		let prefix = options
			.prefix
			.as_ref()
			.map(|prefix| prefix.to_path(transport.syntax()))
			.filter(|prefix| !prefix.is_empty());
		if let Some(prefix) = &prefix {
			transport = Arc::new(PrefixTransport::new(prefix.as_str(), transport)?);
		}
		if options.codec {
			transport = Arc::new(CodecTransport::json(transport));
		}

		transport.ready().await?;
		info!(transport = tag, prefix = ?prefix, codec = options.codec, "Transport stack ready");
		Ok(transport)
	}
}

/// Builds a stack from the default registry.
pub async fn build(
	options: &BuildOptions,
) -> Result<Arc<dyn Transport>, TransportError> {
	TransportRegistry::default().build(options).await
}
