//! How decorators, adapters and the builder fit together.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::json;
use topicmux::transport::Lifecycle;
use topicmux::{
	BuildOptions, CodecTransport, CounterError, Handler, LifecycleState,
	Payload, PrefixTransport, PublishOptions, QoS, SubsCounter, TopicSyntax,
	Transport, TransportError, TransportEvent, TransportEvents,
	TransportRegistry,
	TrieTransport,
};

use common::Recorder;

/// Adapter that records what reaches it instead of delivering anything.
#[derive(Debug)]
struct Recording {
	syntax: TopicSyntax,
	lifecycle: Arc<Lifecycle>,
	published: Mutex<Vec<(String, Payload, PublishOptions)>>,
}

impl Recording {
	fn ready() -> Self {
		let recording = Self::constructing();
		recording.lifecycle.mark_ready();
		recording
	}

	fn constructing() -> Self {
		Self {
			syntax: TopicSyntax::default(),
			lifecycle: Arc::new(Lifecycle::default()),
			published: Mutex::new(Vec::new()),
		}
	}
}

#[async_trait]
impl Transport for Recording {
	fn syntax(&self) -> &TopicSyntax {
		&self.syntax
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

	async fn subscribe(&self, _: &str, _: Handler) -> Result<(), TransportError> {
		self.lifecycle.ensure_open()
	}

	async fn unsubscribe(&self, _: &str, _: &Handler) -> Result<(), TransportError> {
		self.lifecycle.ensure_open()
	}

	async fn publish(
		&self,
		topic: &str,
		payload: Payload,
		options: PublishOptions,
	) -> Result<(), TransportError> {
		self.lifecycle.ensure_open()?;
		self.published.lock().push((topic.to_string(), payload, options));
		Ok(())
	}

	async fn close(&self) -> Result<(), TransportError> {
		self.lifecycle.begin_close()?;
		self.lifecycle.finish_close();
		Ok(())
	}
}

#[tokio::test]
async fn prefixes_sharing_a_transport_stay_isolated() {
	let inner = Arc::new(TrieTransport::new());
	let left = PrefixTransport::new("left", inner.clone()).unwrap();
	let right = PrefixTransport::new("right", inner.clone()).unwrap();
	let rec = Recorder::default();

	left.subscribe("#", rec.handler("left")).await.unwrap();
	right.subscribe("#", rec.handler("right")).await.unwrap();

	left.publish("x", common::value(1), Default::default())
		.await
		.unwrap();
	right
		.publish("y/z", common::value(2), Default::default())
		.await
		.unwrap();
	inner
		.publish("elsewhere", common::value(3), Default::default())
		.await
		.unwrap();

	assert_eq!(rec.deliveries(), ["left:x", "right:y/z"]);
}

#[tokio::test]
async fn stack_encodes_then_prefixes() {
	let inner = Arc::new(TrieTransport::new());
	let stack = CodecTransport::json(
		PrefixTransport::new("ns", inner.clone()).unwrap(),
	);
	let raw = Recorder::default();
	let decoded = Recorder::default();

	inner.subscribe("ns/#", raw.handler("raw")).await.unwrap();
	stack.subscribe("x", decoded.handler("app")).await.unwrap();
	stack
		.publish("x", Payload::Value(json!({"k": 1})), Default::default())
		.await
		.unwrap();

	assert_eq!(raw.deliveries(), ["raw:ns/x"]);
	assert_eq!(
		raw.payloads(),
		[Payload::Bytes(Bytes::from_static(b"{\"k\":1}"))]
	);
	assert_eq!(decoded.deliveries(), ["app:x"]);
	assert_eq!(decoded.payloads(), [Payload::Value(json!({"k": 1}))]);
}

#[tokio::test]
async fn publish_options_pass_through_decorators() {
	let recording = Arc::new(Recording::ready());
	let stack = CodecTransport::json(
		PrefixTransport::new("ns", recording.clone()).unwrap(),
	);
	let options = PublishOptions::default()
		.with_qos(QoS::ExactlyOnce)
		.retained();

	stack
		.publish("a/b", Payload::Value(json!([1, 2])), options)
		.await
		.unwrap();

	let published = recording.published.lock();
	assert_eq!(published.len(), 1);
	let (topic, payload, seen) = &published[0];
	assert_eq!(topic, "ns/a/b");
	assert_eq!(payload, &Payload::Bytes(Bytes::from_static(b"[1,2]")));
	assert_eq!(seen, &options);
}

#[tokio::test]
async fn undecodable_message_is_dropped_and_reported() {
	let inner = Arc::new(TrieTransport::new());
	let stack = CodecTransport::json(
		PrefixTransport::new("ns", inner.clone()).unwrap(),
	);
	let rec = Recorder::default();
	let mut events = stack.events();

	stack.subscribe("a", rec.handler("app")).await.unwrap();
	inner
		.publish("ns/a", Payload::from("not json"), Default::default())
		.await
		.unwrap();

	assert!(rec.deliveries().is_empty());
	assert_eq!(events.try_recv(), Ok(TransportEvent::Ready));
	match events.try_recv() {
		| Ok(TransportEvent::Error(TransportError::Decode { topic, .. })) => {
			assert_eq!(topic, "ns/a")
		}
		| other => panic!("expected decode error event, got {other:?}"),
	}
}

#[tokio::test]
async fn unencodable_payload_is_not_forwarded() {
	let recording = Arc::new(Recording::ready());
	let stack = CodecTransport::json(recording.clone());

	let res = stack
		.publish("a", Payload::from("plain text"), Default::default())
		.await;
	assert!(matches!(res, Err(TransportError::Encode(_))));
	assert!(recording.published.lock().is_empty());
}

#[tokio::test]
async fn closing_the_stack_closes_the_transport() {
	let inner = Arc::new(TrieTransport::new());
	let stack = CodecTransport::json(
		PrefixTransport::new("ns", inner.clone()).unwrap(),
	);
	let rec = Recorder::default();
	stack.subscribe("a/#", rec.handler("h")).await.unwrap();
	assert!(inner.is_subscribed("ns/a/#"));

	stack.close().await.unwrap();
	assert_eq!(inner.state(), LifecycleState::Closed);
	assert!(inner.is_empty());
	assert_eq!(
		inner
			.publish("ns/a", common::value(0), Default::default())
			.await,
		Err(TransportError::Closed)
	);
}

#[tokio::test]
async fn custom_syntax_flows_through_prefix() {
	let syntax = TopicSyntax::new('.', "*", ">").unwrap();
	let inner = Arc::new(TrieTransport::with_settings(
		topicmux::TransportSettings::default().with_syntax(syntax),
	));
	let orders = PrefixTransport::from_segments(["orders"], inner.clone())
		.unwrap();
	let rec = Recorder::default();

	orders.subscribe("eu.*", rec.handler("eu")).await.unwrap();
	orders.subscribe(">", rec.handler("all")).await.unwrap();
	orders
		.publish("eu.created", common::value(0), Default::default())
		.await
		.unwrap();

	assert!(inner.is_subscribed("orders.eu.*"));
	assert_eq!(rec.deliveries(), ["eu:eu.created", "all:eu.created"]);
	assert!(matches!(
		orders.subscribe("eu/+", rec.handler("mqtt")).await,
		Ok(())
	));
	assert!(matches!(
		orders.subscribe("eu.>.x", rec.handler("bad")).await,
		Err(TransportError::InvalidPattern(_))
	));
}

#[tokio::test]
async fn build_waits_for_slow_transports() {
	let mut registry = TransportRegistry::default();
	registry.register("slow", |_, options| {
		let delay = options["delay_ms"].as_u64().unwrap_or(0);
		let recording = Arc::new(Recording::constructing());
		let lifecycle = recording.lifecycle.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(delay)).await;
			lifecycle.mark_ready();
		});
		Ok(recording)
	});

	let options = BuildOptions::from_json(
		r#"{"transport": "slow", "transport_options": {"delay_ms": 20}}"#,
	)
	.unwrap();
	let transport = registry.build(&options).await.unwrap();
	assert_eq!(transport.state(), LifecycleState::Ready);
	transport
		.publish("a", common::value(0), Default::default())
		.await
		.unwrap();
}

#[tokio::test]
async fn operations_before_ready_fail() {
	let recording = Recording::constructing();
	let mut events = recording.events();

	assert_eq!(
		recording
			.publish("a", common::value(0), Default::default())
			.await,
		Err(TransportError::NotReady)
	);

	recording.lifecycle.mark_ready();
	assert_eq!(recording.ready().await, Ok(()));
	assert_eq!(events.try_recv().unwrap(), TransportEvent::Ready);
}

#[test]
fn counter_underflow_is_rejected_every_time() {
	let mut counter = SubsCounter::new();
	counter.increment("a/+");
	assert_eq!(counter.decrement("a/+"), Ok(0));

	for _ in 0 .. 3 {
		assert_eq!(
			counter.decrement("a/+"),
			Err(CounterError::Underflow {
				pattern: "a/+".to_string()
			})
		);
		assert_eq!(counter.count("a/+"), 0);
		assert!(!counter.includes("a/+"));
	}
}
