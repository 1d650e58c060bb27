//! Behaviour every transport stack must show, whatever it is composed of.
//!
//! Each check takes a fresh, ready transport. Payloads are JSON values so the
//! same assertions hold with and without a codec in the stack.
#![allow(dead_code)]

use std::sync::{Arc, Weak};

use futures::executor::block_on;
use parking_lot::Mutex;
use serde_json::json;
use topicmux::{
	Handler, HandlerError, LifecycleState, Payload, PublishOptions,
	Transport, TransportError, TransportEvent,
};

/// Records `name:topic` for every delivery it sees.
#[derive(Clone, Default)]
pub struct Recorder {
	log: Arc<Mutex<Vec<(String, Payload)>>>,
}

impl Recorder {
	pub fn handler(&self, name: &'static str) -> Handler {
		let log = self.log.clone();
		Handler::infallible(move |topic, payload| {
			log.lock().push((format!("{name}:{topic}"), payload.clone()))
		})
	}

	pub fn deliveries(&self) -> Vec<String> {
		self.log.lock().iter().map(|(d, _)| d.clone()).collect()
	}

	pub fn payloads(&self) -> Vec<Payload> {
		self.log.lock().iter().map(|(_, p)| p.clone()).collect()
	}

	pub fn clear(&self) {
		self.log.lock().clear();
	}
}

pub fn value(n: i64) -> Payload {
	Payload::Value(json!({ "n": n }))
}

pub async fn publish(transport: &dyn Transport, topic: &str) {
	transport
		.publish(topic, value(0), PublishOptions::default())
		.await
		.unwrap();
}

pub async fn exact_pattern_matches_only_itself(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	transport.subscribe("a/b", rec.handler("h")).await.unwrap();

	for topic in ["a/b", "a", "a/b/c", "a/c", "b/b"] {
		publish(&*transport, topic).await;
	}
	assert_eq!(rec.deliveries(), ["h:a/b"]);
}

pub async fn single_level_wildcard_matches_one_segment(
	transport: Arc<dyn Transport>,
) {
	let rec = Recorder::default();
	transport.subscribe("a/+/c", rec.handler("h")).await.unwrap();

	for topic in ["a/b/c", "a/x/c", "a/b/b/c", "a/c"] {
		publish(&*transport, topic).await;
	}
	assert_eq!(rec.deliveries(), ["h:a/b/c", "h:a/x/c"]);
}

pub async fn multi_level_wildcard_matches_trailing_segments(
	transport: Arc<dyn Transport>,
) {
	let rec = Recorder::default();
	transport.subscribe("a/#", rec.handler("h")).await.unwrap();

	for topic in ["a", "a/b", "a/b/c", "b", "b/a"] {
		publish(&*transport, topic).await;
	}
	assert_eq!(rec.deliveries(), ["h:a", "h:a/b", "h:a/b/c"]);
}

pub async fn overlapping_patterns_each_fire_once(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	transport.subscribe("a/+", rec.handler("plus")).await.unwrap();
	transport.subscribe("a/b", rec.handler("exact")).await.unwrap();

	publish(&*transport, "a/b").await;
	assert_eq!(rec.deliveries(), ["plus:a/b", "exact:a/b"]);
}

pub async fn publish_without_subscribers_succeeds(transport: Arc<dyn Transport>) {
	let mut events = transport.events();
	assert_eq!(events.try_recv(), Ok(TransportEvent::Ready));
	publish(&*transport, "nobody/listens").await;
	assert!(events.try_recv().is_err());
}

pub async fn payload_survives_delivery(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	transport.subscribe("data", rec.handler("h")).await.unwrap();

	let payload = Payload::Value(json!({"k": 1, "list": [true, null, "x"]}));
	transport
		.publish("data", payload.clone(), PublishOptions::default())
		.await
		.unwrap();
	assert_eq!(rec.payloads(), [payload]);
}

pub async fn unsubscribe_stops_delivery(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	let handler = rec.handler("h");
	transport.subscribe("a/+", handler.clone()).await.unwrap();
	publish(&*transport, "a/b").await;

	transport.unsubscribe("a/+", &handler).await.unwrap();
	publish(&*transport, "a/b").await;
	assert_eq!(rec.deliveries(), ["h:a/b"]);
}

pub async fn unknown_unsubscribe_is_a_noop(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	let registered = rec.handler("registered");
	transport.subscribe("x", registered).await.unwrap();

	transport
		.unsubscribe("never/subscribed", &rec.handler("h"))
		.await
		.unwrap();
	transport.unsubscribe("x", &rec.handler("other")).await.unwrap();

	publish(&*transport, "x").await;
	assert_eq!(rec.deliveries(), ["registered:x"]);
}

pub async fn duplicate_registrations_fire_independently(
	transport: Arc<dyn Transport>,
) {
	let rec = Recorder::default();
	let handler = rec.handler("h");
	transport.subscribe("a", handler.clone()).await.unwrap();
	transport.subscribe("a", handler.clone()).await.unwrap();

	publish(&*transport, "a").await;
	assert_eq!(rec.deliveries(), ["h:a", "h:a"]);

	rec.clear();
	transport.unsubscribe("a", &handler).await.unwrap();
	publish(&*transport, "a").await;
	assert_eq!(rec.deliveries(), ["h:a"]);
}

pub async fn handlers_run_in_registration_order(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	transport.subscribe("#", rec.handler("1")).await.unwrap();
	transport.subscribe("a/b", rec.handler("2")).await.unwrap();
	transport.subscribe("+/b", rec.handler("3")).await.unwrap();
	transport.subscribe("a/#", rec.handler("4")).await.unwrap();

	publish(&*transport, "a/b").await;
	assert_eq!(rec.deliveries(), ["1:a/b", "2:a/b", "3:a/b", "4:a/b"]);
}

pub async fn invalid_patterns_and_topics_are_rejected(
	transport: Arc<dyn Transport>,
) {
	let rec = Recorder::default();
	for pattern in ["a/#/b", "a//b", "/a"] {
		let res = transport.subscribe(pattern, rec.handler("h")).await;
		assert!(
			matches!(res, Err(TransportError::InvalidPattern(_))),
			"pattern {pattern:?} gave {res:?}"
		);
	}
	for topic in ["a/+", "a/#", "a//b"] {
		let res = transport
			.publish(topic, value(0), PublishOptions::default())
			.await;
		assert!(
			matches!(res, Err(TransportError::InvalidTopic(_))),
			"topic {topic:?} gave {res:?}"
		);
	}
}

/// A handler that unsubscribes a later handler mid-publish does not stop
/// that handler from receiving the message being delivered.
pub async fn delivery_uses_a_stable_snapshot(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	let victim = rec.handler("victim");
	let weak: Weak<dyn Transport> = Arc::downgrade(&transport);
	let target = victim.clone();
	let log = rec.clone();
	let remover = Handler::infallible(move |topic, payload| {
		log.log.lock().push((format!("remover:{topic}"), payload.clone()));
		if let Some(transport) = weak.upgrade() {
			block_on(transport.unsubscribe("a", &target)).unwrap();
		}
	});

	transport.subscribe("a", remover).await.unwrap();
	transport.subscribe("a", victim).await.unwrap();

	publish(&*transport, "a").await;
	assert_eq!(rec.deliveries(), ["remover:a", "victim:a"]);

	rec.clear();
	publish(&*transport, "a").await;
	assert_eq!(rec.deliveries(), ["remover:a"]);
}

/// A handler subscribing during delivery is not invoked for that message.
pub async fn subscribe_during_delivery_waits_for_next_publish(
	transport: Arc<dyn Transport>,
) {
	let rec = Recorder::default();
	let weak: Weak<dyn Transport> = Arc::downgrade(&transport);
	let late = rec.handler("late");
	let done = Arc::new(Mutex::new(false));
	let subscriber = Handler::infallible(move |_, _| {
		let mut done = done.lock();
		if *done {
			return;
		}
		*done = true;
		if let Some(transport) = weak.upgrade() {
			block_on(transport.subscribe("a", late.clone())).unwrap();
		}
	});

	transport.subscribe("a", subscriber).await.unwrap();
	publish(&*transport, "a").await;
	assert!(rec.deliveries().is_empty());

	publish(&*transport, "a").await;
	assert_eq!(rec.deliveries(), ["late:a"]);
}

pub async fn failing_handler_does_not_block_others(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	let mut events = transport.events();
	transport
		.subscribe(
			"a",
			Handler::new(|_, _| Err(HandlerError::failed("boom"))),
		)
		.await
		.unwrap();
	transport
		.subscribe("a", Handler::infallible(|_, _| panic!("handler panic")))
		.await
		.unwrap();
	transport.subscribe("a", rec.handler("after")).await.unwrap();

	publish(&*transport, "a").await;
	assert_eq!(rec.deliveries(), ["after:a"]);
	assert_eq!(events.try_recv(), Ok(TransportEvent::Ready));
	for _ in 0 .. 2 {
		assert!(matches!(
			events.try_recv(),
			Ok(TransportEvent::Error(TransportError::Handler { .. }))
		));
	}
}

pub async fn close_rejects_later_operations(transport: Arc<dyn Transport>) {
	let rec = Recorder::default();
	let mut events = transport.events();
	transport.subscribe("a", rec.handler("h")).await.unwrap();

	transport.close().await.unwrap();
	assert_eq!(transport.state(), LifecycleState::Closed);
	assert_eq!(events.try_recv(), Ok(TransportEvent::Ready));
	assert_eq!(events.try_recv(), Ok(TransportEvent::Closed));

	assert_eq!(
		transport
			.publish("a", value(0), PublishOptions::default())
			.await,
		Err(TransportError::Closed)
	);
	assert_eq!(
		transport.subscribe("a", rec.handler("h")).await,
		Err(TransportError::Closed)
	);
	assert_eq!(
		transport.unsubscribe("a", &rec.handler("h")).await,
		Err(TransportError::Closed)
	);
	assert_eq!(transport.close().await, Err(TransportError::Closed));
	assert_eq!(transport.ready().await, Err(TransportError::Closed));
	assert!(rec.deliveries().is_empty());
	assert!(events.try_recv().is_err());

	let mut late = transport.events();
	assert_eq!(late.try_recv(), Ok(TransportEvent::Ready));
	assert_eq!(late.try_recv(), Ok(TransportEvent::Closed));
	assert!(late.try_recv().is_err());
}

/// Ready was emitted during construction, before anyone could listen; every
/// receiver still sees it exactly once, and nothing else.
pub async fn ready_reaches_receivers_created_later(
	transport: Arc<dyn Transport>,
) {
	assert_eq!(transport.state(), LifecycleState::Ready);
	assert_eq!(transport.ready().await, Ok(()));

	for _ in 0 .. 2 {
		let mut events = transport.events();
		assert_eq!(events.recv().await, Ok(TransportEvent::Ready));
		assert!(events.try_recv().is_err());
	}
}
