//! Builds a prefixed JSON stack over the in-process trie and exchanges a few
//! sensor readings.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example prefixed_json
//! ```

use serde_json::json;
use topicmux::prelude::*;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a compact subscriber when `RUST_LOG` is set; silent otherwise.
fn setup_tracing() {
	if std::env::var("RUST_LOG").is_err() {
		return;
	}
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| "info".into());
	tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_target(true)
				.with_thread_ids(false)
				.compact(),
		)
		.init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	setup_tracing();

	let options = BuildOptions::from_json(
		r#"{"transport": "trie", "prefix": ["home", "ground-floor"]}"#,
	)?;
	let transport = topicmux::build(&options).await?;

	let mut events = transport.events();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			println!("event: {event:?}");
		}
	});

	let readings = Handler::infallible(|topic, payload| {
		if let Some(value) = payload.as_value() {
			println!("{topic} -> {value}");
		}
	});
	transport
		.subscribe("sensors/+/temperature", readings.clone())
		.await?;

	for (room, celsius) in [("kitchen", 21.5), ("hall", 19.0)] {
		transport
			.publish(
				&format!("sensors/{room}/temperature"),
				Payload::Value(json!({ "room": room, "celsius": celsius })),
				PublishOptions::default(),
			)
			.await?;
	}

	// not JSON, so the codec refuses to forward it
	let rejected = transport
		.publish(
			"sensors/attic/temperature",
			Payload::from("22 degrees"),
			PublishOptions::default(),
		)
		.await;
	println!("raw text publish: {rejected:?}");

	transport
		.unsubscribe("sensors/+/temperature", &readings)
		.await?;
	transport.close().await?;
	tokio::time::sleep(std::time::Duration::from_millis(10)).await;
	Ok(())
}
