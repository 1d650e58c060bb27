//! Transport lifecycle state machine and event fan-out.
//!
//! `Constructing → Ready → Closing → Closed`, or `Constructing → Failed`.
//! Transitions only move forward, so `Ready`, `Closed` and the construction
//! error are each emitted at most once. Receivers created after a transition
//! still see its event: the settled events are replayed before live ones.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use super::error::TransportError;

/// Current lifecycle position of a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
	/// Still being set up; operations fail with `NotReady`
	Constructing,
	/// Safe to use
	Ready,
	/// Close has begun; new operations fail with `Closed`
	Closing,
	/// Close finished
	Closed,
	/// Construction failed; terminal
	Failed(TransportError),
}

/// Events observable through [`Transport::events`](super::Transport::events)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
	/// Construction complete
	Ready,
	/// Construction failure (terminal) or a delivery-time failure
	Error(TransportError),
	/// Close complete
	Closed,
}

/// Receiver half of a transport's event channel.
///
/// Yields the lifecycle events that happened before it was created, in
/// order, then everything emitted afterwards. Delivery errors are only seen
/// by receivers that existed when they were reported.
#[derive(Debug)]
pub struct TransportEvents {
	replay: VecDeque<TransportEvent>,
	live: broadcast::Receiver<TransportEvent>,
}

impl TransportEvents {
	/// Waits for the next event.
	pub async fn recv(&mut self) -> Result<TransportEvent, RecvError> {
		match self.replay.pop_front() {
			| Some(event) => Ok(event),
			| None => self.live.recv().await,
		}
	}

	/// Returns the next event if one is already available.
	pub fn try_recv(&mut self) -> Result<TransportEvent, TryRecvError> {
		match self.replay.pop_front() {
			| Some(event) => Ok(event),
			| None => self.live.try_recv(),
		}
	}
}

#[derive(Debug)]
pub struct Lifecycle {
	state: watch::Sender<LifecycleState>,
	events: broadcast::Sender<TransportEvent>,
	/// Lifecycle events emitted so far; guards transitions against
	/// concurrent `subscribe`
	settled: Mutex<Vec<TransportEvent>>,
}

impl Lifecycle {
	pub fn new(event_capacity: usize) -> Self {
		let (state, _) = watch::channel(LifecycleState::Constructing);
		let (events, _) = broadcast::channel(event_capacity.max(1));
		Self {
			state,
			events,
			settled: Mutex::new(Vec::new()),
		}
	}

	pub fn state(&self) -> LifecycleState {
		self.state.borrow().clone()
	}

	/// New event receiver, primed with the lifecycle events already emitted.
	pub fn subscribe(&self) -> TransportEvents {
		let settled = self.settled.lock();
		TransportEvents {
			replay: settled.iter().cloned().collect(),
			live: self.events.subscribe(),
		}
	}

	fn emit(&self, event: TransportEvent) {
		// No receivers is fine; events are fire-and-forget
		let _ = self.events.send(event);
	}

	fn transition<F>(
		&self,
		next: LifecycleState,
		allowed: F,
		event: Option<TransportEvent>,
	) -> bool
	where
		F: FnOnce(&LifecycleState) -> bool,
	{
		let mut settled = self.settled.lock();
		let moved = self.state.send_if_modified(|state| {
			if allowed(state) {
				*state = next;
				true
			} else {
				false
			}
		});
		if let (true, Some(event)) = (moved, event) {
			self.emit(event.clone());
			settled.push(event);
		}
		moved
	}

	/// `Constructing → Ready`. Returns false if already past construction.
	pub fn mark_ready(&self) -> bool {
		let moved = self.transition(
			LifecycleState::Ready,
			|s| matches!(s, LifecycleState::Constructing),
			Some(TransportEvent::Ready),
		);
		if moved {
			info!("Transport ready");
		}
		moved
	}

	/// `Constructing → Failed`, emitting the error instead of ready.
	pub fn mark_failed(&self, error: TransportError) -> bool {
		let moved = self.transition(
			LifecycleState::Failed(error.clone()),
			|s| matches!(s, LifecycleState::Constructing),
			Some(TransportEvent::Error(error.clone())),
		);
		if moved {
			warn!(error = %error, "Transport construction failed");
		}
		moved
	}

	/// Enters `Closing`. Fails with `Closed` if close already began, or with
	/// the construction error if the transport never became ready.
	pub fn begin_close(&self) -> Result<(), TransportError> {
		let moved = self.transition(
			LifecycleState::Closing,
			|s| matches!(s, LifecycleState::Constructing | LifecycleState::Ready),
			None,
		);
		if moved {
			return Ok(());
		}
		match self.state() {
			| LifecycleState::Failed(error) => Err(error),
			| _ => Err(TransportError::Closed),
		}
	}

	/// `Closing → Closed`, emitting the closed event.
	pub fn finish_close(&self) {
		let moved = self.transition(
			LifecycleState::Closed,
			|s| matches!(s, LifecycleState::Closing),
			Some(TransportEvent::Closed),
		);
		if moved {
			info!("Transport closed");
		}
	}

	/// Reports a delivery-time failure without changing state.
	pub fn report(&self, error: TransportError) {
		warn!(error = %error, "Delivery error");
		self.emit(TransportEvent::Error(error));
	}

	/// Fails unless the transport is ready for operations.
	pub fn ensure_open(&self) -> Result<(), TransportError> {
		match &*self.state.borrow() {
			| LifecycleState::Ready => Ok(()),
			| LifecycleState::Constructing => Err(TransportError::NotReady),
			| LifecycleState::Closing | LifecycleState::Closed => {
				Err(TransportError::Closed)
			}
			| LifecycleState::Failed(error) => Err(error.clone()),
		}
	}

	/// Waits until construction settles.
	pub async fn wait_ready(&self) -> Result<(), TransportError> {
		let mut rx = self.state.subscribe();
		let state = rx
			.wait_for(|s| !matches!(s, LifecycleState::Constructing))
			.await
			.map(|s| (*s).clone())
			// the sender lives in `self`, so it cannot be dropped while we wait
			.unwrap_or(LifecycleState::Closed);
		match state {
			| LifecycleState::Ready => Ok(()),
			| LifecycleState::Failed(error) => Err(error),
			| _ => Err(TransportError::Closed),
		}
	}
}

impl Default for Lifecycle {
	fn default() -> Self {
		Self::new(64)
	}
}
