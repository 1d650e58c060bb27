//! Transport decorators.
//!
//! A decorator owns an inner [`Transport`](crate::Transport), implements the
//! same trait, and rewrites topics or payloads on the way through. Handlers
//! are wrapped before being handed to the inner transport; the wrapper table
//! remembers which wrapper belongs to which caller handler so unsubscribe can
//! find it again.

use std::collections::HashMap;

use arcstr::ArcStr;
use parking_lot::Mutex;

use crate::transport::{Handler, HandlerId};

pub mod codec;
pub mod prefix;

pub use codec::CodecTransport;
pub use prefix::PrefixTransport;

/// `(inner pattern, caller handler)` → wrappers registered with the inner
/// transport, oldest first
#[derive(Debug, Default)]
pub(crate) struct WrapperTable {
	wrappers: Mutex<HashMap<(ArcStr, HandlerId), Vec<Handler>>>,
}

impl WrapperTable {
	pub(crate) fn insert(&self, pattern: ArcStr, caller: HandlerId, wrapper: Handler) {
		self.wrappers
			.lock()
			.entry((pattern, caller))
			.or_default()
			.push(wrapper);
	}

	/// Removes the oldest wrapper for `(pattern, caller)`.
	pub(crate) fn take(&self, pattern: &ArcStr, caller: HandlerId) -> Option<Handler> {
		let mut wrappers = self.wrappers.lock();
		let key = (pattern.clone(), caller);
		let list = wrappers.get_mut(&key)?;
		let wrapper = list.remove(0);
		if list.is_empty() {
			wrappers.remove(&key);
		}
		Some(wrapper)
	}

	/// Returns the oldest wrapper for `(pattern, caller)` without removing it.
	pub(crate) fn get(&self, pattern: &ArcStr, caller: HandlerId) -> Option<Handler> {
		self.wrappers
			.lock()
			.get(&(pattern.clone(), caller))
			.and_then(|list| list.first().cloned())
	}

	pub(crate) fn clear(&self) {
		self.wrappers.lock().clear();
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.wrappers.lock().values().map(Vec::len).sum()
	}
}
