#![allow(missing_docs)]
use std::fmt::Display;

use tracing::debug;

use super::topic_matcher::TopicMatcherNode;
use super::topic_path::TopicPath;
use super::topic_pattern_path::TopicPatternPath;
use crate::subs_counter::{CounterError, SubsCounter};

/// A subscription identifier.
///
/// Ids are handed out in increasing order, so sorting by id gives
/// registration order.
#[derive(Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Copy, Clone)]
pub struct SubscriptionId(u64);

impl Display for SubscriptionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "SubscriptionId({})", self.0)
	}
}

/// Subscriptions terminating at one trie position, in registration order
type SubscriptionTable<T> = Vec<(SubscriptionId, T)>;

/// Trie of subscriptions plus per-pattern counts.
///
/// Keeps the invariant that every subscription stored in the trie is
/// counted in the `SubsCounter` under its pattern string.
pub struct TopicRouter<T> {
	topic_matcher: TopicMatcherNode<SubscriptionTable<T>>,
	counter: SubsCounter,
	next_id: u64,
}

impl<T> std::fmt::Debug for TopicRouter<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TopicRouter")
			.field("subscriptions", &self.len())
			.field("nodes", &self.node_count())
			.finish()
	}
}

impl<T> Default for TopicRouter<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> TopicRouter<T> {
	pub fn new() -> Self {
		Self {
			topic_matcher: TopicMatcherNode::new(),
			counter: SubsCounter::new(),
			next_id: 0,
		}
	}

	pub fn add_subscription(
		&mut self,
		topic: &TopicPatternPath,
		subscription: T,
	) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;

		self.topic_matcher
			.get_or_create_subscription_table(topic)
			.push((id, subscription));
		let count = self.counter.increment(topic.pattern().clone());
		debug!(pattern = %topic, subscription_id = %id, count, "Subscription added");
		id
	}

	/// True if a subscription under exactly `topic` satisfies `predicate`
	pub fn contains<P>(&self, topic: &TopicPatternPath, predicate: P) -> bool
	where P: Fn(&T) -> bool {
		self.topic_matcher
			.get_subscription_table(topic.slice())
			.is_some_and(|table| table.iter().any(|(_, s)| predicate(s)))
	}

	/// Removes the earliest subscription under `topic` matching `predicate`.
	///
	/// Returns `Ok(None)` if nothing matched; the trie is untouched in that
	/// case.
	pub fn remove_subscription<P>(
		&mut self,
		topic: &TopicPatternPath,
		predicate: P,
	) -> Result<Option<SubscriptionId>, CounterError>
	where
		P: Fn(&T) -> bool,
	{
		let removed = self
			.topic_matcher
			.update_node(topic.slice(), |table| {
				let pos = table.iter().position(|(_, s)| predicate(s))?;
				Some(table.remove(pos).0)
			})
			.and_then(|(removed, _)| removed);

		let Some(id) = removed else {
			return Ok(None);
		};
		let count = self.counter.decrement(topic.pattern())?;
		debug!(pattern = %topic, subscription_id = %id, count, "Subscription removed");
		Ok(Some(id))
	}

	/// All subscriptions whose pattern matches `topic`, in registration
	/// order. A subscription appears once per matching registration.
	pub fn get_subscribers<'a>(
		&'a self,
		topic: &TopicPath,
	) -> Vec<(SubscriptionId, &'a T)> {
		let mut subscribers: Vec<_> = self
			.topic_matcher
			.find_by_path(topic)
			.into_iter()
			.flat_map(|table| table.iter())
			.map(|(id, subscription)| (*id, subscription))
			.collect();
		subscribers.sort_by_key(|(id, _)| *id);
		subscribers
	}

	pub fn subscription_count(&self, pattern: &str) -> usize {
		self.counter.count(pattern)
	}

	pub fn is_subscribed(&self, pattern: &str) -> bool {
		self.counter.includes(pattern)
	}

	/// Total number of live subscriptions across all patterns
	pub fn len(&self) -> usize {
		self.counter
			.patterns()
			.map(|pattern| self.counter.count(pattern))
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.counter.is_empty()
	}

	/// Number of trie nodes, including the root
	pub fn node_count(&self) -> usize {
		self.topic_matcher.node_count()
	}

	/// Drops every subscription and resets the trie to a bare root
	pub fn cleanup(&mut self) {
		self.topic_matcher = TopicMatcherNode::new();
		self.counter.clear();
	}
}
