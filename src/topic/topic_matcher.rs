#![allow(missing_docs)]
use std::collections::HashMap;

use arcstr::Substr;

use super::topic_path::TopicPath;
use super::topic_pattern_item::TopicPatternItem;
use super::topic_pattern_path::TopicPatternPath;

/// Node in the topic matching tree that represents one segment position.
/// Used internally by the `TopicRouter`.
#[derive(Debug)]
pub struct TopicMatcherNode<T> {
	/// Data for patterns terminating exactly at this node
	exact_match_data: Option<T>,

	/// Children nodes for exact matches of next segment
	exact_children: HashMap<Substr, TopicMatcherNode<T>>,

	/// Node for single-level wildcard match
	single_level_wildcard_node: Option<Box<TopicMatcherNode<T>>>,

	/// Data for multi-level wildcard match; always a leaf
	multi_level_wildcard_data: Option<T>,
}

pub trait Len {
	fn len(&self) -> usize;
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T> Len for Vec<T> {
	fn len(&self) -> usize {
		self.len()
	}
	fn is_empty(&self) -> bool {
		self.is_empty()
	}
}

impl<T: Default + Len> Default for TopicMatcherNode<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Default + Len> TopicMatcherNode<T> {
	/// Creates a new empty topic matcher node
	pub fn new() -> Self {
		Self {
			exact_match_data: None,
			exact_children: HashMap::new(),
			single_level_wildcard_node: None,
			multi_level_wildcard_data: None,
		}
	}

	/// True when the node holds no data and has no children, i.e. it can be
	/// pruned from its parent.
	pub fn is_empty(&self) -> bool {
		self.exact_match_data.as_ref().is_none_or(T::is_empty)
			&& self.exact_children.is_empty()
			&& self.single_level_wildcard_node.is_none()
			&& self
				.multi_level_wildcard_data
				.as_ref()
				.is_none_or(T::is_empty)
	}

	/// Number of nodes in this subtree, counting the multi-level holder as a
	/// node of its own.
	pub fn node_count(&self) -> usize {
		1 + self
			.exact_children
			.values()
			.map(TopicMatcherNode::node_count)
			.sum::<usize>()
			+ self
				.single_level_wildcard_node
				.as_ref()
				.map_or(0, |node| node.node_count())
			+ usize::from(self.multi_level_wildcard_data.is_some())
	}

	/// Finds or creates the subscription data entry for the given pattern
	pub fn get_or_create_subscription_table(
		&mut self,
		topic_path: &TopicPatternPath,
	) -> &mut T {
		let mut current_node = self;

		for segment in topic_path.iter() {
			match segment {
				| TopicPatternItem::Str(s) => {
					current_node = current_node
						.exact_children
						.entry(s.clone())
						.or_default()
				}
				| TopicPatternItem::Plus => {
					current_node = current_node
						.single_level_wildcard_node
						.get_or_insert_with(|| Box::new(TopicMatcherNode::new()))
				}
				| TopicPatternItem::Hash => {
					// Hash wildcard must be the last segment, so we can return immediately
					return current_node
						.multi_level_wildcard_data
						.get_or_insert_with(T::default);
				}
			}
		}
		current_node.exact_match_data.get_or_insert_with(T::default)
	}

	/// Looks up the subscription data for a pattern without creating nodes.
	pub fn get_subscription_table(
		&self,
		topic_path: &[TopicPatternItem],
	) -> Option<&T> {
		match topic_path {
			| [] => self.exact_match_data.as_ref(),
			| [TopicPatternItem::Hash, ..] => {
				self.multi_level_wildcard_data.as_ref()
			}
			| [TopicPatternItem::Plus, rest @ ..] => self
				.single_level_wildcard_node
				.as_ref()?
				.get_subscription_table(rest),
			| [TopicPatternItem::Str(s), rest @ ..] => {
				self.exact_children.get(s)?.get_subscription_table(rest)
			}
		}
	}

	/// Applies `f` to the data stored for `topic_path` and prunes every node
	/// left empty on the way back up.
	///
	/// Returns `None` without calling `f` if any segment of the path is
	/// absent. Otherwise returns `f`'s result and whether this node is now
	/// empty.
	pub fn update_node<F, R>(
		&mut self,
		topic_path: &[TopicPatternItem],
		f: F,
	) -> Option<(R, bool)>
	where
		F: FnOnce(&mut T) -> R,
	{
		let Some((current_segment, rest_segments)) = topic_path.split_first()
		else {
			let data = self.exact_match_data.as_mut()?;
			let res = f(data);
			if data.is_empty() {
				self.exact_match_data = None
			}
			return Some((res, self.is_empty()));
		};

		match current_segment {
			| TopicPatternItem::Str(s) => {
				let child_node = self.exact_children.get_mut(s)?;
				let (res, child_empty) =
					child_node.update_node(rest_segments, f)?;
				if child_empty {
					self.exact_children.remove(s);
				}
				Some((res, self.is_empty()))
			}
			| TopicPatternItem::Plus => {
				let child_node = self.single_level_wildcard_node.as_mut()?;
				let (res, child_empty) =
					child_node.update_node(rest_segments, f)?;
				if child_empty {
					self.single_level_wildcard_node = None;
				}
				Some((res, self.is_empty()))
			}
			| TopicPatternItem::Hash => {
				let hash_wildcard_data =
					self.multi_level_wildcard_data.as_mut()?;
				let res = f(hash_wildcard_data);
				if hash_wildcard_data.is_empty() {
					self.multi_level_wildcard_data = None;
				}
				Some((res, self.is_empty()))
			}
		}
	}

	/// Recursively collects all subscription data that matches the given topic path segments
	fn collect_matching_subscriptions<'a>(
		&'a self,
		topic: &[Substr],
		matching_data: &mut Vec<&'a T>,
	) {
		// Multi-level wildcard consumes the remainder of the path, including
		// an empty remainder
		matching_data.extend(self.multi_level_wildcard_data.iter());

		match topic {
			| [] => {
				matching_data.extend(self.exact_match_data.iter());
			}
			| [segment, remaining_segments @ ..] => {
				if let Some(child) = self.exact_children.get(segment) {
					child.collect_matching_subscriptions(
						remaining_segments,
						matching_data,
					);
				}
				if let Some(plus_node) = &self.single_level_wildcard_node {
					plus_node.collect_matching_subscriptions(
						remaining_segments,
						matching_data,
					);
				}
			}
		}
	}

	/// Finds all subscription data entries matching the given topic path
	pub fn find_by_path<'a>(&'a self, topic: &TopicPath) -> Vec<&'a T> {
		let mut matching_subscribers = Vec::new();
		self.collect_matching_subscriptions(
			&topic.segments,
			&mut matching_subscribers,
		);
		matching_subscribers
	}
}
