//! Topic handling module
//!
//! Parsing of concrete topics and wildcard patterns, the trie that matches
//! one against the other, and the router that keeps per-pattern
//! subscription bookkeeping on top of it.

pub mod error;
pub mod topic_matcher;
pub mod topic_path;
pub mod topic_pattern_item;
pub mod topic_pattern_path;
pub mod topic_router;
pub mod topic_syntax;


pub use error::TopicError;
pub use topic_path::{TopicNameError, TopicPath};
pub use topic_pattern_item::{TopicPatternError, TopicPatternItem};
pub use topic_pattern_path::TopicPatternPath;
pub use topic_router::{SubscriptionId, TopicRouter};
pub use topic_syntax::{TopicSyntax, TopicSyntaxError};
