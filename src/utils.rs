//! Utility functions shared across the pipeline.

pub mod safe_cast;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hash of a text document, used to detect changes in the config store
#[must_use]
pub fn content_hash(content: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}
