//! In-memory ordered index.
//!
//! [`BalancedIndex`] is an AVL tree keyed by a unique identifier. Each node
//! owns one [`Record`]: the key, an opaque value and a lifecycle [`Status`].
//! Traversals are materialized through an [`OrderedStack`].

mod avl;
mod stack;

pub use avl::BalancedIndex;
pub use stack::OrderedStack;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("key not found")]
    NotFound,

    #[error("key already exists")]
    KeyExists,

    /// Rebalancing produced a tree that breaks ordering or balance.
    #[error("index invariant violated: {0}")]
    InvariantViolation(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Lifecycle tag carried by every record, independent of its value.
///
/// Any status may move to any other status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Status {
    #[default]
    Pending,
    Ready,
    Completed,
}

/// The payload stored at a tree position.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<K, V> {
    key: K,
    value: V,
    status: Status,
}

impl<K, V> Record<K, V> {
    pub(crate) fn new(key: K, value: V, status: Status) -> Self {
        Self { key, value, status }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn into_value(self) -> V {
        self.value
    }
}
