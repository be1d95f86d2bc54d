//! In-memory tweet storage.
//!
//! Insert-only: tweets are never updated or deleted, and the store lives for
//! the process lifetime. It is constructed explicitly and handed to callers
//! through application state rather than living in a global.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::id::IdGenerator;
use crate::types::{Tweet, TweetId};

/// Error types for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("tweet capacity exhausted ({0} stored)")]
    Exhausted(usize),
}

/// Point-in-time copy of the store contents, in id (= insertion) order.
pub type Snapshot = Vec<(TweetId, Tweet)>;

/// Insert-only tweet store keyed by monotonically increasing identifiers.
#[derive(Debug)]
pub struct TweetStore {
    tweets: RwLock<BTreeMap<TweetId, Tweet>>,
    ids: IdGenerator,
    max_tweets: Option<usize>,
}

impl TweetStore {
    /// Create a new empty, unbounded store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a store that refuses inserts beyond `max_tweets`.
    pub fn bounded(max_tweets: usize) -> Arc<Self> {
        Arc::new(Self {
            max_tweets: Some(max_tweets),
            ..Self::default()
        })
    }

    /// Store a tweet under a fresh identifier and return that identifier.
    ///
    /// The identifier is drawn inside the write critical section, so ids are
    /// issued in insertion order and an insert can never collide with an
    /// existing key. Never blocks on subscribers or I/O.
    pub fn insert(&self, tweet: Tweet) -> Result<TweetId, StoreError> {
        let mut tweets = self.tweets.write();

        if let Some(limit) = self.max_tweets {
            if tweets.len() >= limit {
                return Err(StoreError::Exhausted(tweets.len()));
            }
        }

        let id = self.ids.next();
        let replaced = tweets.insert(id, tweet);
        debug_assert!(replaced.is_none(), "id generator issued a duplicate");

        debug!(%id, "stored tweet");
        Ok(id)
    }

    /// Consistent copy of every stored tweet, ordered by id.
    ///
    /// Two snapshots with no intervening insert are identical, which is what
    /// keeps the fingerprint stable between writes.
    pub fn snapshot(&self) -> Snapshot {
        let tweets = self.tweets.read();
        tweets.iter().map(|(id, t)| (*id, t.clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.tweets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.read().is_empty()
    }
}

impl Default for TweetStore {
    fn default() -> Self {
        Self {
            tweets: RwLock::new(BTreeMap::new()),
            ids: IdGenerator::new(),
            max_tweets: None,
        }
    }
}
