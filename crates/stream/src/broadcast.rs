//! Publish/subscribe hub distributing newly created tweets to live
//! subscribers.
//!
//! The hub keeps one unbounded channel per subscriber in a keyed registry.
//! Publishing fans a tweet out to every registered channel with non-blocking
//! sends, so a slow or dead subscriber can never stall the publisher or the
//! other subscribers; a subscriber whose receiving end is gone is simply
//! unregistered. Shutting the hub down delivers a terminal event to every
//! live subscription so its session can end instead of hanging.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::types::PublishedTweet;

/// Error types for hub operations.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("broadcaster is shut down")]
    Closed,
}

/// One delivery to a subscriber.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A newly published tweet.
    Tweet(Arc<PublishedTweet>),
    /// Terminal event: the broadcaster has shut down.
    Closed,
}

#[derive(Default)]
struct Registry {
    next_key: u64,
    subscribers: HashMap<u64, mpsc::UnboundedSender<StreamEvent>>,
    closed: bool,
}

/// Fan-out hub: publishers push created tweets, every live subscription
/// receives each of them exactly once, in publish order.
pub struct Broadcaster {
    registry: Mutex<Registry>,
}

impl Broadcaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registry: Mutex::new(Registry::default()),
        })
    }

    /// Register a new subscriber.
    ///
    /// Succeeds regardless of how many tweets have been published; fails only
    /// once the broadcaster has shut down.
    pub fn subscribe(self: &Arc<Self>) -> Result<Subscription, BroadcastError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut registry = self.registry.lock();
        if registry.closed {
            return Err(BroadcastError::Closed);
        }
        let key = registry.next_key;
        registry.next_key += 1;
        registry.subscribers.insert(key, tx);
        debug!(key, subscribers = registry.subscribers.len(), "subscribed");

        Ok(Subscription {
            key,
            rx,
            hub: Arc::clone(self),
            terminated: false,
        })
    }

    /// Deliver a tweet to every subscription registered at the moment of the
    /// call. Returns the number of subscribers reached.
    ///
    /// Sends are non-blocking, so the registry lock is held across the loop;
    /// that serializes racing publishes and gives every subscriber the same
    /// delivery order. A failed send means that subscriber's receiving end is
    /// gone; it is unregistered here without affecting the others.
    pub fn publish(&self, tweet: Arc<PublishedTweet>) -> usize {
        let mut registry = self.registry.lock();
        if registry.closed {
            return 0;
        }

        let mut dead = Vec::new();
        let mut delivered = 0;
        for (key, tx) in registry.subscribers.iter() {
            match tx.send(StreamEvent::Tweet(Arc::clone(&tweet))) {
                Ok(()) => delivered += 1,
                Err(_) => dead.push(*key),
            }
        }
        for key in dead {
            registry.subscribers.remove(&key);
            debug!(key, "unregistered dead subscriber at publish");
        }
        delivered
    }

    /// Shut the hub down. Every active subscription observes a terminal
    /// [`StreamEvent::Closed`], and later `subscribe` calls fail. Idempotent.
    pub fn shutdown(&self) {
        let mut registry = self.registry.lock();
        if registry.closed {
            return;
        }
        registry.closed = true;
        for (_, tx) in registry.subscribers.drain() {
            // A receiver that is already gone is fine.
            let _ = tx.send(StreamEvent::Closed);
        }
        info!("broadcaster shut down");
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }

    /// Remove a subscription. Idempotent; unknown keys are a no-op.
    fn unsubscribe(&self, key: u64) {
        let mut registry = self.registry.lock();
        if registry.subscribers.remove(&key).is_some() {
            debug!(key, subscribers = registry.subscribers.len(), "unsubscribed");
        }
    }
}

/// One observer's registration with the [`Broadcaster`]: a lazy sequence of
/// published tweets.
///
/// [`Subscription::next_event`] suspends until the next delivery, without
/// polling. Dropping the subscription unregisters it from the hub, so an
/// abandoned connection cannot accumulate undelivered events.
pub struct Subscription {
    key: u64,
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    hub: Arc<Broadcaster>,
    terminated: bool,
}

impl Subscription {
    /// Next published tweet, or `None` once the stream has terminated
    /// (broadcaster shutdown or this registration removed).
    ///
    /// Termination is absorbing: after the first `None`, every later call
    /// returns `None` without touching the channel.
    pub async fn next_event(&mut self) -> Option<Arc<PublishedTweet>> {
        if self.terminated {
            return None;
        }
        match self.rx.recv().await {
            Some(StreamEvent::Tweet(tweet)) => Some(tweet),
            Some(StreamEvent::Closed) | None => {
                self.terminated = true;
                None
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.key);
    }
}
