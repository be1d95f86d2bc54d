//! Tweet Streaming Server
//!
//! An append-only tweet store that delivers every newly created tweet, in
//! real time, to any number of concurrently connected subscribers over
//! Server-Sent Events.
//!
//! # Features
//!
//! - **Append-only store**: tweets are immutable, keyed by unique
//!   time-ordered identifiers, never updated or deleted
//! - **Atomic create-and-publish**: a created tweet is stored and fanned out
//!   to every live subscriber, or the create fails with nothing committed
//! - **Change fingerprints**: snapshot reads carry a deterministic digest of
//!   the full content, usable as an ETag validator
//! - **Per-subscriber sessions**: each stream is a lazy, cancellable event
//!   sequence that ends cleanly on disconnect or server shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use chirp_stream::{server, types::ServerOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = ServerOptions {
//!         port: 4000,
//!         host: "127.0.0.1".to_string(),
//!         ..Default::default()
//!     };
//!
//!     server::start_server(options).await.unwrap();
//! }
//! ```
//!
//! # Protocol
//!
//! ## Creating a tweet
//!
//! ```text
//! POST /tweets HTTP/1.1
//! Content-Type: application/json
//!
//! {"tweet": {"message": "hello", "avatar": "a.png"}}
//!
//! Response: 201 Created
//! Location: /tweets/1700000000123456
//!
//! {"id":"1700000000123456","message":"hello","avatar":"a.png"}
//! ```
//!
//! ## Listing tweets
//!
//! ```text
//! GET /tweets HTTP/1.1
//!
//! Response: 200 OK
//! ETag: "9f8e..."
//!
//! {"tweets":[{"id":"1700000000123456","message":"hello","avatar":"a.png"}]}
//! ```
//!
//! ## Streaming new tweets
//!
//! ```text
//! GET /tweets HTTP/1.1
//! Accept: text/event-stream
//!
//! id: 1700000000123457
//! data: {"id":"1700000000123457","message":"hi","avatar":null}
//!
//! ```

pub mod broadcast;
pub mod fingerprint;
pub mod id;
pub mod server;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use broadcast::{BroadcastError, Broadcaster, StreamEvent, Subscription};
pub use server::{create_router, start_server, AppState};
pub use store::{Snapshot, StoreError, TweetStore};
pub use types::{PublishedTweet, ServerOptions, Tweet, TweetId};
