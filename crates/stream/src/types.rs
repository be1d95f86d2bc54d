//! Core types for the tweet streaming server.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a stored tweet.
///
/// The value is the creation time in microseconds since the Unix epoch,
/// bumped by the generator where necessary to stay strictly increasing (see
/// [`crate::id::IdGenerator`]). On the wire it is a decimal integer string,
/// used both as the JSON `id` field and as the SSE `id:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweetId(u64);

impl TweetId {
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TweetId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl Serialize for TweetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TweetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A tweet as submitted by a client. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    /// Text payload, required
    pub message: String,
    /// Image reference, optional
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A stored tweet together with its identifier, in the wire shape
/// `{"id":"<decimal-micros>","message":...,"avatar":...}`.
///
/// Used for the create response, list entries, and SSE `data:` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedTweet {
    pub id: TweetId,
    pub message: String,
    pub avatar: Option<String>,
}

impl PublishedTweet {
    pub fn new(id: TweetId, tweet: &Tweet) -> Self {
        Self {
            id,
            message: tweet.message.clone(),
            avatar: tweet.avatar.clone(),
        }
    }

    /// Public resource path for this tweet.
    pub fn location(&self) -> String {
        format!("/tweets/{}", self.id)
    }
}

/// Server configuration options.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (0 for auto-assign)
    pub port: u16,
    /// Upper bound on stored tweets (None for unbounded)
    pub max_tweets: Option<usize>,
    /// Interval between SSE keep-alive comments, in seconds
    pub keep_alive_seconds: u64,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            max_tweets: None,
            keep_alive_seconds: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_decimal_round_trip() {
        let id = TweetId::from_micros(1_700_000_000_123_456);
        assert_eq!(id.to_string(), "1700000000123456");
        assert_eq!("1700000000123456".parse::<TweetId>().unwrap(), id);
        assert!("not-a-number".parse::<TweetId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = TweetId::from_micros(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        let back: TweetId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_order_matches_value_order() {
        let a = TweetId::from_micros(100);
        let b = TweetId::from_micros(101);
        assert!(a < b);
    }

    #[test]
    fn test_tweet_avatar_defaults_to_none() {
        let tweet: Tweet = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(tweet.message, "hi");
        assert_eq!(tweet.avatar, None);

        let tweet: Tweet = serde_json::from_str(r#"{"message":"hi","avatar":null}"#).unwrap();
        assert_eq!(tweet.avatar, None);
    }

    #[test]
    fn test_published_tweet_wire_shape() {
        let tweet = Tweet {
            message: "hello".to_string(),
            avatar: Some("a.png".to_string()),
        };
        let published = PublishedTweet::new(TweetId::from_micros(7), &tweet);
        assert_eq!(
            serde_json::to_string(&published).unwrap(),
            r#"{"id":"7","message":"hello","avatar":"a.png"}"#
        );
        assert_eq!(published.location(), "/tweets/7");
    }
}
