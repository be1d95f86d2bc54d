//! Change-detection fingerprints over store snapshots.
//!
//! The list endpoint returns a fingerprint alongside the snapshot it was
//! computed from; clients use it as an ETag-style validator. Identical
//! snapshots yield identical tokens; any content or order change yields a
//! different one with overwhelming probability.

use sha2::{Digest, Sha256};

use crate::types::{Tweet, TweetId};

/// SHA-256 over the ordered snapshot content, hex encoded.
///
/// Every field is length-delimited before hashing so adjacent entries cannot
/// run together, and a missing avatar hashes differently from an empty one.
pub fn fingerprint(snapshot: &[(TweetId, Tweet)]) -> String {
    let mut hasher = Sha256::new();
    for (id, tweet) in snapshot {
        hasher.update(id.as_micros().to_be_bytes());
        update_field(&mut hasher, Some(&tweet.message));
        update_field(&mut hasher, tweet.avatar.as_deref());
    }
    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, field: Option<&str>) {
    match field {
        Some(value) => {
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value.as_bytes());
        }
        // No string is this long, so the marker cannot collide with a length.
        None => hasher.update(u64::MAX.to_be_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, message: &str, avatar: Option<&str>) -> (TweetId, Tweet) {
        (
            TweetId::from_micros(id),
            Tweet {
                message: message.to_string(),
                avatar: avatar.map(String::from),
            },
        )
    }

    #[test]
    fn test_same_content_same_token() {
        let a = vec![entry(1, "hello", Some("a.png")), entry(2, "world", None)];
        let b = vec![entry(1, "hello", Some("a.png")), entry(2, "world", None)];
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_insert_changes_token() {
        let mut snapshot = vec![entry(1, "hello", None)];
        let before = fingerprint(&snapshot);
        snapshot.push(entry(2, "world", None));
        assert_ne!(before, fingerprint(&snapshot));
    }

    #[test]
    fn test_order_changes_token() {
        let forward = vec![entry(1, "a", None), entry(2, "b", None)];
        let backward = vec![entry(2, "b", None), entry(1, "a", None)];
        assert_ne!(fingerprint(&forward), fingerprint(&backward));
    }

    #[test]
    fn test_missing_avatar_differs_from_empty() {
        let none = vec![entry(1, "x", None)];
        let empty = vec![entry(1, "x", Some(""))];
        assert_ne!(fingerprint(&none), fingerprint(&empty));
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        let a = vec![entry(1, "ab", Some("c"))];
        let b = vec![entry(1, "a", Some("bc"))];
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
