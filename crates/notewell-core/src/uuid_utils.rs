//! UUIDv7 utilities for time-ordered identifiers.
//!
//! All notewell entities use UUIDv7 primary keys: the embedded millisecond
//! timestamp makes freshly inserted rows sort chronologically, which the
//! version-history pruning order relies on as a tiebreaker.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Check whether a UUID is version 7.
pub fn is_v7(id: &Uuid) -> bool {
    id.get_version_num() == 7
}

/// Extract the embedded timestamp from a UUIDv7.
///
/// Returns `None` for non-v7 UUIDs.
pub fn extract_timestamp(id: &Uuid) -> Option<DateTime<Utc>> {
    if !is_v7(id) {
        return None;
    }
    let bytes = id.as_bytes();
    let millis = ((bytes[0] as u64) << 40)
        | ((bytes[1] as u64) << 32)
        | ((bytes[2] as u64) << 24)
        | ((bytes[3] as u64) << 16)
        | ((bytes[4] as u64) << 8)
        | (bytes[5] as u64);
    Utc.timestamp_millis_opt(millis as i64).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_v7_is_version_7() {
        assert!(is_v7(&new_v7()));
    }

    #[test]
    fn test_v4_is_not_v7() {
        assert!(!is_v7(&Uuid::new_v4()));
    }

    #[test]
    fn test_extract_timestamp_close_to_now() {
        let before = Utc::now();
        let id = new_v7();
        let ts = extract_timestamp(&id).expect("v7 timestamp");
        let diff = (ts - before).num_milliseconds().abs();
        assert!(diff < 1000, "timestamp {} ms off", diff);
    }

    #[test]
    fn test_extract_timestamp_none_for_v4() {
        assert!(extract_timestamp(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_v7_ids_sort_chronologically() {
        let a = new_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_v7();
        assert!(a < b);
    }
}
