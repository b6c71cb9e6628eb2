//! Key encoding for records and index entries.
//!
//! All persisted layout in this crate is the key-naming scheme defined here,
//! ensuring consistent formats across record and index shards:
//!
//! - records: `{kind}:{id}`
//! - primary index entries: `i:{id}`
//! - secondary index entries: `field:{value}:entity:{id}`
//! - compound index entries: `compound:{v1}:{v2}:...:entity:{id}`
//! - recency index entries: `sort:{padded_reversed_ts}:{id}`
//!
//! Entity IDs are encoded into the keys themselves, so membership queries
//! never need to fetch a document; the cost is that an index must be
//! explicitly repaired if an indexed field changes outside the maintained
//! mutation path.

use crate::error::{Result, StoreError};

/// Largest integer exactly representable in an IEEE-754 double (2^53 − 1).
/// Reversing timestamps against this bound keeps recency keys compatible
/// with substrates and clients that treat numbers as doubles.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Fixed width of the reversed-timestamp segment in recency keys.
pub const TIMESTAMP_PAD: usize = 20;

/// Prefix of every primary-index entry key.
pub const PRIMARY_PREFIX: &str = "i:";

/// Prefix of every recency-index entry key.
pub const RECENCY_PREFIX: &str = "sort:";

/// Encode a record key: `{kind}:{id}`
///
/// # Examples
///
/// ```
/// use campusdb_store::key_encoding::record_key;
///
/// assert_eq!(record_key("grade", "g1"), "grade:g1");
/// ```
pub fn record_key(kind: &str, id: &str) -> String {
    let mut s = String::with_capacity(kind.len() + 1 + id.len());
    s.push_str(kind);
    s.push(':');
    s.push_str(id);
    s
}

/// Encode a primary-index entry key: `i:{id}`
pub fn primary_entry_key(id: &str) -> String {
    format!("{PRIMARY_PREFIX}{id}")
}

/// Recover the entity ID from a primary-index entry key.
pub fn primary_entry_id(key: &str) -> Option<&str> {
    key.strip_prefix(PRIMARY_PREFIX)
}

/// Encode a secondary-index entry key: `field:{value}:entity:{id}`
///
/// # Examples
///
/// ```
/// use campusdb_store::key_encoding::secondary_entry_key;
///
/// assert_eq!(
///     secondary_entry_key("s1", "g1"),
///     "field:s1:entity:g1"
/// );
/// ```
pub fn secondary_entry_key(value: &str, id: &str) -> String {
    format!("field:{value}:entity:{id}")
}

/// Prefix shared by every entry of one secondary-index bucket.
pub fn secondary_value_prefix(value: &str) -> String {
    format!("field:{value}:entity:")
}

/// Encode a compound-index entry key: `compound:{v1}:{v2}:...:entity:{id}`
pub fn compound_entry_key(values: &[&str], id: &str) -> String {
    format!("compound:{}:entity:{id}", values.join(":"))
}

/// Prefix shared by every entry of one compound-index bucket.
pub fn compound_value_prefix(values: &[&str]) -> String {
    format!("compound:{}:entity:", values.join(":"))
}

/// Recover the entity ID from an index entry key, given the full bucket
/// prefix the key was written under.
pub fn entity_id_after<'a>(key: &'a str, bucket_prefix: &str) -> Option<&'a str> {
    key.strip_prefix(bucket_prefix)
}

/// Parse an RFC 3339 timestamp into Unix milliseconds.
pub fn epoch_millis(date: &str) -> Result<i64> {
    chrono::DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| StoreError::InvalidDate(date.to_string()))
}

/// Encode a recency-index entry key: `sort:{padded_reversed_ts}:{id}`
///
/// The timestamp is reversed against [`MAX_SAFE_INTEGER`] and zero-padded to
/// a fixed width, so ascending lexicographic key order equals descending
/// chronological order. Entries with identical timestamps order by entity ID.
///
/// # Examples
///
/// ```
/// use campusdb_store::key_encoding::recency_entry_key;
///
/// let newer = recency_entry_key("2026-03-02T08:00:00Z", "a2").unwrap();
/// let older = recency_entry_key("2026-03-01T08:00:00Z", "a1").unwrap();
/// assert!(newer < older);
/// ```
pub fn recency_entry_key(date: &str, id: &str) -> Result<String> {
    let reversed = MAX_SAFE_INTEGER - epoch_millis(date)?;
    Ok(format!(
        "{}{:0width$}:{}",
        RECENCY_PREFIX,
        reversed,
        id,
        width = TIMESTAMP_PAD
    ))
}

/// Recover the entity ID from a recency-index entry key.
pub fn recency_entry_id(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(RECENCY_PREFIX)?;
    // Skip the fixed-width reversed timestamp and its separator.
    if rest.len() <= TIMESTAMP_PAD || rest.as_bytes()[TIMESTAMP_PAD] != b':' {
        return None;
    }
    Some(&rest[TIMESTAMP_PAD + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_primary_keys() {
        assert_eq!(record_key("user", "u1"), "user:u1");
        assert_eq!(primary_entry_key("u1"), "i:u1");
        assert_eq!(primary_entry_id("i:u1"), Some("u1"));
        assert_eq!(primary_entry_id("x:u1"), None);
    }

    #[test]
    fn test_secondary_keys_preserve_ids_with_colons() {
        let key = secondary_entry_key("fall:2026", "g:1");
        assert_eq!(key, "field:fall:2026:entity:g:1");
        let prefix = secondary_value_prefix("fall:2026");
        assert_eq!(entity_id_after(&key, &prefix), Some("g:1"));
    }

    #[test]
    fn test_compound_keys_join_values_in_order() {
        let key = compound_entry_key(&["s1", "c1"], "g1");
        assert_eq!(key, "compound:s1:c1:entity:g1");
        assert_eq!(
            entity_id_after(&key, &compound_value_prefix(&["s1", "c1"])),
            Some("g1")
        );
    }

    #[test]
    fn test_recency_keys_sort_newest_first() {
        let d1 = recency_entry_key("2026-01-01T00:00:00Z", "a").unwrap();
        let d2 = recency_entry_key("2026-01-02T00:00:00Z", "b").unwrap();
        let d3 = recency_entry_key("2026-01-03T00:00:00Z", "c").unwrap();
        let mut keys = vec![d1.clone(), d3.clone(), d2.clone()];
        keys.sort();
        assert_eq!(keys, vec![d3, d2, d1]);
    }

    #[test]
    fn test_recency_ties_order_by_entity_id() {
        let a = recency_entry_key("2026-01-01T00:00:00Z", "a").unwrap();
        let b = recency_entry_key("2026-01-01T00:00:00Z", "b").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_recency_entry_id_round_trip() {
        let key = recency_entry_key("2026-01-01T00:00:00Z", "g1").unwrap();
        assert_eq!(recency_entry_id(&key), Some("g1"));
        assert_eq!(recency_entry_id("sort:short"), None);
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = recency_entry_key("not-a-date", "g1").unwrap_err();
        assert!(matches!(err, StoreError::InvalidDate(_)));
    }

    #[test]
    fn test_same_date_recomputes_identical_key() {
        let k1 = recency_entry_key("2026-05-01T10:30:00Z", "x").unwrap();
        let k2 = recency_entry_key("2026-05-01T10:30:00Z", "x").unwrap();
        assert_eq!(k1, k2);
    }
}
