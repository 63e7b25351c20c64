//! Internal implementation of annotation identifiers.

use crate::{IdError, IdResult};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::borrow::Borrow;
use std::{fmt, str::FromStr};

/// Prefix shared by every annotation identifier.
pub const ID_PREFIX: &str = "ann_";

/// Length of the random suffix on freshly minted identifiers.
pub const SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Canonical annotation identifier (`ann_<unix-millis>_<suffix>`).
///
/// This wrapper type guarantees that once constructed, the contained string is in canonical
/// form. It borrows as `str`, so maps keyed by `AnnotationId` can be queried with the raw
/// strings found in document slots.
///
/// # Construction
/// - [`AnnotationId::generate`] mints a fresh identifier from the current time.
/// - [`AnnotationIdGenerator::next_id`] mints identifiers with strictly increasing timestamps.
/// - [`AnnotationId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Mints a new identifier stamped with the current time.
    ///
    /// Two calls within the same millisecond differ only by their random suffix. Use an
    /// [`AnnotationIdGenerator`] when ordering matters.
    pub fn generate() -> Self {
        Self::from_parts(Utc::now().timestamp_millis(), &random_suffix())
    }

    fn from_parts(millis: i64, suffix: &str) -> Self {
        Self(format!("{ID_PREFIX}{millis}_{suffix}"))
    }

    /// Validates and parses an identifier string that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not a canonical annotation identifier.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_string()));
        }
        Err(IdError::InvalidInput(format!(
            "annotation id must look like 'ann_<millis>_<base36 suffix>', got: '{}'",
            input
        )))
    }

    /// Returns true if `input` is a canonical annotation identifier.
    ///
    /// This is a purely syntactic check:
    /// - starts with `ann_`
    /// - followed by one or more ASCII digits
    /// - then `_` and 1 to 9 lowercase base36 characters
    pub fn is_canonical(input: &str) -> bool {
        let Some(rest) = input.strip_prefix(ID_PREFIX) else {
            return false;
        };
        let Some((millis, suffix)) = rest.split_once('_') else {
            return false;
        };

        !millis.is_empty()
            && millis.bytes().all(|b| b.is_ascii_digit())
            && (1..=SUFFIX_LEN).contains(&suffix.len())
            && suffix
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z'))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the mint time encoded in the identifier.
    ///
    /// Returns `None` when the millisecond component does not fit a valid timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let millis = self
            .0
            .strip_prefix(ID_PREFIX)
            .and_then(|rest| rest.split_once('_'))
            .and_then(|(millis, _)| millis.parse::<i64>().ok())?;
        DateTime::<Utc>::from_timestamp_millis(millis)
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AnnotationId {
    type Err = IdError;

    /// Equivalent to [`AnnotationId::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnnotationId::parse(s)
    }
}

impl AsRef<str> for AnnotationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AnnotationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<AnnotationId> for String {
    fn from(id: AnnotationId) -> Self {
        id.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AnnotationId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AnnotationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AnnotationId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Mints identifiers whose timestamp part strictly increases.
///
/// If the clock has not advanced (or went backwards) since the previous identifier, the new
/// timestamp is the previous one plus 1 ms. One generator lives inside each annotation store.
#[derive(Clone, Debug, Default)]
pub struct AnnotationIdGenerator {
    last_millis: Option<i64>,
}

impl AnnotationIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints the next identifier.
    pub fn next_id(&mut self) -> AnnotationId {
        let now = Utc::now().timestamp_millis();
        let millis = match self.last_millis {
            Some(prev) if now <= prev => prev + 1,
            _ => now,
        };
        self.last_millis = Some(millis);
        AnnotationId::from_parts(millis, &random_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generate_produces_canonical_id() {
        let id = AnnotationId::generate();
        let text = id.to_string();

        assert!(text.starts_with("ann_"));
        assert!(AnnotationId::is_canonical(&text));
        assert_eq!(text.rsplit('_').next().map(str::len), Some(SUFFIX_LEN));
    }

    #[test]
    fn test_parse_valid_id() {
        let id = AnnotationId::parse("ann_1736604922045_k3j9x0q2m").unwrap();
        assert_eq!(id.as_str(), "ann_1736604922045_k3j9x0q2m");
    }

    #[test]
    fn test_parse_accepts_short_suffix() {
        assert!(AnnotationId::parse("ann_1736604922045_k3j").is_ok());
    }

    #[test]
    fn test_parse_rejects_literal_text() {
        let result = AnnotationId::parse("funding");

        match result {
            Err(IdError::InvalidInput(msg)) => assert!(msg.contains("ann_<millis>")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_is_canonical_invalid() {
        // Missing prefix
        assert!(!AnnotationId::is_canonical("1736604922045_k3j9x0q2m"));

        // Uppercase suffix
        assert!(!AnnotationId::is_canonical("ann_1736604922045_K3J9X0Q2M"));

        // Suffix too long
        assert!(!AnnotationId::is_canonical("ann_1736604922045_k3j9x0q2mm"));

        // Empty suffix
        assert!(!AnnotationId::is_canonical("ann_1736604922045_"));

        // Non-numeric timestamp
        assert!(!AnnotationId::is_canonical("ann_17366x4922045_k3j9x0q2m"));

        // Missing timestamp
        assert!(!AnnotationId::is_canonical("ann__k3j9x0q2m"));

        // Empty string
        assert!(!AnnotationId::is_canonical(""));
    }

    #[test]
    fn test_timestamp_round_trip() {
        let id = AnnotationId::parse("ann_1736604922045_k3j9x0q2m").unwrap();
        let ts = id.timestamp().expect("timestamp should decode");
        assert_eq!(ts.timestamp_millis(), 1_736_604_922_045);
    }

    #[test]
    fn test_generator_timestamps_strictly_increase() {
        let mut generator = AnnotationIdGenerator::new();
        let ids: Vec<_> = (0..50).map(|_| generator.next_id()).collect();

        for pair in ids.windows(2) {
            let first = pair[0].timestamp().unwrap();
            let second = pair[1].timestamp().unwrap();
            assert!(second > first, "{} should follow {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_borrow_allows_str_lookup() {
        let id = AnnotationId::generate();
        let mut map = HashMap::new();
        map.insert(id.clone(), 7);

        assert_eq!(map.get(id.as_str()), Some(&7));
        assert_eq!(map.get("Cats"), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let id = AnnotationId::parse("ann_1736604922045_k3j9x0q2m").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ann_1736604922045_k3j9x0q2m\"");

        let back: AnnotationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let bad: Result<AnnotationId, _> = serde_json::from_str("\"mice\"");
        assert!(bad.is_err());
    }
}
