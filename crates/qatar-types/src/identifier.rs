use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::{Uuid, Variant};

use crate::error::IdentifierError;

/// Width of an encoded identifier in bytes.
pub const IDENTIFIER_LEN: usize = 16;

/// Version nibble carried by every valid identifier (UUID v7).
const VERSION: u128 = 0x7;

const TIMESTAMP_SHIFT: u32 = 80;
const VERSION_SHIFT: u32 = 76;
const RAND_A_SHIFT: u32 = 64;
const VARIANT_SHIFT: u32 = 62;

const RAND_A_BITS: u32 = 12;
const RAND_B_BITS: u32 = 62;
const RAND_A_MASK: u128 = (1 << RAND_A_BITS) - 1;
const RAND_B_MASK: u128 = (1 << RAND_B_BITS) - 1;

/// Timestamp + random bits, viewed as one counter by [`Identifier::next`].
const COUNTER_BITS: u32 = 48 + RAND_A_BITS + RAND_B_BITS;
const COUNTER_MASK: u128 = (1 << COUNTER_BITS) - 1;

/// Last identifier handed out by [`Identifier::generate`] in this process.
static LAST_GENERATED: Mutex<Option<Identifier>> = Mutex::new(None);

/// Time-sortable unique identifier (UUID v7).
///
/// The 48-bit millisecond timestamp occupies the leading bytes, so the
/// byte-wise order of two identifiers equals their creation order. Ties
/// within one millisecond fall back to the random bits. Identifiers are used
/// verbatim as store keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct Identifier(Uuid);

impl Identifier {
    /// Generate a fresh identifier for the current instant.
    ///
    /// Within a process the result is strictly greater than every identifier
    /// previously returned by this function, even when the clock stalls.
    pub fn generate() -> Self {
        let candidate = Self(Uuid::now_v7());
        let mut last = LAST_GENERATED
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = match *last {
            Some(prev) if candidate <= prev => prev.next(),
            _ => candidate,
        };
        *last = Some(id);
        id
    }

    /// The identifier that follows `self` in key order.
    ///
    /// Timestamp and random bits are incremented as a single counter, so a
    /// carry out of the random bits moves the timestamp forward by one
    /// millisecond. The result is the smallest valid identifier strictly
    /// greater than `self`, except at the very top of the space, where it
    /// wraps to [`Identifier::MIN`]. Use [`checked_next`](Self::checked_next)
    /// to detect that case.
    pub fn next(&self) -> Self {
        let counter = Self::counter(self.0.as_u128());
        Self::from_counter((counter + 1) & COUNTER_MASK)
    }

    /// Like [`next`](Self::next), but `None` instead of wrapping.
    pub fn checked_next(&self) -> Option<Self> {
        let counter = Self::counter(self.0.as_u128());
        (counter < COUNTER_MASK).then(|| Self::from_counter(counter + 1))
    }

    /// Smallest valid identifier.
    pub const MIN: Self = Self(Uuid::from_u128(
        (VERSION << VERSION_SHIFT) | (0b10 << VARIANT_SHIFT),
    ));

    /// The smallest identifier carrying the given millisecond timestamp.
    ///
    /// Deterministic; used to seed test sequences and to build seek bounds
    /// ("everything enqueued at or after `ms`"). The timestamp field is 48
    /// bits wide, so `ms` saturates at [`Identifier::MAX_TIMESTAMP_MS`].
    pub fn with_timestamp_ms(ms: u64) -> Self {
        let ts = u128::from(ms.min(Self::MAX_TIMESTAMP_MS));
        Self::from_counter(ts << (RAND_A_BITS + RAND_B_BITS))
    }

    /// Largest millisecond timestamp an identifier can carry.
    pub const MAX_TIMESTAMP_MS: u64 = (1 << 48) - 1;

    /// Decode an identifier from its raw key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdentifierError> {
        if bytes.len() != IDENTIFIER_LEN {
            return Err(IdentifierError::InvalidLength {
                expected: IDENTIFIER_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; IDENTIFIER_LEN];
        arr.copy_from_slice(bytes);
        Self::try_from(Uuid::from_bytes(arr))
    }

    /// The raw 16 bytes, exactly as stored.
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        self.0.as_bytes()
    }

    /// Owned copy of the raw bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Milliseconds since the UNIX epoch at generation time.
    pub fn timestamp_ms(&self) -> u64 {
        (self.0.as_u128() >> TIMESTAMP_SHIFT) as u64
    }

    /// Short representation (last 8 hex characters, i.e. random bits).
    pub fn short_id(&self) -> String {
        hex::encode(&self.0.as_bytes()[12..])
    }

    fn counter(raw: u128) -> u128 {
        let ts = raw >> TIMESTAMP_SHIFT;
        let rand_a = (raw >> RAND_A_SHIFT) & RAND_A_MASK;
        let rand_b = raw & RAND_B_MASK;
        (ts << (RAND_A_BITS + RAND_B_BITS)) | (rand_a << RAND_B_BITS) | rand_b
    }

    fn from_counter(counter: u128) -> Self {
        let ts = counter >> (RAND_A_BITS + RAND_B_BITS);
        let rand_a = (counter >> RAND_B_BITS) & RAND_A_MASK;
        let rand_b = counter & RAND_B_MASK;
        Self(Uuid::from_u128(
            (ts << TIMESTAMP_SHIFT)
                | (VERSION << VERSION_SHIFT)
                | (rand_a << RAND_A_SHIFT)
                | (0b10 << VARIANT_SHIFT)
                | rand_b,
        ))
    }
}

impl TryFrom<Uuid> for Identifier {
    type Error = IdentifierError;

    fn try_from(uuid: Uuid) -> Result<Self, Self::Error> {
        let version = uuid.get_version_num();
        if version != VERSION as usize {
            return Err(IdentifierError::InvalidVersion(version as u8));
        }
        if uuid.get_variant() != Variant::RFC4122 {
            return Err(IdentifierError::InvalidVariant);
        }
        Ok(Self(uuid))
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::parse_str(s).map_err(|e| IdentifierError::InvalidString(e.to_string()))?;
        Self::try_from(uuid)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({}..{})", self.timestamp_ms(), self.short_id())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generate_is_strictly_increasing() {
        let mut prev = Identifier::generate();
        for _ in 0..1000 {
            let id = Identifier::generate();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn byte_order_matches_identifier_order() {
        let a = Identifier::generate();
        let b = Identifier::generate();
        assert!(a < b);
        assert!(a.as_bytes() < b.as_bytes());
    }

    #[test]
    fn timestamp_leads_the_encoding() {
        let early = Identifier::with_timestamp_ms(1_000);
        let late = Identifier::with_timestamp_ms(1_001);
        assert!(early < late);
        assert_eq!(early.timestamp_ms(), 1_000);
        assert_eq!(late.timestamp_ms(), 1_001);
    }

    #[test]
    fn generated_timestamp_is_recent() {
        let id = Identifier::generate();
        // After 2020-01-01.
        assert!(id.timestamp_ms() > 1_577_836_800_000);
    }

    // -----------------------------------------------------------------------
    // next()
    // -----------------------------------------------------------------------

    #[test]
    fn next_is_strictly_greater_and_valid() {
        let id = Identifier::generate();
        let next = id.next();
        assert!(next > id);
        assert_eq!(Identifier::from_bytes(next.as_bytes()).unwrap(), next);
    }

    #[test]
    fn next_carries_into_the_timestamp() {
        let top_of_ms = Identifier::with_timestamp_ms(43).next();
        assert_eq!(top_of_ms.timestamp_ms(), 43);

        // Largest identifier at ms 42 is one step below the smallest at 43.
        let last_at_42 = Identifier::from_counter(Identifier::counter(
            Identifier::with_timestamp_ms(43).0.as_u128(),
        ) - 1);
        assert_eq!(last_at_42.timestamp_ms(), 42);
        assert_eq!(last_at_42.next(), Identifier::with_timestamp_ms(43));
    }

    #[test]
    fn next_wraps_at_the_top() {
        let max = Identifier::from_counter(COUNTER_MASK);
        assert_eq!(max.next(), Identifier::MIN);
        assert_eq!(max.checked_next(), None);
    }

    #[test]
    fn checked_next_agrees_with_next_below_the_top() {
        let id = Identifier::with_timestamp_ms(7);
        assert_eq!(id.checked_next(), Some(id.next()));
        assert!(id.checked_next().unwrap() > id);
    }

    #[test]
    fn with_timestamp_ms_saturates() {
        let top = Identifier::with_timestamp_ms(Identifier::MAX_TIMESTAMP_MS);
        assert_eq!(top.timestamp_ms(), Identifier::MAX_TIMESTAMP_MS);
        assert_eq!(Identifier::with_timestamp_ms(u64::MAX), top);
        assert_eq!(Identifier::with_timestamp_ms(1 << 48), top);
        assert!(Identifier::with_timestamp_ms(1) > Identifier::MIN);
    }

    #[test]
    fn min_is_smallest_valid() {
        assert_eq!(Identifier::with_timestamp_ms(0), Identifier::MIN);
        assert!(Identifier::from_bytes(Identifier::MIN.as_bytes()).is_ok());
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let err = Identifier::from_bytes(&[0u8; 20]).unwrap_err();
        assert_eq!(
            err,
            IdentifierError::InvalidLength {
                expected: 16,
                actual: 20
            }
        );
        assert!(Identifier::from_bytes(b"").is_err());
    }

    #[test]
    fn from_bytes_rejects_wrong_version() {
        let v4 = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0000);
        let err = Identifier::from_bytes(v4.as_bytes()).unwrap_err();
        assert_eq!(err, IdentifierError::InvalidVersion(4));
    }

    #[test]
    fn from_bytes_rejects_wrong_variant() {
        let mut bytes = *Identifier::generate().as_bytes();
        bytes[8] &= 0x3f;
        let err = Identifier::from_bytes(&bytes).unwrap_err();
        assert_eq!(err, IdentifierError::InvalidVariant);
    }

    #[test]
    fn string_roundtrip() {
        let id = Identifier::generate();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s.parse::<Identifier>().unwrap(), id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "not-an-id".parse::<Identifier>(),
            Err(IdentifierError::InvalidString(_))
        ));
        assert!(matches!(
            "00000000-0000-4000-8000-000000000000".parse::<Identifier>(),
            Err(IdentifierError::InvalidVersion(4))
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let id = Identifier::generate();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_rejects_non_v7() {
        let json = "\"00000000-0000-4000-8000-000000000000\"";
        assert!(serde_json::from_str::<Identifier>(json).is_err());
    }

    #[test]
    fn debug_and_short_id() {
        let id = Identifier::with_timestamp_ms(7);
        assert_eq!(id.short_id().len(), 8);
        assert!(format!("{id:?}").starts_with("Identifier(7.."));
    }

    proptest! {
        #[test]
        fn next_preserves_order_and_validity(raw in any::<u128>()) {
            let id = Identifier::from_counter(raw & COUNTER_MASK);
            prop_assume!(id != Identifier::from_counter(COUNTER_MASK));
            let next = id.next();
            prop_assert!(next > id);
            prop_assert_eq!(Identifier::from_bytes(next.as_bytes()).unwrap(), next);
        }
    }
}
