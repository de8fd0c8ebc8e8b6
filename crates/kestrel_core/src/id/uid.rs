//! # Universal Identifiers
//!
//! A platform-neutral 128-bit identifier split into two 64-bit halves.
//! Every trackable entity (markers, rigid bodies, skeletons) carries one.
//!
//! The all-zero value is the invalid sentinel. Identifiers produced by
//! [`Uid::generate`] are random; identifiers produced by the label codec
//! carry a fixed marker in the high half (see [`super::label`]).

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque 128-bit identifier.
///
/// Ordering is lexicographic on `(high, low)`. It carries no meaning beyond
/// giving a deterministic sort order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable, Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Uid {
    high: u64,
    low: u64,
}

impl Uid {
    /// The invalid identifier (all bits zero).
    pub const INVALID: Self = Self { high: 0, low: 0 };

    /// Creates an identifier from its two halves.
    ///
    /// It is up to the caller to ensure the value is unique.
    #[inline]
    #[must_use]
    pub const fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    /// Generates a fresh random identifier.
    ///
    /// Never returns [`Uid::INVALID`].
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let uid = Self::new(rng.gen(), rng.gen());
            if uid.is_valid() {
                return uid;
            }
        }
    }

    /// High 64 bits.
    #[inline]
    #[must_use]
    pub const fn high_bits(self) -> u64 {
        self.high
    }

    /// Low 64 bits.
    #[inline]
    #[must_use]
    pub const fn low_bits(self) -> u64 {
        self.low
    }

    /// Returns true unless this is the all-zero sentinel.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.high != 0 || self.low != 0
    }

    /// Returns true if this identifier carries the label marker bits.
    ///
    /// Shorthand for [`super::label::is_label`].
    #[inline]
    #[must_use]
    pub fn is_label(self, check_type: bool) -> bool {
        super::label::is_label(self, check_type)
    }

    /// Packs into a single `u128` (high half in the upper bits).
    #[inline]
    #[must_use]
    pub const fn to_u128(self) -> u128 {
        ((self.high as u128) << 64) | self.low as u128
    }

    /// Unpacks from a single `u128`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_u128(value: u128) -> Self {
        Self::new((value >> 64) as u64, value as u64)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}-{:016X}", self.high, self.low)
    }
}

/// Errors from parsing a [`Uid`] out of text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UidParseError {
    /// The `-` between the two halves is missing.
    #[error("identifier is missing the '-' separator: {0:?}")]
    MissingSeparator(String),

    /// One half is not 1 to 16 hexadecimal digits.
    #[error("identifier half is not valid hex: {0:?}")]
    InvalidHex(String),
}

impl FromStr for Uid {
    type Err = UidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (high, low) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| UidParseError::MissingSeparator(s.to_string()))?;

        let parse_half = |half: &str| {
            if half.is_empty() || half.len() > 16 {
                return Err(UidParseError::InvalidHex(half.to_string()));
            }
            u64::from_str_radix(half, 16).map_err(|_| UidParseError::InvalidHex(half.to_string()))
        };

        Ok(Self::new(parse_half(high)?, parse_half(low)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_invalid_is_all_zero() {
        assert!(!Uid::INVALID.is_valid());
        assert_eq!(Uid::default(), Uid::INVALID);
        assert!(Uid::new(0, 1).is_valid());
        assert!(Uid::new(1, 0).is_valid());
    }

    #[test]
    fn test_generate_is_unique() {
        let ids: HashSet<Uid> = (0..10_000).map(|_| Uid::generate()).collect();
        assert_eq!(ids.len(), 10_000);
        assert!(ids.iter().all(|id| id.is_valid()));
    }

    #[test]
    fn test_ordering_is_high_then_low() {
        let a = Uid::new(1, u64::MAX);
        let b = Uid::new(2, 0);
        let c = Uid::new(2, 1);
        assert!(a < b);
        assert!(b < c);

        let mut ids = vec![c, a, b];
        ids.sort();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_display_and_parse() {
        let id = Uid::new(0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210);
        let text = id.to_string();
        assert_eq!(text, "0123456789ABCDEF-FEDCBA9876543210");
        assert_eq!(text.parse::<Uid>().unwrap(), id);
        assert_eq!("1-ff".parse::<Uid>().unwrap(), Uid::new(1, 0xFF));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "0123".parse::<Uid>(),
            Err(UidParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "xyz-1".parse::<Uid>(),
            Err(UidParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "-1".parse::<Uid>(),
            Err(UidParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "11111111111111111-1".parse::<Uid>(),
            Err(UidParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_u128_roundtrip() {
        let id = Uid::new(7, 9);
        assert_eq!(id.to_u128(), (7u128 << 64) | 9);
        assert_eq!(Uid::from_u128(id.to_u128()), id);
    }

    #[test]
    fn test_uid_bytemuck() {
        let id = Uid::new(1, 2);
        let bytes: &[u8] = bytemuck::bytes_of(&id);
        assert_eq!(bytes.len(), 16);
    }
}
