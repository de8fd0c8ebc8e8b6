//! # Label Codec
//!
//! A label names an entity: which kind of thing it belongs to, which instance
//! of that kind, and which member within it. Labels pack into a [`Uid`] so
//! that labeled and randomly generated identifiers share one address space.
//!
//! ## Bit Layout
//!
//! ```text
//! high: [63 ................................ 8][7 ..... 0]
//!        label identifier (56 bits, fixed)     entity type
//!
//! low:  [63][62 ............ 32][31 ............. 0]
//!        0    entity index (31)   member index (32)
//! ```
//!
//! Any identifier whose high half does not carry the label identifier is
//! "not a label". Probing arbitrary identifiers is routine, so that outcome is
//! a plain `Err`, never a panic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::uid::Uid;

/// Fixed bits marking an identifier as an encoded label ("KESTRL" in ASCII).
pub const LABEL_IDENTIFIER: u64 = 0x4B45_5354_524C_0000;

/// Bits of the high half holding the entity type tag.
pub const TYPE_MASK: u64 = 0xFF;

/// Largest entity index the 31-bit field can hold.
pub const MAX_ENTITY_INDEX: u32 = 0x7FFF_FFFF;

const ENTITY_SHIFT: u32 = 32;
const MEMBER_MASK: u64 = 0xFFFF_FFFF;
const RESERVED_BIT: u64 = 1 << 63;

/// The kind of entity a label refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityType {
    /// Not labeled.
    #[default]
    None = 0,
    /// Member of a labeled marker set.
    MarkerSet = 1,
    /// A skeleton or one of its markers.
    Skeleton = 2,
    /// A rigid body or one of its markers.
    RigidBody = 3,
    /// A skeleton joint.
    Joint = 4,
}

impl EntityType {
    /// Every known entity type, in tag order.
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::MarkerSet,
        Self::Skeleton,
        Self::RigidBody,
        Self::Joint,
    ];

    /// Converts a raw type tag back into an entity type.
    #[inline]
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::None),
            1 => Some(Self::MarkerSet),
            2 => Some(Self::Skeleton),
            3 => Some(Self::RigidBody),
            4 => Some(Self::Joint),
            _ => None,
        }
    }

    /// The raw type tag.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// Errors from the label codec.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelError {
    /// The identifier does not carry the label marker bits.
    #[error("identifier is not a label")]
    NotALabel,

    /// The identifier is a label but its type tag is unknown.
    #[error("unknown entity type tag {0}")]
    UnknownEntityType(u8),

    /// The reserved bit of the low half is set.
    #[error("reserved label bit is set")]
    ReservedBitSet,

    /// The entity index does not fit in its 31-bit field.
    #[error("entity index {0} exceeds the 31-bit maximum")]
    EntityIndexOverflow(u32),

    /// Legacy identifiers can only address member index 0.
    #[error("member index {0} cannot be expressed as a legacy id")]
    NotLegacyAddressable(u32),

    /// Legacy identifiers are never negative.
    #[error("legacy id {0} is negative")]
    NegativeLegacyId(i32),
}

/// Result type for label codec operations.
pub type LabelResult<T> = Result<T, LabelError>;

/// The three fields packed inside a label identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedLabel {
    /// Kind of entity.
    pub entity_type: EntityType,
    /// Which entity of that kind.
    pub entity_index: u32,
    /// Which member within the entity.
    pub member_index: u32,
}

/// Packs a label into an identifier.
///
/// # Errors
///
/// Returns [`LabelError::EntityIndexOverflow`] if `entity_index` exceeds
/// [`MAX_ENTITY_INDEX`].
pub fn encode(entity_type: EntityType, entity_index: u32, member_index: u32) -> LabelResult<Uid> {
    if entity_index > MAX_ENTITY_INDEX {
        return Err(LabelError::EntityIndexOverflow(entity_index));
    }

    let high = LABEL_IDENTIFIER | u64::from(entity_type.tag());
    let low = (u64::from(entity_index) << ENTITY_SHIFT) | u64::from(member_index);
    Ok(Uid::new(high, low))
}

/// Returns true if the identifier carries the label marker bits.
///
/// With `check_type` set the type tag must also name a known [`EntityType`].
#[must_use]
pub fn is_label(uid: Uid, check_type: bool) -> bool {
    let high = uid.high_bits();
    if high & !TYPE_MASK != LABEL_IDENTIFIER {
        return false;
    }
    !check_type || EntityType::from_tag(type_tag(high)).is_some()
}

/// Unpacks a label identifier.
///
/// # Errors
///
/// - [`LabelError::NotALabel`] if the marker bits are absent.
/// - [`LabelError::UnknownEntityType`] if the type tag is not known.
/// - [`LabelError::ReservedBitSet`] if the reserved bit is set.
#[allow(clippy::cast_possible_truncation)]
pub fn decode(uid: Uid) -> LabelResult<DecodedLabel> {
    if !is_label(uid, false) {
        return Err(LabelError::NotALabel);
    }

    let tag = type_tag(uid.high_bits());
    let entity_type = EntityType::from_tag(tag).ok_or(LabelError::UnknownEntityType(tag))?;

    let low = uid.low_bits();
    if low & RESERVED_BIT != 0 {
        return Err(LabelError::ReservedBitSet);
    }

    Ok(DecodedLabel {
        entity_type,
        entity_index: (low >> ENTITY_SHIFT) as u32,
        member_index: (low & MEMBER_MASK) as u32,
    })
}

/// Converts a label identifier to the flat legacy id (its entity index).
///
/// # Errors
///
/// Fails like [`decode`], and with [`LabelError::NotLegacyAddressable`] if
/// the member index is not 0.
pub fn to_legacy_id(uid: Uid) -> LabelResult<i32> {
    let decoded = decode(uid)?;
    if decoded.member_index != 0 {
        return Err(LabelError::NotLegacyAddressable(decoded.member_index));
    }
    // The 31-bit entity field always fits a non-negative i32.
    i32::try_from(decoded.entity_index).map_err(|_| LabelError::EntityIndexOverflow(decoded.entity_index))
}

/// Converts a flat legacy id into a label identifier with member index 0.
///
/// # Errors
///
/// Returns [`LabelError::NegativeLegacyId`] for negative ids.
pub fn from_legacy_id(entity_type: EntityType, id: i32) -> LabelResult<Uid> {
    let index = u32::try_from(id).map_err(|_| LabelError::NegativeLegacyId(id))?;
    encode(entity_type, index, 0)
}

#[allow(clippy::cast_possible_truncation)]
const fn type_tag(high: u64) -> u8 {
    (high & TYPE_MASK) as u8
}

/// A named label bound to an entity.
///
/// Carries human-readable names alongside the packed identifier, which is
/// computed once at construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    entity_name: String,
    member_name: String,
    entity_type: EntityType,
    entity_index: u32,
    member_index: u32,
    encoded: Uid,
}

impl Label {
    /// Separator between entity and member in a qualified name.
    pub const NAME_SEPARATOR: char = ':';

    /// The unlabeled, unnamed label.
    pub const INVALID: Self = Self {
        entity_name: String::new(),
        member_name: String::new(),
        entity_type: EntityType::None,
        entity_index: 0,
        member_index: 0,
        encoded: Uid::INVALID,
    };

    /// Creates a label from its parts.
    ///
    /// # Errors
    ///
    /// Fails if the indices cannot be encoded (see [`encode`]).
    pub fn new(
        entity_name: impl Into<String>,
        member_name: impl Into<String>,
        entity_type: EntityType,
        entity_index: u32,
        member_index: u32,
    ) -> LabelResult<Self> {
        let encoded = encode(entity_type, entity_index, member_index)?;
        Ok(Self {
            entity_name: entity_name.into(),
            member_name: member_name.into(),
            entity_type,
            entity_index,
            member_index,
            encoded,
        })
    }

    /// Creates a label from names and an existing identifier.
    ///
    /// If the identifier does not decode as a label, the result is unlabeled
    /// but keeps the names and the raw identifier.
    #[must_use]
    pub fn from_uid(entity_name: impl Into<String>, member_name: impl Into<String>, uid: Uid) -> Self {
        let decoded = decode(uid).unwrap_or(DecodedLabel {
            entity_type: EntityType::None,
            entity_index: 0,
            member_index: 0,
        });
        Self {
            entity_name: entity_name.into(),
            member_name: member_name.into(),
            entity_type: decoded.entity_type,
            entity_index: decoded.entity_index,
            member_index: decoded.member_index,
            encoded: uid,
        }
    }

    /// Entity name.
    #[inline]
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Member name.
    #[inline]
    #[must_use]
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Entity type.
    #[inline]
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Which entity of its type this label applies to.
    #[inline]
    #[must_use]
    pub const fn entity_index(&self) -> u32 {
        self.entity_index
    }

    /// Which member of the entity this label applies to.
    #[inline]
    #[must_use]
    pub const fn member_index(&self) -> u32 {
        self.member_index
    }

    /// The packed identifier.
    #[inline]
    #[must_use]
    pub const fn encoded_uid(&self) -> Uid {
        self.encoded
    }

    /// Returns true if this label names a labeled entity.
    #[inline]
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        self.entity_type != EntityType::None
    }

    /// Fully qualified name: `entity` or `entity:member`.
    #[must_use]
    pub fn name(&self) -> String {
        if self.member_name.is_empty() {
            self.entity_name.clone()
        } else {
            format!("{}{}{}", self.entity_name, Self::NAME_SEPARATOR, self.member_name)
        }
    }

    /// Splits a qualified name at the first separator into (entity, member).
    #[must_use]
    pub fn parse_name(name: &str) -> (&str, &str) {
        name.split_once(Self::NAME_SEPARATOR).unwrap_or((name, ""))
    }

    /// Replaces both names from a qualified name.
    pub fn set_name(&mut self, name: &str) {
        let (entity, member) = Self::parse_name(name);
        self.set_names(entity, member);
    }

    /// Replaces both names.
    pub fn set_names(&mut self, entity_name: impl Into<String>, member_name: impl Into<String>) {
        self.entity_name = entity_name.into();
        self.member_name = member_name.into();
    }

    /// Replaces the member name.
    pub fn set_member_name(&mut self, member_name: impl Into<String>) {
        self.member_name = member_name.into();
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::INVALID
    }
}
