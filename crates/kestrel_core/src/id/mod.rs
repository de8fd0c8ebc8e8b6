//! # Identity
//!
//! Identifiers and the label codec.
//!
//! - [`Uid`]: opaque 128-bit identifier, all-zero is invalid
//! - [`label`]: packs (entity type, entity index, member index) into a [`Uid`]
//!
//! Everything here is stateless and safe to call from any thread.

pub mod label;
mod uid;

pub use label::{
    decode, encode, from_legacy_id, is_label, to_legacy_id, DecodedLabel, EntityType, Label,
    LabelError, LabelResult, MAX_ENTITY_INDEX,
};
pub use uid::{Uid, UidParseError};
