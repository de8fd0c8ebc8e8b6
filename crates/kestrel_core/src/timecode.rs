//! # SMPTE Timecode
//!
//! Packed timecode delivered with each frame by the sync hardware.
//!
//! ```text
//! timecode: [31..24 hours][23..16 minutes][15..8 seconds][7..0 frames]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A packed SMPTE timecode with subframe and drop-frame flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeCode {
    /// Packed hours/minutes/seconds/frames word.
    pub timecode: u32,
    /// Subframe within the current frame.
    pub subframe: u32,
    /// Whether the source runs drop-frame timecode.
    pub drop_frame: bool,
    /// Whether the sync source supplied a timecode at all.
    pub valid: bool,
}

impl TimeCode {
    /// Builds a valid timecode from its fields.
    #[must_use]
    pub const fn from_parts(hours: u8, minutes: u8, seconds: u8, frame: u8, subframe: u32, drop_frame: bool) -> Self {
        Self {
            timecode: (hours as u32) << 24 | (minutes as u32) << 16 | (seconds as u32) << 8 | frame as u32,
            subframe,
            drop_frame,
            valid: true,
        }
    }

    /// Hours field.
    #[inline]
    #[must_use]
    pub const fn hours(self) -> u32 {
        (self.timecode >> 24) & 0xFF
    }

    /// Minutes field.
    #[inline]
    #[must_use]
    pub const fn minutes(self) -> u32 {
        (self.timecode >> 16) & 0xFF
    }

    /// Seconds field.
    #[inline]
    #[must_use]
    pub const fn seconds(self) -> u32 {
        (self.timecode >> 8) & 0xFF
    }

    /// Frame field.
    #[inline]
    #[must_use]
    pub const fn frame(self) -> u32 {
        self.timecode & 0xFF
    }

    /// Subframe.
    #[inline]
    #[must_use]
    pub const fn subframe(self) -> u32 {
        self.subframe
    }

    /// Whether this is drop-frame timecode.
    #[inline]
    #[must_use]
    pub const fn is_drop_frame(self) -> bool {
        self.drop_frame
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return f.write_str("--:--:--:--.-");
        }
        let separator = if self.drop_frame { ';' } else { ':' };
        write!(
            f,
            "{:02}:{:02}:{:02}{}{:02}.{}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            separator,
            self.frame(),
            self.subframe
        )
    }
}
