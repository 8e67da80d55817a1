//! Shared value types for the Pipemind domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values (selection strategies, compass directions, resolutions)
//! and participate in node computations. Every enumerated input accepts the
//! same lowercase spelling the node widgets use, via [`std::str::FromStr`].

use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::PipemindError;

// ---------------------------------------------------------------------------
// Line selection
// ---------------------------------------------------------------------------

/// Strategy the line selector uses to pick one line per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Always the requested index, clamped to the file.
    Manual,
    /// Uniform choice over the selectable lines, seeded per call.
    Random,
    /// Advance by one selectable line per call; persisted.
    Increment,
    /// Step back by one selectable line per call; persisted.
    Decrement,
    /// Round-robin over a user-supplied index list; persisted.
    CustomSeq,
    /// Uniform choice over a user-supplied index list, seeded per call.
    CustomRandom,
}

impl SelectionMode {
    /// Every mode, in widget order.
    pub const ALL: [SelectionMode; 6] = [
        Self::Manual,
        Self::Random,
        Self::Increment,
        Self::Decrement,
        Self::CustomSeq,
        Self::CustomRandom,
    ];

    /// Returns the widget spelling of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Random => "random",
            Self::Increment => "increment",
            Self::Decrement => "decrement",
            Self::CustomSeq => "custom_seq",
            Self::CustomRandom => "custom_random",
        }
    }

    /// Returns `true` if this mode keeps a cursor between invocations.
    pub fn is_stateful(self) -> bool {
        matches!(self, Self::Increment | Self::Decrement | Self::CustomSeq)
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = PipemindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipemindError::unknown("selection mode", s))
    }
}

// ---------------------------------------------------------------------------
// Room mapping
// ---------------------------------------------------------------------------

/// One of the four compass directions a room can link through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Traversal and serialisation order.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// The direction a reciprocal link points back through.
    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Slot index of this direction in a `[T; 4]` link table.
    pub fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Lowercase name, as used in exported map documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }

    /// Capitalised name, as shown in room summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = PipemindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipemindError::unknown("direction", s))
    }
}

// ---------------------------------------------------------------------------
// Prompt combination
// ---------------------------------------------------------------------------

/// Separator placed between combined prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Space,
    Newline,
    Comma,
    Slash,
    Nothing,
}

impl Delimiter {
    pub const ALL: [Delimiter; 5] = [
        Self::Space,
        Self::Newline,
        Self::Comma,
        Self::Slash,
        Self::Nothing,
    ];

    /// The text inserted between two prompts.
    pub fn separator(self) -> &'static str {
        match self {
            Self::Space => " ",
            Self::Newline => "\n",
            Self::Comma => ", ",
            Self::Slash => "/",
            Self::Nothing => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Newline => "newline",
            Self::Comma => "comma",
            Self::Slash => "slash",
            Self::Nothing => "nothing",
        }
    }
}

impl FromStr for Delimiter {
    type Err = PipemindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipemindError::unknown("delimiter", s))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// How a resolution preset is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Preset dimensions as listed (width >= height).
    #[default]
    Landscape,
    /// Preset dimensions swapped.
    Portrait,
    /// Ignore the preset and use the manual dimensions.
    Manual,
}

impl FromStr for Orientation {
    type Err = PipemindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            "manual" => Ok(Self::Manual),
            _ => Err(PipemindError::unknown("orientation", s.trim())),
        }
    }
}

/// A `width x height` pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the same resolution with width and height exchanged.
    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// `YYYYmmdd_HHMMSS` stamp used in exported file names.
    ///
    /// The stored UTC instant is converted to the host's local time zone
    /// first, so the stamp matches the wall clock of the machine that wrote
    /// the file.
    pub fn file_stamp(self) -> String {
        self.0.with_timezone(&Local).format("%Y%m%d_%H%M%S").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
