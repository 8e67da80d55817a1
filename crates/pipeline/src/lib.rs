//! Core domain layer for Pipemind nodes.
//!
//! This crate contains every newtype identifier, shared value type, error type,
//! and pure input parser used by the node implementations. Node crates build
//! on these types; they never redefine them.
//!
//! ## Architectural Layer
//!
//! **Domain types + parsing.** This crate performs no file-system I/O.
//! It defines *what* a node consumes and produces; the `nodes` crate defines
//! *how* each node computes it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`FileName`, `MapName`, `RoomKey`, `Seed`) |
//! | [`types`] | Shared value types (`SelectionMode`, `Direction`, `Resolution`, etc.) |
//! | [`index_syntax`] | Parser for `"1,3,5-8"` index lists |
//! | [`errors`] | Top-level error type |

pub mod errors;
pub mod identifiers;
pub mod index_syntax;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::PipemindError;
pub use identifiers::{FileName, MapName, RoomKey, Seed};
pub use index_syntax::{parse_index_set, parse_indices};
pub use types::{Delimiter, Direction, Orientation, Resolution, SelectionMode, Timestamp};
