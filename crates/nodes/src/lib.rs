//! Pipemind node implementations.
//!
//! Each module implements one node (or a family of closely related nodes) on
//! top of the domain types in the [`pipeline`] crate. Nodes are synchronous;
//! state that must outlive a single call (the line selector cursors, the room
//! graph) is an owned value the caller passes in by `&mut`.
//!
//! ## Architectural Layer
//!
//! **Node layer.** Modules here read text inputs from a configured input
//! directory and write room-map exports; everything else is pure computation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`text_file`] | Input directory access, `RandomLineFromDropdown`, `LoadTxtFile` |
//! | [`line_selector`] | `SelectLineFromDropdown` and its persisted cursor store |
//! | [`room_mapper`] | `PipemindRoomNode` and the arena-backed room graph |
//! | [`text`] | Prompt combiner, keyword composers, dynamic prompts, text find |
//! | [`switch`] | `BooleanSwitchAny` |
//! | [`resolution`] | Flux 2M / Qwen / SDXL aspect-ratio presets |
//! | [`display`] | `PipemindDisplayAny` |
//! | [`registry`] | Static node catalogue |

pub mod display;
pub mod line_selector;
pub mod registry;
pub mod resolution;
pub mod room_mapper;
pub mod switch;
pub mod text;
pub mod text_file;

pub use display::{display_any, render_value};
pub use line_selector::{
    LineRequest, LineSelection, LineSelector, SelectError, SelectorStateStore, StateKey,
    StateSnapshot,
};
pub use registry::{NodeDescriptor, NODES};
pub use resolution::{select_resolution, ModelFamily};
pub use room_mapper::{RoomError, RoomGraph, RoomId, RoomInput, RoomMapperNode, RoomOutput};
pub use switch::boolean_switch;
pub use text_file::{InputDir, TextFileError};
