//! The game's built-in systems.
//!
//! - [`dragging`]: pointer pick-up, drag, and release.
//! - [`snap`]: slot lookup and slot/card links used on release.
//! - [`sort`]: stable depth sort, last in the update pipeline.
//! - [`render`]: one rectangle per entity.

pub mod dragging;
pub mod render;
pub mod snap;
pub mod sort;

pub use dragging::{ActiveGrab, DraggingSystem};
pub use render::RenderingSystem;
pub use sort::SortByDepthSystem;
