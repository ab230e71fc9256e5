//! # Hospy — Card Tray Game Runtime
//!
//! An entity-component-system runtime for a small card/tray table game:
//! cards are picked up with the pointer, dragged, and snapped into the
//! nearest free tray slot on release.
//!
//! Start with `use hospy::prelude::*` and build a [`Game`](game::Game).

pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod platform;
pub mod prefab;
pub mod prelude;
pub mod systems;
pub mod time;
pub mod walkability;

pub use error::{Error, Result};
