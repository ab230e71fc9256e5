//! # Entity Component System
//!
//! A small ECS built around a flat, ordered entity list. Each entity carries
//! a fixed-width component bitset plus one owned slot per component kind,
//! and systems run in explicit, ordered pipelines.
//!
//! ## Module Overview
//!
//! - [`component`]: Kind registry (capacity 64), bitset, bundles
//! - [`entity`]: Entity ids, types, per-entity storage
//! - [`registry`]: Ordered owning collection and lifecycle
//! - [`query`]: Predicate builder and nearest-entity lookups
//! - [`system`]: System trait and the update/render pipelines

pub mod component;
pub mod entity;
pub mod query;
pub mod registry;
pub mod system;

pub use component::{
    Component, ComponentBundle, ComponentKind, ComponentSet, KindRegistry, MAX_COMPONENTS,
    kind_name, kind_of, register_builtin_components, try_kind_of,
};
pub use entity::{DuplicatePolicy, Entity, EntityId, EntityType};
pub use query::EntityQuery;
pub use registry::{EntityRegistry, ForEachFlow};
pub use system::{System, SystemManager};
#[cfg(feature = "diagnostics")]
pub use system::{Pass, SystemTiming};
