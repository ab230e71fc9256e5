//! Error types shared by the ECS core, the slot logic, and configuration
//! loading.
//!
//! Recoverable misses (a query that matches nothing, a release with no free
//! slot) are not errors: they surface as `None` or a warning. The variants
//! here cover contract violations a caller has to branch on.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors produced by `hospy`.
#[derive(Error, Debug)]
pub enum Error {
    /// A component kind was added twice to the same entity under the strict
    /// duplicate policy.
    #[error("entity {entity} already has a `{component}` component")]
    DuplicateComponent {
        entity: EntityId,
        component: &'static str,
    },

    /// A component kind was read from an entity that does not carry it.
    #[error("entity {entity} has no `{component}` component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },

    /// No live entity has this id.
    #[error("no entity with id {0}")]
    EntityNotFound(EntityId),

    /// An explicit slot assignment targeted a slot held by another entity.
    #[error("slot {slot} is already occupied by entity {occupant}")]
    SlotOccupied { slot: EntityId, occupant: EntityId },

    /// More distinct component kinds were registered than the membership
    /// bitset can represent.
    #[error("cannot register component `{component}`: all {capacity} component kinds are in use")]
    CapacityOverflow {
        component: &'static str,
        capacity: usize,
    },

    /// A configuration value was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`GameConfig`](crate::config::GameConfig).
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
