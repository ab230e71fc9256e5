//! Common imports: `use hospy::prelude::*`.

pub use glam::{IVec2, Vec2};

pub use crate::components::{
    IsDraggable, IsSlot, IsSolid, RenderTag, RenderTags, SnapsToSlot, Transform,
};
pub use crate::config::{GameConfig, LogConfig, WindowConfig};
pub use crate::ecs::{
    Component, DuplicatePolicy, Entity, EntityId, EntityQuery, EntityRegistry, EntityType,
    ForEachFlow, System, SystemManager,
};
pub use crate::error::{Error, Result};
pub use crate::game::{Game, Plugin};
pub use crate::input::PointerState;
pub use crate::platform::{Color, HeadlessPlatform, InputSource, Platform, PointerFrame, Renderer};
pub use crate::prefab;
pub use crate::systems::{ActiveGrab, DraggingSystem, RenderingSystem, SortByDepthSystem};
pub use crate::time::Time;
pub use crate::walkability::WalkabilityCache;
