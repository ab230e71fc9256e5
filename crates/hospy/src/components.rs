//! Concrete components used by the tray table.
//!
//! All of them are small `Copy`-able data. Cross-references between slots and
//! cards are plain [`EntityId`]s; [`systems::snap`](crate::systems::snap)
//! keeps both sides in step.

use glam::Vec2;

use crate::ecs::{Component, EntityId};

/// Axis-aligned placement of an entity: top-left corner, extent, and depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub size: Vec2,
    /// Draw order. Higher values are drawn later, on top.
    pub z: f32,
}

impl Transform {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            z: 0.0,
        }
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    /// Bottom-right corner.
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Point-in-rectangle test, half-open: the top-left edges belong to the
    /// rectangle, the bottom-right ones do not.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.position.x
            && point.x < max.x
            && point.y >= self.position.y
            && point.y < max.y
    }

    /// Move the top-left corner to `position`.
    pub fn update(&mut self, position: Vec2) {
        self.position = position;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ONE)
    }
}

impl Component for Transform {}

/// Marker: the entity can be picked up with the pointer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsDraggable;

impl Component for IsDraggable {}

/// Marker: the entity blocks movement for walkability checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsSolid;

impl Component for IsSolid {}

/// The entity snaps into the nearest free slot when released.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapsToSlot {
    /// Slot currently holding this entity.
    pub held_by: Option<EntityId>,
}

impl Component for SnapsToSlot {}

/// A tray slot that can hold at most one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsSlot {
    pub held_entity: Option<EntityId>,
}

impl IsSlot {
    pub fn is_empty(&self) -> bool {
        self.held_entity.is_none()
    }

    /// Empty, or already holding `entity`.
    pub fn accepts(&self, entity: EntityId) -> bool {
        self.held_entity.is_none_or(|held| held == entity)
    }
}

impl Component for IsSlot {}

/// Render-only markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RenderTag {
    Highlight = 0,
}

/// Set of [`RenderTag`]s on an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderTags {
    bits: u8,
}

impl RenderTags {
    pub fn enable(&mut self, tag: RenderTag) {
        self.bits |= 1 << tag as u8;
    }

    pub fn disable(&mut self, tag: RenderTag) {
        self.bits &= !(1 << tag as u8);
    }

    pub fn has_tag(&self, tag: RenderTag) -> bool {
        self.bits & (1 << tag as u8) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }
}

impl Component for RenderTags {}
