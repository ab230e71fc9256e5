//! # Dragging — Pick Up, Move, Release, Snap
//!
//! Immediate-mode interaction in the "hot / active" style:
//!
//! - **hot**: the draggable under the pointer this frame. Recomputed from
//!   scratch every frame.
//! - **active**: what the current press grabbed. Persists while the button is
//!   held.
//!
//! ```text
//!                 press over card               release
//!   Nothing ───────────────────────► Entity(id) ─────────► snap, Nothing
//!      │
//!      │ press over empty space                 release
//!      └───────────────────────────► EmptySpace ─────────► Nothing
//! ```
//!
//! `EmptySpace` exists so that pressing on the table and then sweeping the
//! pointer across a card does not pick the card up mid-gesture.
//!
//! Draggables are visited in registry order and the first one under the
//! pointer wins the grab, so overlapping cards resolve to whichever is
//! earlier in the registry. The depth sort runs after this system, which puts
//! higher-`z` entities later.

use glam::Vec2;

use crate::components::{IsDraggable, SnapsToSlot, Transform};
use crate::ecs::{EntityId, EntityRegistry, System};
use crate::input::PointerState;
use crate::platform::InputSource;

use super::snap;

/// What the current press is holding on to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveGrab {
    #[default]
    Nothing,
    /// The press started over no draggable.
    EmptySpace,
    Entity(EntityId),
}

/// Moves draggables with the pointer and snaps them into slots on release.
pub struct DraggingSystem {
    hot: Option<EntityId>,
    active: ActiveGrab,
    /// Pointer position minus entity position, recorded at pickup.
    offset: Vec2,
    pointer: PointerState,
    snap_radius: f32,
}

impl DraggingSystem {
    pub fn new(snap_radius: f32) -> Self {
        Self {
            hot: None,
            active: ActiveGrab::Nothing,
            offset: Vec2::ZERO,
            pointer: PointerState::new(),
            snap_radius,
        }
    }

    pub fn hot(&self) -> Option<EntityId> {
        self.hot
    }

    pub fn active(&self) -> ActiveGrab {
        self.active
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn snap_radius(&self) -> f32 {
        self.snap_radius
    }

    fn drag(&mut self, registry: &mut EntityRegistry) {
        let pointer = self.pointer.position();
        let held = self.pointer.held();
        self.hot = None;

        let draggables = registry
            .query()
            .where_has_component::<IsDraggable>()
            .where_has_component::<Transform>()
            .ids();

        for id in draggables {
            let Some(transform) = registry.get_mut(id).and_then(|e| e.get_mut::<Transform>()) else {
                continue;
            };

            if transform.contains(pointer) {
                self.hot = Some(id);
                if self.active == ActiveGrab::Nothing && held {
                    self.active = ActiveGrab::Entity(id);
                    self.offset = pointer - transform.position;
                    log::debug!("picked up entity {id} with offset {}", self.offset);
                }
            }

            if self.active == ActiveGrab::Entity(id) {
                transform.update(pointer - self.offset);
            }
        }

        let dragged_snapper = match self.active {
            ActiveGrab::Entity(id) if held && Self::snaps(registry, id) => Some(id),
            _ => None,
        };
        snap::update_slot_highlights(registry, dragged_snapper, self.snap_radius);

        if held {
            if self.active == ActiveGrab::Nothing {
                self.active = ActiveGrab::EmptySpace;
                self.offset = Vec2::ZERO;
            }
            return;
        }

        if let ActiveGrab::Entity(id) = self.active {
            log::debug!("released entity {id} at {pointer}");
            if Self::snaps(registry, id) {
                snap::snap_to_nearest_slot(registry, id, self.snap_radius);
            }
        }
        self.active = ActiveGrab::Nothing;
        self.offset = Vec2::ZERO;
    }

    fn snaps(registry: &EntityRegistry, id: EntityId) -> bool {
        registry.get(id).is_some_and(|e| e.has::<SnapsToSlot>())
    }
}

impl System for DraggingSystem {
    fn before_frame(&mut self, input: &dyn InputSource) {
        self.pointer.latch(input);
    }

    fn update(&mut self, registry: &mut EntityRegistry, _dt: f32) {
        self.drag(registry);
    }
}
