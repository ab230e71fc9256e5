//! Slot occupancy: finding a slot for a released card and keeping the
//! slot/card cross-references in step.
//!
//! A slot ([`IsSlot`]) records which entity it holds; a snappable
//! ([`SnapsToSlot`]) records which slot holds it. Every function here that
//! changes one side changes the other in the same call, so for any slot `S`
//! holding `E`, `E.held_by == Some(S)`.

use glam::Vec2;

use crate::components::{IsSlot, RenderTag, RenderTags, SnapsToSlot, Transform};
use crate::ecs::{Entity, EntityId, EntityRegistry, ForEachFlow};
use crate::error::{Error, Result};

/// Nearest slot within `radius` of `pos` that is empty or already holds
/// `entity`.
pub fn nearest_available_slot(
    registry: &EntityRegistry,
    entity: EntityId,
    pos: Vec2,
    radius: f32,
) -> Option<EntityId> {
    registry
        .closest_matching(pos, radius, |candidate| {
            candidate.id() != entity
                && candidate
                    .get::<IsSlot>()
                    .is_some_and(|slot| slot.accepts(entity))
        })
        .map(Entity::id)
}

/// Move `entity` into the nearest available slot and hard-snap it there.
///
/// Returns the slot it landed in. If no slot is in reach, logs a warning and
/// leaves everything as it was, including the previous slot link.
pub fn snap_to_nearest_slot(
    registry: &mut EntityRegistry,
    entity: EntityId,
    radius: f32,
) -> Option<EntityId> {
    let pos = registry.get(entity)?.get::<Transform>()?.position;
    let Some(slot) = nearest_available_slot(registry, entity, pos, radius) else {
        log::warn!("no free slot within {radius} of entity {entity} at {pos}");
        return None;
    };
    place_in_slot(registry, entity, slot);
    log::debug!("entity {entity} snapped into slot {slot}");
    Some(slot)
}

/// Put `entity` into `slot` directly, without a distance check.
///
/// Fails if either entity is unknown, lacks the needed component, or `slot`
/// already holds something else.
pub fn assign_to_slot(registry: &mut EntityRegistry, entity: EntityId, slot: EntityId) -> Result<()> {
    registry
        .get(entity)
        .ok_or(Error::EntityNotFound(entity))?
        .try_get::<SnapsToSlot>()?;
    let target = registry
        .get(slot)
        .ok_or(Error::EntityNotFound(slot))?
        .try_get::<IsSlot>()?;
    if let Some(occupant) = target.held_entity.filter(|&held| held != entity) {
        return Err(Error::SlotOccupied { slot, occupant });
    }
    place_in_slot(registry, entity, slot);
    Ok(())
}

fn place_in_slot(registry: &mut EntityRegistry, entity: EntityId, slot: EntityId) {
    let previous = registry
        .get(entity)
        .and_then(|e| e.get::<SnapsToSlot>())
        .and_then(|s| s.held_by);

    // The previous slot only lets go if it really held this entity.
    if let Some(previous) = previous.filter(|&previous| previous != slot) {
        if let Some(old) = registry.get_mut(previous).and_then(|e| e.get_mut::<IsSlot>()) {
            if old.held_entity == Some(entity) {
                old.held_entity = None;
            }
        }
    }

    let mut slot_pos = None;
    if let Some(target) = registry.get_mut(slot) {
        if let Some(is_slot) = target.get_mut::<IsSlot>() {
            is_slot.held_entity = Some(entity);
        }
        slot_pos = target.get::<Transform>().map(|t| t.position);
    }

    if let Some(card) = registry.get_mut(entity) {
        if let Some(snaps) = card.get_mut::<SnapsToSlot>() {
            snaps.held_by = Some(slot);
        }
        if let (Some(pos), Some(transform)) = (slot_pos, card.get_mut::<Transform>()) {
            transform.update(pos);
        }
    }
}

/// Undo every slot link that involves `entity`, on both sides.
///
/// The registry runs this before dropping an entity, so a removed card frees
/// its slot and a removed slot lets go of its card.
pub fn release_links(registry: &mut EntityRegistry, entity: EntityId) {
    let Some(e) = registry.get(entity) else {
        return;
    };
    let holder = e.get::<SnapsToSlot>().and_then(|s| s.held_by);
    let held = e.get::<IsSlot>().and_then(|s| s.held_entity);

    if let Some(slot) = holder {
        if let Some(is_slot) = registry.get_mut(slot).and_then(|e| e.get_mut::<IsSlot>()) {
            if is_slot.held_entity == Some(entity) {
                is_slot.held_entity = None;
                log::debug!("slot {slot} released entity {entity}");
            }
        }
    }
    if let Some(card) = held {
        if let Some(snaps) = registry.get_mut(card).and_then(|e| e.get_mut::<SnapsToSlot>()) {
            if snaps.held_by == Some(entity) {
                snaps.held_by = None;
                log::debug!("entity {card} no longer held by slot {entity}");
            }
        }
    }

    if let Some(e) = registry.get_mut(entity) {
        if let Some(snaps) = e.get_mut::<SnapsToSlot>() {
            snaps.held_by = None;
        }
        if let Some(is_slot) = e.get_mut::<IsSlot>() {
            is_slot.held_entity = None;
        }
    }
}

/// Clear the highlight on every slot, then highlight the slot `dragged` would
/// snap into if released now.
pub fn update_slot_highlights(registry: &mut EntityRegistry, dragged: Option<EntityId>, radius: f32) {
    let target = dragged.and_then(|id| {
        let pos = registry.get(id)?.get::<Transform>()?.position;
        nearest_available_slot(registry, id, pos, radius)
    });

    registry.for_each_mut(|e| {
        if e.is_missing::<IsSlot>() {
            return ForEachFlow::Continue;
        }
        let highlighted = Some(e.id()) == target;
        if let Some(tags) = e.get_mut::<RenderTags>() {
            if highlighted {
                tags.enable(RenderTag::Highlight);
            } else {
                tags.disable(RenderTag::Highlight);
            }
        }
        ForEachFlow::NormalFlow
    });
}

/// `true` when every slot link is mirrored on the other side.
#[cfg(test)]
pub(crate) fn links_are_consistent(registry: &EntityRegistry) -> bool {
    registry.iter().all(|e| {
        let slot_ok = e
            .get::<IsSlot>()
            .and_then(|s| s.held_entity)
            .is_none_or(|held| {
                registry
                    .get(held)
                    .and_then(|h| h.get::<SnapsToSlot>())
                    .is_some_and(|s| s.held_by == Some(e.id()))
            });
        let snap_ok = e
            .get::<SnapsToSlot>()
            .and_then(|s| s.held_by)
            .is_none_or(|slot| {
                registry
                    .get(slot)
                    .and_then(|h| h.get::<IsSlot>())
                    .is_some_and(|s| s.held_entity == Some(e.id()))
            });
        slot_ok && snap_ok
    })
}
