//! Entity factories and the starting table.

use glam::Vec2;

use crate::components::{IsDraggable, IsSlot, RenderTags, SnapsToSlot, Transform};
use crate::ecs::{EntityId, EntityRegistry, EntityType};
use crate::error::Result;
use crate::systems::snap;

/// Starting depth for each entity type. Cards sit above everything else.
pub fn initial_z(entity_type: EntityType) -> f32 {
    match entity_type {
        EntityType::Card => 1.0,
        EntityType::Unknown
        | EntityType::X
        | EntityType::Y
        | EntityType::Z
        | EntityType::TraySlot => 0.0,
    }
}

/// Create an entity of `entity_type` with the components that type needs.
///
/// Every entity gets a `Transform` and `RenderTags`. Cards are draggable
/// and snap into slots; tray slots get an empty `IsSlot`.
pub fn make_entity(
    registry: &mut EntityRegistry,
    entity_type: EntityType,
    pos: Vec2,
    size: Vec2,
) -> Result<EntityId> {
    let entity = registry.create_entity();
    entity.entity_type = entity_type;
    entity.add_bundle((
        Transform::new(pos, size).with_z(initial_z(entity_type)),
        RenderTags::default(),
    ))?;
    match entity_type {
        EntityType::Card => entity.add_bundle((IsDraggable, SnapsToSlot::default()))?,
        EntityType::TraySlot => {
            entity.add(IsSlot::default())?;
        }
        EntityType::Unknown | EntityType::X | EntityType::Y | EntityType::Z => {}
    }
    log::debug!("spawned {entity} at {pos}");
    Ok(entity.id())
}

pub fn make_card(registry: &mut EntityRegistry, pos: Vec2, size: Vec2) -> Result<EntityId> {
    make_entity(registry, EntityType::Card, pos, size)
}

pub fn make_tray_slot(registry: &mut EntityRegistry, pos: Vec2, size: Vec2) -> Result<EntityId> {
    make_entity(registry, EntityType::TraySlot, pos, size)
}

/// Ids of the entities [`setup_tray_table`] creates.
#[derive(Debug, Clone, Copy)]
pub struct TrayTable {
    pub slots: [EntityId; 3],
    pub card: EntityId,
}

pub const SLOT_SIZE: Vec2 = Vec2::new(220.0, 100.0);
pub const CARD_SIZE: Vec2 = Vec2::new(200.0, 80.0);

/// Three tray slots along the top edge and one card below the first slot,
/// already held by it.
pub fn setup_tray_table(registry: &mut EntityRegistry) -> Result<TrayTable> {
    let first = make_tray_slot(registry, Vec2::new(200.0, 20.0), SLOT_SIZE)?;
    let card = make_card(registry, Vec2::new(200.0, 200.0), CARD_SIZE)?;
    let second = make_tray_slot(registry, Vec2::new(500.0, 20.0), SLOT_SIZE)?;
    let third = make_tray_slot(registry, Vec2::new(1000.0, 20.0), SLOT_SIZE)?;

    link_without_moving(registry, card, first)?;

    Ok(TrayTable {
        slots: [first, second, third],
        card,
    })
}

/// The starting card is held by its slot but drawn below it.
fn link_without_moving(registry: &mut EntityRegistry, card: EntityId, slot: EntityId) -> Result<()> {
    let pos = registry
        .get(card)
        .ok_or(crate::error::Error::EntityNotFound(card))?
        .try_get::<Transform>()?
        .position;
    snap::assign_to_slot(registry, card, slot)?;
    if let Some(transform) = registry.get_mut(card).and_then(|e| e.get_mut::<Transform>()) {
        transform.update(pos);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_per_type() {
        let mut registry = EntityRegistry::new();
        let card = make_card(&mut registry, Vec2::ZERO, CARD_SIZE).unwrap();
        let slot = make_tray_slot(&mut registry, Vec2::ZERO, SLOT_SIZE).unwrap();
        let plain = make_entity(&mut registry, EntityType::Y, Vec2::ZERO, Vec2::ONE).unwrap();

        let card = registry.get(card).unwrap();
        assert!(card.has_all::<(Transform, RenderTags, IsDraggable, SnapsToSlot)>());
        assert!(card.is_missing::<IsSlot>());
        assert_eq!(card.get::<Transform>().unwrap().z, 1.0);

        let slot = registry.get(slot).unwrap();
        assert!(slot.has_all::<(Transform, RenderTags, IsSlot)>());
        assert!(slot.is_missing::<IsDraggable>());
        assert_eq!(slot.get::<Transform>().unwrap().z, 0.0);

        let plain = registry.get(plain).unwrap();
        assert_eq!(plain.components().len(), 2);
        assert_eq!(plain.entity_type, EntityType::Y);
    }

    #[test]
    fn tray_table_layout() {
        let mut registry = EntityRegistry::new();
        let table = setup_tray_table(&mut registry).unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.ids(), vec![table.slots[0], table.card, table.slots[1], table.slots[2]]);

        let card = registry.get(table.card).unwrap();
        assert_eq!(card.get::<Transform>().unwrap().position, Vec2::new(200.0, 200.0));
        assert_eq!(card.get::<SnapsToSlot>().unwrap().held_by, Some(table.slots[0]));
        let slot = registry.get(table.slots[0]).unwrap().get::<IsSlot>().unwrap();
        assert_eq!(slot.held_entity, Some(table.card));
        assert!(registry.get(table.slots[2]).unwrap().get::<IsSlot>().unwrap().is_empty());
    }
}
