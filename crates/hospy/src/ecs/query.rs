//! # Query — Filtering Entities by Components, Space, and Predicates
//!
//! An [`EntityQuery`] is a builder: each `where_*` call appends one predicate
//! and hands the query back by value. Nothing is evaluated until a terminal
//! (`all`, `first`, `exists`, `count`, `ids`) walks the registry.
//!
//! ```text
//! registry.query()
//!     .where_has_component::<IsSlot>()
//!     .where_in_range(pointer, 250.0)
//!     .where_not_id(card)
//!     .first();
//!
//! for each entity in registry order:
//!     run predicates in append order, stop at the first `false`
//! ```
//!
//! Predicates are boxed closures borrowing from the caller, so a query can
//! capture locals (a reference entity, a filter) without cloning them.
//!
//! ## Spatial Predicates
//!
//! Distance and containment use the entity's [`Transform`] position (its
//! top-left corner) and are inclusive at the boundary. Entities without a
//! `Transform` never pass a spatial predicate.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: Typed queries over component tuples, filtered at
//!   the archetype level. Ours is a predicate list over a flat entity list.
//!   Slower per entity, but the predicates can mix component presence with
//!   arbitrary game logic.

use glam::Vec2;

use crate::components::{IsSolid, Transform};

use super::component::Component;
use super::entity::{Entity, EntityId, EntityType};
use super::registry::EntityRegistry;

type Predicate<'r> = Box<dyn Fn(&Entity) -> bool + 'r>;

/// Lazily evaluated filter over an [`EntityRegistry`].
#[must_use = "a query does nothing until a terminal like `all()` or `first()` runs it"]
pub struct EntityQuery<'r> {
    registry: &'r EntityRegistry,
    predicates: Vec<Predicate<'r>>,
}

impl<'r> EntityQuery<'r> {
    pub fn new(registry: &'r EntityRegistry) -> Self {
        Self {
            registry,
            predicates: Vec::new(),
        }
    }

    // ── Predicates ───────────────────────────────────────────────────

    pub fn where_has_component<T: Component>(self) -> Self {
        self.where_lambda(|e| e.has::<T>())
    }

    pub fn where_missing_component<T: Component>(self) -> Self {
        self.where_lambda(|e| e.is_missing::<T>())
    }

    /// Keep entities for which `predicate` returns `true`.
    pub fn where_lambda(mut self, predicate: impl Fn(&Entity) -> bool + 'r) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Apply `predicate` if there is one; otherwise every entity passes.
    pub fn where_lambda_exists_and_true<F>(self, predicate: Option<F>) -> Self
    where
        F: Fn(&Entity) -> bool + 'r,
    {
        match predicate {
            Some(predicate) => self.where_lambda(predicate),
            None => self,
        }
    }

    /// Keep entities whose position is within `range` of `pos`.
    pub fn where_in_range(self, pos: Vec2, range: f32) -> Self {
        self.where_lambda(move |e| {
            e.get::<Transform>()
                .is_some_and(|t| t.position.distance(pos) <= range)
        })
    }

    /// Keep entities whose position lies in the box spanned by `min` and `max`.
    pub fn where_inside(self, min: Vec2, max: Vec2) -> Self {
        self.where_lambda(move |e| {
            e.get::<Transform>().is_some_and(|t| {
                let p = t.position;
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            })
        })
    }

    pub fn where_not_id(self, id: EntityId) -> Self {
        self.where_lambda(move |e| e.id() != id)
    }

    pub fn where_type(self, entity_type: EntityType) -> Self {
        self.where_lambda(move |e| e.entity_type == entity_type)
    }

    /// Keep entities sitting at exactly the same position as `reference`.
    ///
    /// The reference position is read once, when the predicate is added. If
    /// `reference` has no `Transform`, nothing matches.
    pub fn where_position_matches(self, reference: &Entity) -> Self {
        let target = reference.get::<Transform>().map(|t| t.position);
        self.where_lambda(move |e| match (target, e.get::<Transform>()) {
            (Some(target), Some(t)) => t.position == target,
            _ => false,
        })
    }

    // ── Terminals ────────────────────────────────────────────────────

    fn matches(&self, entity: &Entity) -> bool {
        self.predicates.iter().all(|p| p(entity))
    }

    /// Every matching entity, in registry order.
    pub fn all(self) -> Vec<&'r Entity> {
        let registry = self.registry;
        registry.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn first(self) -> Option<&'r Entity> {
        let registry = self.registry;
        registry.iter().find(|e| self.matches(e))
    }

    pub fn exists(self) -> bool {
        self.first().is_some()
    }

    pub fn count(self) -> usize {
        let registry = self.registry;
        registry.iter().filter(|e| self.matches(e)).count()
    }

    pub fn ids(self) -> Vec<EntityId> {
        let registry = self.registry;
        registry
            .iter()
            .filter(|e| self.matches(e))
            .map(Entity::id)
            .collect()
    }
}

// ── Registry lookups ─────────────────────────────────────────────────────

impl EntityRegistry {
    /// Start a query over this registry.
    pub fn query(&self) -> EntityQuery<'_> {
        EntityQuery::new(self)
    }

    /// The entity nearest to `pos` among those passing `filter`, at most
    /// `range` away.
    ///
    /// Equal distances resolve to the entity earliest in registry order.
    pub fn closest_matching(
        &self,
        pos: Vec2,
        range: f32,
        filter: impl Fn(&Entity) -> bool,
    ) -> Option<&Entity> {
        let mut best: Option<(f32, &Entity)> = None;
        for entity in self.iter() {
            if !filter(entity) {
                continue;
            }
            let Some(transform) = entity.get::<Transform>() else {
                continue;
            };
            let d = transform.position.distance(pos);
            if d > range {
                continue;
            }
            if best.is_none_or(|(best_d, _)| d < best_d) {
                best = Some((d, entity));
            }
        }
        best.map(|(_, entity)| entity)
    }

    pub fn entity_for_id(&self, id: Option<EntityId>) -> Option<&Entity> {
        id.and_then(|id| self.get(id))
    }

    /// Nearest entity of `entity_type` around `entity`. `entity` itself is a
    /// candidate too.
    ///
    /// `None` if `entity` has no `Transform`.
    pub fn closest_of_type(
        &self,
        entity: &Entity,
        entity_type: EntityType,
        range: f32,
    ) -> Option<&Entity> {
        let pos = entity.get::<Transform>()?.position;
        self.closest_matching(pos, range, |e| e.entity_type == entity_type)
    }

    /// Nearest entity carrying `T` around `entity`.
    pub fn closest_with_component<T: Component>(
        &self,
        entity: &Entity,
        range: f32,
    ) -> Option<&Entity> {
        let pos = entity.get::<Transform>()?.position;
        self.closest_matching(pos, range, |e| e.has::<T>())
    }

    pub fn all_with_type(&self, entity_type: EntityType) -> Vec<&Entity> {
        self.query().where_type(entity_type).all()
    }

    pub fn does_any_exist_with_type(&self, entity_type: EntityType) -> bool {
        self.query().where_type(entity_type).exists()
    }

    pub fn all_with_component<T: Component>(&self) -> Vec<&Entity> {
        self.query().where_has_component::<T>().all()
    }

    pub fn first_with_component<T: Component>(&self) -> Option<&Entity> {
        self.query().where_has_component::<T>().first()
    }

    pub fn entities_in_range(&self, pos: Vec2, range: f32) -> Vec<&Entity> {
        self.query().where_in_range(pos, range).all()
    }

    pub fn filtered_entities_in_range<'a>(
        &'a self,
        pos: Vec2,
        range: f32,
        filter: impl Fn(&Entity) -> bool + 'a,
    ) -> Vec<&'a Entity> {
        self.query()
            .where_lambda(filter)
            .where_in_range(pos, range)
            .all()
    }

    /// Entities within one unit of `pos`.
    pub fn entities_in_position(&self, pos: Vec2) -> Vec<&Entity> {
        self.entities_in_range(pos, 1.0)
    }

    pub fn all_in_range(&self, min: Vec2, max: Vec2) -> Vec<&Entity> {
        self.query().where_inside(min, max).all()
    }

    pub fn all_in_range_filtered<'a>(
        &'a self,
        min: Vec2,
        max: Vec2,
        filter: impl Fn(&Entity) -> bool + 'a,
    ) -> Vec<&'a Entity> {
        self.query().where_inside(min, max).where_lambda(filter).all()
    }

    /// First solid entity inside the box that shares its exact position with
    /// another solid entity inside the same box.
    pub fn overlapping_solid_entity_in_range<'a, F>(
        &'a self,
        min: Vec2,
        max: Vec2,
        filter: Option<F>,
    ) -> Option<&'a Entity>
    where
        F: Fn(&Entity) -> bool + 'a,
    {
        self.query()
            .where_has_component::<IsSolid>()
            .where_inside(min, max)
            .where_lambda_exists_and_true(filter)
            .where_lambda(move |entity| {
                self.query()
                    .where_not_id(entity.id())
                    .where_has_component::<IsSolid>()
                    .where_inside(min, max)
                    .where_position_matches(entity)
                    .exists()
            })
            .first()
    }

    pub fn has_overlapping_solid_entities_in_range(&self, min: Vec2, max: Vec2) -> bool {
        self.overlapping_solid_entity_in_range::<fn(&Entity) -> bool>(min, max, None)
            .is_some()
    }

    /// Another solid entity within `range` of `entity` and at its exact
    /// position.
    pub fn overlapping_entity_if_exists<'a, F>(
        &'a self,
        entity: &Entity,
        range: f32,
        filter: Option<F>,
    ) -> Option<&'a Entity>
    where
        F: Fn(&Entity) -> bool + 'a,
    {
        let pos = entity.get::<Transform>()?.position;
        self.query()
            .where_not_id(entity.id())
            .where_lambda_exists_and_true(filter)
            .where_has_component::<IsSolid>()
            .where_in_range(pos, range)
            .where_position_matches(entity)
            .first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{IsDraggable, IsSlot};
    use std::cell::Cell;

    fn spawn(registry: &mut EntityRegistry, pos: Vec2) -> EntityId {
        let e = registry.create_entity();
        e.add(Transform::new(pos, Vec2::splat(10.0))).unwrap();
        e.id()
    }

    #[test]
    fn component_presence_and_absence() {
        let mut registry = EntityRegistry::new();
        let a = spawn(&mut registry, Vec2::ZERO);
        let b = spawn(&mut registry, Vec2::ZERO);
        registry.get_mut(b).unwrap().add(IsSlot::default()).unwrap();

        assert_eq!(registry.query().where_has_component::<IsSlot>().ids(), vec![b]);
        assert_eq!(
            registry.query().where_missing_component::<IsSlot>().ids(),
            vec![a]
        );
        assert_eq!(registry.query().count(), 2);
    }

    #[test]
    fn predicates_short_circuit_in_append_order() {
        let mut registry = EntityRegistry::new();
        spawn(&mut registry, Vec2::ZERO);
        spawn(&mut registry, Vec2::ZERO);

        let first_calls = Cell::new(0);
        let second_calls = Cell::new(0);
        let found = registry
            .query()
            .where_lambda(|_| {
                first_calls.set(first_calls.get() + 1);
                false
            })
            .where_lambda(|_| {
                second_calls.set(second_calls.get() + 1);
                true
            })
            .exists();

        assert!(!found);
        assert_eq!(first_calls.get(), 2);
        assert_eq!(second_calls.get(), 0);
    }

    #[test]
    fn first_stops_at_first_match() {
        let mut registry = EntityRegistry::new();
        let a = spawn(&mut registry, Vec2::ZERO);
        spawn(&mut registry, Vec2::ZERO);

        let calls = Cell::new(0);
        let first = registry
            .query()
            .where_lambda(|_| {
                calls.set(calls.get() + 1);
                true
            })
            .first()
            .map(Entity::id);
        assert_eq!(first, Some(a));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn range_is_inclusive() {
        let mut registry = EntityRegistry::new();
        let edge = spawn(&mut registry, Vec2::new(3.0, 4.0));
        spawn(&mut registry, Vec2::new(3.0, 4.1));

        let hits = registry.query().where_in_range(Vec2::ZERO, 5.0).ids();
        assert_eq!(hits, vec![edge]);
    }

    #[test]
    fn inside_is_inclusive_and_needs_transform() {
        let mut registry = EntityRegistry::new();
        let corner = spawn(&mut registry, Vec2::new(10.0, 10.0));
        spawn(&mut registry, Vec2::new(11.0, 5.0));
        registry.create_entity();

        let hits = registry.all_in_range(Vec2::ZERO, Vec2::splat(10.0));
        assert_eq!(hits.iter().map(|e| e.id()).collect::<Vec<_>>(), vec![corner]);
    }

    #[test]
    fn optional_lambda_passes_when_absent() {
        let mut registry = EntityRegistry::new();
        spawn(&mut registry, Vec2::ZERO);
        let none: Option<fn(&Entity) -> bool> = None;
        assert_eq!(registry.query().where_lambda_exists_and_true(none).count(), 1);
        assert_eq!(
            registry
                .query()
                .where_lambda_exists_and_true(Some(|_: &Entity| false))
                .count(),
            0
        );
    }

    #[test]
    fn type_and_id_filters() {
        let mut registry = EntityRegistry::new();
        let a = spawn(&mut registry, Vec2::ZERO);
        let b = spawn(&mut registry, Vec2::ZERO);
        registry.get_mut(b).unwrap().entity_type = EntityType::Card;

        assert_eq!(registry.query().where_not_id(a).ids(), vec![b]);
        assert!(registry.does_any_exist_with_type(EntityType::Card));
        assert!(!registry.does_any_exist_with_type(EntityType::TraySlot));
        assert_eq!(registry.all_with_type(EntityType::Card).len(), 1);
    }

    #[test]
    fn position_matches_reference() {
        let mut registry = EntityRegistry::new();
        let a = spawn(&mut registry, Vec2::new(5.0, 5.0));
        let b = spawn(&mut registry, Vec2::new(5.0, 5.0));
        spawn(&mut registry, Vec2::new(6.0, 5.0));

        let reference = registry.get(a).unwrap();
        let hits = registry
            .query()
            .where_not_id(a)
            .where_position_matches(reference)
            .ids();
        assert_eq!(hits, vec![b]);
    }

    #[test]
    fn closest_matching_picks_nearest_within_range() {
        let mut registry = EntityRegistry::new();
        spawn(&mut registry, Vec2::new(8.0, 0.0));
        let near = spawn(&mut registry, Vec2::new(2.0, 0.0));
        spawn(&mut registry, Vec2::new(50.0, 0.0));

        let found = registry.closest_matching(Vec2::ZERO, 10.0, |_| true);
        assert_eq!(found.map(Entity::id), Some(near));
        assert!(registry.closest_matching(Vec2::ZERO, 1.0, |_| true).is_none());
    }

    #[test]
    fn closest_matching_tie_goes_to_earliest() {
        let mut registry = EntityRegistry::new();
        let first = spawn(&mut registry, Vec2::new(3.0, 0.0));
        spawn(&mut registry, Vec2::new(-3.0, 0.0));

        let found = registry.closest_matching(Vec2::ZERO, 3.0, |_| true);
        assert_eq!(found.map(Entity::id), Some(first));
    }

    #[test]
    fn closest_matching_respects_filter() {
        let mut registry = EntityRegistry::new();
        spawn(&mut registry, Vec2::new(1.0, 0.0));
        let draggable = spawn(&mut registry, Vec2::new(4.0, 0.0));
        registry
            .get_mut(draggable)
            .unwrap()
            .add(IsDraggable)
            .unwrap();

        let found = registry.closest_matching(Vec2::ZERO, 10.0, |e| e.has::<IsDraggable>());
        assert_eq!(found.map(Entity::id), Some(draggable));
    }

    #[test]
    fn overlapping_solids_are_found() {
        let mut registry = EntityRegistry::new();
        let lone = spawn(&mut registry, Vec2::new(1.0, 1.0));
        let a = spawn(&mut registry, Vec2::new(4.0, 4.0));
        let b = spawn(&mut registry, Vec2::new(4.0, 4.0));
        for id in [lone, a, b] {
            registry.get_mut(id).unwrap().add(IsSolid).unwrap();
        }

        let min = Vec2::ZERO;
        let max = Vec2::splat(10.0);
        let found = registry.overlapping_solid_entity_in_range::<fn(&Entity) -> bool>(min, max, None);
        assert_eq!(found.map(Entity::id), Some(a));
        assert!(registry.has_overlapping_solid_entities_in_range(min, max));
        assert!(!registry.has_overlapping_solid_entities_in_range(min, Vec2::splat(2.0)));

        let reference = registry.get(b).unwrap();
        let other = registry.overlapping_entity_if_exists::<fn(&Entity) -> bool>(reference, 1.0, None);
        assert_eq!(other.map(Entity::id), Some(a));
    }

    #[test]
    fn entity_for_id_handles_none() {
        let mut registry = EntityRegistry::new();
        let a = spawn(&mut registry, Vec2::ZERO);
        assert!(registry.entity_for_id(None).is_none());
        assert_eq!(registry.entity_for_id(Some(a)).map(Entity::id), Some(a));
    }

    #[test]
    fn closest_of_type_counts_the_reference_itself() {
        let mut registry = EntityRegistry::new();
        let me = spawn(&mut registry, Vec2::ZERO);
        let other = spawn(&mut registry, Vec2::new(2.0, 0.0));
        for id in [me, other] {
            registry.get_mut(id).unwrap().entity_type = EntityType::Card;
        }

        let reference = registry.get(me).unwrap();
        let found = registry.closest_of_type(reference, EntityType::Card, 5.0);
        assert_eq!(found.map(Entity::id), Some(me));

        let found = registry.closest_matching(Vec2::ZERO, 5.0, |e| {
            e.entity_type == EntityType::Card && e.id() != me
        });
        assert_eq!(found.map(Entity::id), Some(other));
        assert!(registry.closest_of_type(reference, EntityType::TraySlot, 5.0).is_none());

        let bare = registry.create_entity().id();
        let bare = registry.get(bare).unwrap();
        assert!(registry.closest_of_type(bare, EntityType::Card, 5.0).is_none());
    }

    #[test]
    fn closest_and_first_with_component() {
        let mut registry = EntityRegistry::new();
        let me = spawn(&mut registry, Vec2::ZERO);
        let far = spawn(&mut registry, Vec2::new(9.0, 0.0));
        let near = spawn(&mut registry, Vec2::new(3.0, 0.0));
        for id in [far, near] {
            registry.get_mut(id).unwrap().add(IsSlot::default()).unwrap();
        }

        let reference = registry.get(me).unwrap();
        let found = registry.closest_with_component::<IsSlot>(reference, 10.0);
        assert_eq!(found.map(Entity::id), Some(near));
        assert!(registry.closest_with_component::<IsSlot>(reference, 2.0).is_none());

        assert_eq!(
            registry.first_with_component::<IsSlot>().map(Entity::id),
            Some(far)
        );
        assert!(registry.first_with_component::<IsDraggable>().is_none());
    }

    #[test]
    fn entities_in_position_reach_one_unit() {
        let mut registry = EntityRegistry::new();
        let on = spawn(&mut registry, Vec2::new(5.0, 5.0));
        let edge = spawn(&mut registry, Vec2::new(6.0, 5.0));
        spawn(&mut registry, Vec2::new(6.5, 5.0));

        let hits: Vec<_> = registry
            .entities_in_position(Vec2::new(5.0, 5.0))
            .iter()
            .map(|e| e.id())
            .collect();
        assert_eq!(hits, vec![on, edge]);
    }

    #[test]
    fn filtered_range_lookups() {
        let mut registry = EntityRegistry::new();
        let plain = spawn(&mut registry, Vec2::new(1.0, 1.0));
        let draggable = spawn(&mut registry, Vec2::new(2.0, 2.0));
        let outside = spawn(&mut registry, Vec2::new(20.0, 20.0));
        for id in [draggable, outside] {
            registry.get_mut(id).unwrap().add(IsDraggable).unwrap();
        }

        fn ids(hits: Vec<&Entity>) -> Vec<EntityId> {
            hits.iter().map(|e| e.id()).collect()
        }

        assert_eq!(
            ids(registry.filtered_entities_in_range(Vec2::ZERO, 5.0, |e| e.has::<IsDraggable>())),
            vec![draggable]
        );
        assert_eq!(
            ids(registry.filtered_entities_in_range(Vec2::ZERO, 5.0, |e| e.is_missing::<IsDraggable>())),
            vec![plain]
        );
        assert_eq!(
            ids(registry.all_in_range_filtered(Vec2::ZERO, Vec2::splat(30.0), |e| e.has::<IsDraggable>())),
            vec![draggable, outside]
        );
        assert_eq!(
            ids(registry.all_in_range_filtered(Vec2::ZERO, Vec2::splat(10.0), |e| e.has::<IsDraggable>())),
            vec![draggable]
        );
    }
}
