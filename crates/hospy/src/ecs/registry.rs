//! # Entity Registry — Ordered Ownership and Lifecycle
//!
//! The registry owns every [`Entity`] in a single `Vec`. Insertion order is
//! iteration order, and several rules lean on it: overlapping cards resolve
//! to whichever was created first, and ties in nearest-entity lookups go to
//! the earlier entity.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──► live ──► mark_for_cleanup ──► sweep (after the update pipeline)
//!              │
//!              └────► remove_immediately
//! ```
//!
//! Deferred removal exists so a system can retire an entity while other
//! systems later in the same frame still see it. [`EntityRegistry::sweep`]
//! keeps survivors in their original order.
//!
//! ## Permanent Entities
//!
//! Entities created with `permanent = true` survive `clear(false)`, which is
//! how a level reset wipes the table but keeps long-lived fixtures around.
//!
//! ## Slot Links
//!
//! Every removal path releases the slot links of the entities it drops
//! ([`release_links`]), so survivors never point at a removed entity.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: Archetype tables with generational ids and
//!   unordered iteration. We keep a flat ordered list because ordering is
//!   observable game behaviour here, and a table of a few dozen cards never
//!   needs archetype speedups.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::entity::{DuplicatePolicy, Entity, EntityId, EntityIdAllocator};
use crate::systems::snap::release_links;

/// What a [`EntityRegistry::for_each`] visitor wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForEachFlow {
    /// Carry on with the next entity.
    #[default]
    NormalFlow,
    /// Skip the rest of this entity's work and carry on.
    Continue,
    /// Stop visiting.
    Break,
}

/// Ordered owning collection of entities.
pub struct EntityRegistry {
    entities: Vec<Entity>,
    permanent: HashSet<EntityId>,
    ids: EntityIdAllocator,
    duplicate_policy: DuplicatePolicy,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// Registry whose entities treat duplicate components per `policy`.
    pub fn with_policy(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            entities: Vec::new(),
            permanent: HashSet::new(),
            ids: EntityIdAllocator::new(),
            duplicate_policy,
        }
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Create an empty entity at the end of the registry.
    pub fn create(&mut self, permanent: bool) -> &mut Entity {
        let id = self.ids.allocate();
        if permanent {
            self.permanent.insert(id);
        }
        log::trace!("created entity {id} (permanent: {permanent})");
        let index = self.entities.len();
        self.entities.push(Entity::new(id, self.duplicate_policy));
        &mut self.entities[index]
    }

    pub fn create_entity(&mut self) -> &mut Entity {
        self.create(false)
    }

    pub fn create_permanent_entity(&mut self) -> &mut Entity {
        self.create(true)
    }

    // ── Removal ──────────────────────────────────────────────────────

    /// Flag the entity for removal at the next [`sweep`](Self::sweep).
    ///
    /// Unknown ids are ignored.
    pub fn mark_for_cleanup(&mut self, id: EntityId) {
        match self.get_mut(id) {
            Some(entity) => entity.mark_for_cleanup(),
            None => log::debug!("mark_for_cleanup: no entity {id}"),
        }
    }

    /// Remove the entity right now. Returns `true` if anything was removed.
    pub fn remove_immediately(&mut self, id: EntityId) -> bool {
        release_links(self, id);
        let before = self.entities.len();
        self.entities.retain(|e| e.id() != id);
        self.permanent.remove(&id);
        let removed = before != self.entities.len();
        if removed {
            log::trace!("removed entity {id}");
        }
        removed
    }

    /// Drop every entity flagged for cleanup, keeping the rest in order.
    ///
    /// Returns how many entities were removed.
    pub fn sweep(&mut self) -> usize {
        let doomed: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| e.is_marked_for_cleanup())
            .map(Entity::id)
            .collect();
        for &id in &doomed {
            release_links(self, id);
        }

        let before = self.entities.len();
        let permanent = &mut self.permanent;
        self.entities.retain(|e| {
            if e.is_marked_for_cleanup() {
                permanent.remove(&e.id());
                false
            } else {
                true
            }
        });
        let removed = before - self.entities.len();
        if removed > 0 {
            log::debug!("swept {removed} entities");
        }
        removed
    }

    /// Remove every entity, or every non-permanent one.
    pub fn clear(&mut self, include_permanent: bool) {
        if include_permanent {
            self.entities.clear();
            self.permanent.clear();
        } else {
            let doomed: Vec<EntityId> = self
                .entities
                .iter()
                .map(Entity::id)
                .filter(|id| !self.permanent.contains(id))
                .collect();
            for &id in &doomed {
                release_links(self, id);
            }
            let permanent = &self.permanent;
            self.entities.retain(|e| permanent.contains(&e.id()));
        }
        log::debug!(
            "cleared registry (include_permanent: {include_permanent}), {} left",
            self.entities.len()
        );
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_permanent(&self, id: EntityId) -> bool {
        self.permanent.contains(&id)
    }

    /// Entities in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    /// Ids in registry order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities ever created, removed ones included.
    pub fn created_count(&self) -> u32 {
        self.ids.issued()
    }

    // ── Iteration ────────────────────────────────────────────────────

    /// Visit entities in order until the visitor returns [`ForEachFlow::Break`].
    pub fn for_each(&self, mut visitor: impl FnMut(&Entity) -> ForEachFlow) {
        for entity in &self.entities {
            if visitor(entity) == ForEachFlow::Break {
                break;
            }
        }
    }

    /// Mutable counterpart of [`for_each`](Self::for_each).
    pub fn for_each_mut(&mut self, mut visitor: impl FnMut(&mut Entity) -> ForEachFlow) {
        for entity in &mut self.entities {
            if visitor(entity) == ForEachFlow::Break {
                break;
            }
        }
    }

    /// Stable reorder of the registry.
    pub fn sort_by(&mut self, compare: impl FnMut(&Entity, &Entity) -> Ordering) {
        self.entities.sort_by(compare);
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> IntoIterator for &'r EntityRegistry {
    type Item = &'r Entity;
    type IntoIter = std::slice::Iter<'r, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
