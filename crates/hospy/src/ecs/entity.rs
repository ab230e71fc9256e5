//! # Entity — Identity Plus Owned Components
//!
//! An [`Entity`] is an id, a closed [`EntityType`], and the components it
//! owns. Components live in a fixed array of slots indexed by
//! [`ComponentKind`](super::ComponentKind); a `u64` bitset mirrors which slots
//! are filled so `has::<T>()` is a single bit test.
//!
//! ## Ids Are Never Reused
//!
//! Ids come from a plain incrementing counter. Slot and snappable components
//! refer to each other by id, and a recycled id would silently re-point an
//! old reference at a new entity.
//!
//! ## Duplicates
//!
//! Adding a kind that is already present never creates a second instance.
//! What happens instead depends on the [`DuplicatePolicy`] the entity was
//! created with: strict rejects the call with
//! [`Error::DuplicateComponent`], lenient logs a warning and hands back the
//! existing value untouched.

use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

use super::component::{
    Component, ComponentBundle, ComponentSet, ComponentSlots, kind_name, kind_of,
    short_type_name,
};

/// Identifier of an entity within an [`EntityRegistry`](super::EntityRegistry).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out monotonically increasing [`EntityId`]s.
pub(crate) struct EntityIdAllocator {
    next: u32,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

/// What an entity represents on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityType {
    #[default]
    Unknown,
    X,
    Y,
    Z,
    Card,
    TraySlot,
}

/// How [`Entity::add`] treats a kind that is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Reject with [`Error::DuplicateComponent`] and log at error level.
    #[default]
    Strict,
    /// Log a warning and keep the existing instance.
    Lenient,
}

/// A game object: an id, a type, and up to one component per kind.
pub struct Entity {
    id: EntityId,
    pub entity_type: EntityType,
    components: ComponentSet,
    slots: ComponentSlots,
    cleanup: bool,
    duplicate_policy: DuplicatePolicy,
}

impl Entity {
    pub(crate) fn new(id: EntityId, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            id,
            entity_type: EntityType::Unknown,
            components: ComponentSet::EMPTY,
            slots: ComponentSlots::new(),
            cleanup: false,
            duplicate_policy,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Which kinds this entity carries.
    pub fn components(&self) -> ComponentSet {
        self.components
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Request removal at the next [`EntityRegistry::sweep`](super::EntityRegistry::sweep).
    pub fn mark_for_cleanup(&mut self) {
        self.cleanup = true;
    }

    pub fn is_marked_for_cleanup(&self) -> bool {
        self.cleanup
    }

    // ── Membership ───────────────────────────────────────────────────

    pub fn has<T: Component>(&self) -> bool {
        self.components.contains(kind_of::<T>())
    }

    pub fn is_missing<T: Component>(&self) -> bool {
        !self.has::<T>()
    }

    /// `true` if every component in the bundle is present.
    pub fn has_all<B: ComponentBundle>(&self) -> bool {
        self.components.is_superset(B::kinds())
    }

    /// `true` if at least one component in the bundle is absent.
    pub fn is_missing_any<B: ComponentBundle>(&self) -> bool {
        !self.has_all::<B>()
    }

    // ── Add / Remove ─────────────────────────────────────────────────

    /// Attach `component`, run its attach hook, and return a reference to
    /// the stored value.
    ///
    /// If the kind is already present the entity keeps its existing value;
    /// see [`DuplicatePolicy`] for what is returned.
    pub fn add<T: Component>(&mut self, mut component: T) -> Result<&mut T> {
        let kind = kind_of::<T>();
        let name = short_type_name(std::any::type_name::<T>());

        if self.components.contains(kind) {
            match self.duplicate_policy {
                DuplicatePolicy::Strict => {
                    log::error!("{self} already has component {name} (kind {})", kind.index());
                    return Err(Error::DuplicateComponent {
                        entity: self.id,
                        component: name,
                    });
                }
                DuplicatePolicy::Lenient => {
                    log::warn!(
                        "{self} already has component {name} (kind {}), keeping the existing one",
                        kind.index()
                    );
                    return self.try_get_mut::<T>();
                }
            }
        }

        log::trace!("adding component {name} (kind {}) to {self}", kind.index());
        component.on_attach(self.id);
        self.slots.insert(kind, component);
        self.components.insert(kind);
        self.try_get_mut::<T>()
    }

    /// Add every component in `bundle`, stopping at the first failure.
    pub fn add_bundle<B: ComponentBundle>(&mut self, bundle: B) -> Result<()> {
        bundle.add_to(self)
    }

    /// Detach and drop the `T` component.
    ///
    /// Returns `true` if it was present. Removing an absent kind is logged
    /// and otherwise ignored.
    pub fn remove<T: Component>(&mut self) -> bool {
        let kind = kind_of::<T>();
        let name = short_type_name(std::any::type_name::<T>());
        if !self.components.contains(kind) {
            log::warn!("{self} has no {name} component to remove");
            return false;
        }
        log::trace!("removing component {name} from {self}");
        self.components.remove(kind);
        drop(self.slots.take(kind));
        true
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.slots.get::<T>(kind_of::<T>())
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.slots.get_mut::<T>(kind_of::<T>())
    }

    /// Like [`get`](Self::get), but a missing component is logged and
    /// reported as [`Error::MissingComponent`].
    pub fn try_get<T: Component>(&self) -> Result<&T> {
        match self.get::<T>() {
            Some(component) => Ok(component),
            None => Err(self.missing::<T>()),
        }
    }

    /// Mutable counterpart of [`try_get`](Self::try_get).
    pub fn try_get_mut<T: Component>(&mut self) -> Result<&mut T> {
        if self.get::<T>().is_none() {
            return Err(self.missing::<T>());
        }
        let entity = self.id;
        self.slots
            .get_mut::<T>(kind_of::<T>())
            .ok_or(Error::MissingComponent {
                entity,
                component: short_type_name(std::any::type_name::<T>()),
            })
    }

    fn missing<T: Component>(&self) -> Error {
        let component = short_type_name(std::any::type_name::<T>());
        log::warn!("{self} is missing component {component}");
        Error::MissingComponent {
            entity: self.id,
            component,
        }
    }

    /// `true` when the bitset and the slots agree for every kind.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        use super::component::{ComponentKind, MAX_COMPONENTS};
        (0..MAX_COMPONENTS)
            .map(ComponentKind::from_index)
            .all(|kind| self.components.contains(kind) == self.slots.is_occupied(kind))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("entity_type", &self.entity_type)
            .field(
                "components",
                &self.components.iter().map(kind_name).collect::<Vec<_>>(),
            )
            .field("cleanup", &self.cleanup)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.entity_type, self.id)
    }
}
