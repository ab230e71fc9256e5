//! # Component — Kind Identity and Per-Entity Storage
//!
//! Components are plain data: a `Transform`, an `IsSlot`, a marker like
//! `IsDraggable`. Each entity owns at most one value per component *kind*.
//!
//! ## Kind Identity
//!
//! Every component type gets a small integer, its [`ComponentKind`], the first
//! time it is used. Kinds are handed out in increasing order and never change
//! for the rest of the process. The integer indexes two parallel structures on
//! every entity:
//!
//! ```text
//! kind:          0          1          2          3   ...  63
//! ComponentSet:  1          0          1          0   ...   0    (u64 bitset)
//! slots:         Transform  None       IsSlot     None ...  None
//! ```
//!
//! Bit `i` is set exactly when slot `i` holds a value. The bitset makes
//! membership tests a single AND; the slots own the values.
//!
//! ## Capacity
//!
//! The bitset is a `u64`, so at most [`MAX_COMPONENTS`] kinds can exist. The
//! [`KindRegistry`] refuses to hand out a 65th kind instead of wrapping into a
//! bit that already belongs to someone else. [`register_builtin_components`]
//! registers every game component at startup so an overflow shows up before
//! the first frame, not in the middle of a drag.
//!
//! ## Storage
//!
//! Slots are `Option<Box<dyn Any + Send + Sync>>`, downcast on access. Like
//! the column storage this replaces, it trades cache locality for zero unsafe
//! code.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use crate::error::{Error, Result};

use super::entity::EntityId;

/// Number of distinct component kinds a process may register.
pub const MAX_COMPONENTS: usize = 64;

const _: () = assert!(MAX_COMPONENTS <= u64::BITS as usize);

/// Plain data that can be attached to an [`Entity`](super::Entity).
///
/// `on_attach` runs once, right before the value is stored, with the id of
/// the owning entity. The id is a back-reference only; the entity owns the
/// component, never the other way round.
pub trait Component: Any + Send + Sync {
    fn on_attach(&mut self, _owner: EntityId) {}
}

/// Stable small integer identifying a component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKind(u8);

impl ComponentKind {
    /// Index into an entity's slot array and bit position in its [`ComponentSet`].
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u8)
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.0)
    }
}

/// Hands out [`ComponentKind`]s in first-use order, up to a fixed capacity.
///
/// The process-wide instance behind [`kind_of`] uses [`MAX_COMPONENTS`].
/// Smaller instances exist so capacity handling can be exercised without
/// exhausting the global one.
pub struct KindRegistry {
    capacity: usize,
    kinds: HashMap<TypeId, ComponentKind>,
    names: Vec<&'static str>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::with_capacity(MAX_COMPONENTS)
    }

    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_COMPONENTS`].
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= MAX_COMPONENTS,
            "KindRegistry capacity {capacity} exceeds the bitset width {MAX_COMPONENTS}"
        );
        Self {
            capacity,
            kinds: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Return the kind for `T`, assigning the next free one on first call.
    pub fn register<T: 'static>(&mut self) -> Result<ComponentKind> {
        if let Some(&kind) = self.kinds.get(&TypeId::of::<T>()) {
            return Ok(kind);
        }
        let component = std::any::type_name::<T>();
        if self.names.len() >= self.capacity {
            return Err(Error::CapacityOverflow {
                component,
                capacity: self.capacity,
            });
        }
        let kind = ComponentKind(self.names.len() as u8);
        self.kinds.insert(TypeId::of::<T>(), kind);
        self.names.push(component);
        log::debug!("registered component kind {} for `{}`", kind.0, component);
        Ok(kind)
    }

    /// Kind for `T` if it was registered.
    pub fn get<T: 'static>(&self) -> Option<ComponentKind> {
        self.kinds.get(&TypeId::of::<T>()).copied()
    }

    /// Full type name of the component behind `kind`.
    pub fn name(&self, kind: ComponentKind) -> Option<&'static str> {
        self.names.get(kind.index()).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn global_kinds() -> &'static Mutex<KindRegistry> {
    static KINDS: OnceLock<Mutex<KindRegistry>> = OnceLock::new();
    KINDS.get_or_init(|| Mutex::new(KindRegistry::new()))
}

/// Process-wide kind for `T`, or [`Error::CapacityOverflow`].
pub fn try_kind_of<T: Component>() -> Result<ComponentKind> {
    let mut kinds = global_kinds()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    kinds.register::<T>()
}

/// Process-wide kind for `T`.
///
/// # Panics
///
/// Panics if every kind is taken. Running out of kinds is a build
/// configuration error, not something a frame can recover from.
pub fn kind_of<T: Component>() -> ComponentKind {
    try_kind_of::<T>().unwrap_or_else(|e| panic!("{e}"))
}

/// Short type name for the component behind `kind`, for log lines.
pub fn kind_name(kind: ComponentKind) -> &'static str {
    let kinds = global_kinds()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    kinds
        .name(kind)
        .map(short_type_name)
        .unwrap_or("<unregistered>")
}

/// Register every component the game ships with.
///
/// Call once at startup. Fails if the game's own components no longer fit in
/// [`MAX_COMPONENTS`].
pub fn register_builtin_components() -> Result<()> {
    use crate::components::{IsDraggable, IsSlot, IsSolid, RenderTags, SnapsToSlot, Transform};

    try_kind_of::<Transform>()?;
    try_kind_of::<RenderTags>()?;
    try_kind_of::<IsDraggable>()?;
    try_kind_of::<SnapsToSlot>()?;
    try_kind_of::<IsSlot>()?;
    try_kind_of::<IsSolid>()?;
    Ok(())
}

pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

// ── ComponentSet ─────────────────────────────────────────────────────────

/// Fixed-width membership set, one bit per [`ComponentKind`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentSet(u64);

impl ComponentSet {
    pub const EMPTY: Self = Self(0);

    pub fn insert(&mut self, kind: ComponentKind) {
        self.0 |= 1 << kind.0;
    }

    pub fn remove(&mut self, kind: ComponentKind) {
        self.0 &= !(1 << kind.0);
    }

    pub fn contains(self, kind: ComponentKind) -> bool {
        self.0 & (1 << kind.0) != 0
    }

    /// `true` if every kind in `other` is also in `self`.
    pub fn is_superset(self, other: ComponentSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// `true` if the two sets share at least one kind.
    pub fn intersects(self, other: ComponentSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Kinds in ascending order.
    pub fn iter(self) -> impl Iterator<Item = ComponentKind> {
        (0..MAX_COMPONENTS as u8)
            .filter(move |&bit| self.0 & (1 << bit) != 0)
            .map(ComponentKind)
    }
}

impl fmt::Debug for ComponentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentSet({:#066b})", self.0)
    }
}

// ── Slots ────────────────────────────────────────────────────────────────

type Slot = Option<Box<dyn Any + Send + Sync>>;

/// One owned storage location per component kind.
pub(crate) struct ComponentSlots {
    data: Box<[Slot]>,
}

impl ComponentSlots {
    pub fn new() -> Self {
        Self {
            data: std::iter::repeat_with(|| None).take(MAX_COMPONENTS).collect(),
        }
    }

    pub fn insert<T: Component>(&mut self, kind: ComponentKind, value: T) {
        self.data[kind.index()] = Some(Box::new(value));
    }

    /// Take the value out of the slot. Dropping the box drops the component.
    pub fn take(&mut self, kind: ComponentKind) -> Slot {
        self.data[kind.index()].take()
    }

    pub fn get<T: Component>(&self, kind: ComponentKind) -> Option<&T> {
        self.data[kind.index()].as_ref()?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Component>(&mut self, kind: ComponentKind) -> Option<&mut T> {
        self.data[kind.index()].as_mut()?.downcast_mut::<T>()
    }

    pub fn is_occupied(&self, kind: ComponentKind) -> bool {
        self.data[kind.index()].is_some()
    }
}

// ── Bundles ──────────────────────────────────────────────────────────────

/// A group of components added or tested together.
///
/// Implemented for tuples of up to eight components, so
/// `entity.add_bundle((Transform::default(), IsDraggable))` and
/// `entity.has_all::<(Transform, IsDraggable)>()` both work.
pub trait ComponentBundle {
    /// The set of kinds in this bundle.
    fn kinds() -> ComponentSet;

    /// Add each component to `entity`, in tuple order.
    fn add_to(self, entity: &mut super::Entity) -> Result<()>;
}

macro_rules! impl_component_bundle {
    ($($C:ident),+) => {
        impl<$($C: Component),+> ComponentBundle for ($($C,)+) {
            fn kinds() -> ComponentSet {
                let mut set = ComponentSet::EMPTY;
                $(set.insert(kind_of::<$C>());)+
                set
            }

            #[allow(non_snake_case)]
            fn add_to(self, entity: &mut super::Entity) -> Result<()> {
                let ($($C,)+) = self;
                $(entity.add($C)?;)+
                Ok(())
            }
        }
    };
}

impl_component_bundle!(A);
impl_component_bundle!(A, B);
impl_component_bundle!(A, B, C);
impl_component_bundle!(A, B, C, D);
impl_component_bundle!(A, B, C, D, E);
impl_component_bundle!(A, B, C, D, E, F);
impl_component_bundle!(A, B, C, D, E, F, G);
impl_component_bundle!(A, B, C, D, E, F, G, H);
