//! # Walkability — Memoized "Can I Stand Here?"
//!
//! Answering whether a point is walkable means scanning every entity for a
//! solid one nearby. Path searches ask the same question for the same tiles
//! over and over, so verdicts are cached per tile:
//!
//! ```text
//! pos ──floor(pos / tile_size)──► tile ──► cache hit?  ── yes ──► verdict
//!                                              │
//!                                              no ──► scan from tile origin, store
//! ```
//!
//! A miss is resolved at the tile's origin (`tile * tile_size`), never at the
//! queried point, so every point of a tile gets the same verdict regardless
//! of which one was asked first.
//!
//! The cache is never invalidated on its own. Whoever moves or spawns a solid
//! entity calls [`WalkabilityCache::invalidate`] for the affected position
//! (or [`invalidate_all`](WalkabilityCache::invalidate_all)); until then a
//! stale verdict is returned.

use std::collections::HashMap;

use glam::{IVec2, Vec2};

use crate::components::{IsSolid, Transform};
use crate::ecs::{EntityRegistry, ForEachFlow};

/// Per-tile memo of walkability verdicts.
pub struct WalkabilityCache {
    tile_size: f32,
    cache: HashMap<IVec2, bool>,
}

impl WalkabilityCache {
    /// # Panics
    ///
    /// Panics if `tile_size` is not a positive finite number.
    pub fn new(tile_size: f32) -> Self {
        assert!(
            tile_size.is_finite() && tile_size > 0.0,
            "tile size must be positive, got {tile_size}"
        );
        Self {
            tile_size,
            cache: HashMap::new(),
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Tile containing `pos`.
    pub fn tile_of(&self, pos: Vec2) -> IVec2 {
        (pos / self.tile_size).floor().as_ivec2()
    }

    /// Top-left corner of `tile` in world units.
    pub fn tile_origin(&self, tile: IVec2) -> Vec2 {
        tile.as_vec2() * self.tile_size
    }

    /// Cached verdict for the tile under `pos`, computing it on a miss.
    pub fn is_walkable(&mut self, registry: &EntityRegistry, pos: Vec2) -> bool {
        let tile = self.tile_of(pos);
        if let Some(&walkable) = self.cache.get(&tile) {
            return walkable;
        }
        let walkable = self.is_walkable_raw(registry, self.tile_origin(tile));
        log::trace!("walkability of tile {tile}: {walkable}");
        self.cache.insert(tile, walkable);
        walkable
    }

    /// Uncached check: no solid entity within half a tile of `pos`, boundary
    /// included.
    pub fn is_walkable_raw(&self, registry: &EntityRegistry, pos: Vec2) -> bool {
        let reach = self.tile_size / 2.0;
        let mut walkable = true;
        registry.for_each(|entity| {
            if entity.is_missing::<IsSolid>() {
                return ForEachFlow::Continue;
            }
            let Some(transform) = entity.get::<Transform>() else {
                return ForEachFlow::Continue;
            };
            if transform.position.distance(pos) <= reach {
                walkable = false;
                return ForEachFlow::Break;
            }
            ForEachFlow::NormalFlow
        });
        walkable
    }

    /// Forget the verdict for the tile under `pos`.
    pub fn invalidate(&mut self, pos: Vec2) {
        let tile = self.tile_of(pos);
        self.cache.remove(&tile);
    }

    /// Forget every verdict.
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for WalkabilityCache {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_at(registry: &mut EntityRegistry, pos: Vec2) {
        let e = registry.create_entity();
        e.add(Transform::new(pos, Vec2::ONE)).unwrap();
        e.add(IsSolid).unwrap();
    }

    #[test]
    fn solid_entities_block() {
        let mut registry = EntityRegistry::new();
        solid_at(&mut registry, Vec2::new(3.0, 3.0));
        let mut cache = WalkabilityCache::new(1.0);

        assert!(!cache.is_walkable(&registry, Vec2::new(3.2, 3.2)));
        assert!(cache.is_walkable(&registry, Vec2::new(5.0, 5.0)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn non_solid_entities_are_ignored() {
        let mut registry = EntityRegistry::new();
        registry
            .create_entity()
            .add(Transform::new(Vec2::ZERO, Vec2::ONE))
            .unwrap();
        let cache = WalkabilityCache::new(1.0);
        assert!(cache.is_walkable_raw(&registry, Vec2::ZERO));
    }

    #[test]
    fn stale_until_invalidated() {
        let mut registry = EntityRegistry::new();
        let mut cache = WalkabilityCache::new(1.0);
        let spot = Vec2::new(2.0, 2.0);
        assert!(cache.is_walkable(&registry, spot));

        solid_at(&mut registry, spot);
        // The verdict is memoized, so the new obstacle goes unnoticed.
        assert!(cache.is_walkable(&registry, spot));

        cache.invalidate(spot);
        assert!(!cache.is_walkable(&registry, spot));

        registry.clear(true);
        assert!(!cache.is_walkable(&registry, spot));
        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(cache.is_walkable(&registry, spot));
    }

    #[test]
    fn positions_map_to_floored_tiles() {
        let cache = WalkabilityCache::new(10.0);
        assert_eq!(cache.tile_of(Vec2::new(0.0, 9.9)), IVec2::new(0, 0));
        assert_eq!(cache.tile_of(Vec2::new(-0.1, 10.0)), IVec2::new(-1, 1));
        assert_eq!(cache.tile_origin(IVec2::new(-1, 1)), Vec2::new(-10.0, 10.0));
    }

    #[test]
    fn verdict_does_not_depend_on_query_order_within_a_tile() {
        let mut registry = EntityRegistry::new();
        solid_at(&mut registry, Vec2::new(3.0, 3.0));
        let corner = Vec2::new(3.0, 3.0);
        let far_corner = Vec2::new(3.9, 3.9);

        let mut far_first = WalkabilityCache::new(1.0);
        let a = far_first.is_walkable(&registry, far_corner);
        let b = far_first.is_walkable(&registry, corner);

        let mut near_first = WalkabilityCache::new(1.0);
        let c = near_first.is_walkable(&registry, corner);
        let d = near_first.is_walkable(&registry, far_corner);

        assert!(!a && !b && !c && !d);
        assert_eq!(
            b,
            far_first.is_walkable_raw(&registry, far_first.tile_origin(IVec2::new(3, 3)))
        );
        assert_eq!(far_first.len(), 1);
    }
}
