//! Depth ordering.

use crate::components::Transform;
use crate::ecs::{EntityRegistry, System};

/// Stable sort of the registry by `Transform::z`, lowest first.
///
/// Entities without a `Transform` sort as depth 0. Equal depths keep their
/// relative order.
pub struct SortByDepthSystem;

fn depth(entity: &crate::ecs::Entity) -> f32 {
    entity.get::<Transform>().map_or(0.0, |t| t.z)
}

impl System for SortByDepthSystem {
    fn update(&mut self, registry: &mut EntityRegistry, _dt: f32) {
        registry.sort_by(|a, b| depth(a).total_cmp(&depth(b)));
    }
}
