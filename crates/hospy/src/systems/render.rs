//! Rectangle rendering.

use crate::components::{RenderTag, RenderTags, Transform};
use crate::ecs::{EntityRegistry, System};
use crate::platform::{Color, Renderer};

/// Draws every entity with a `Transform` as a filled rectangle, in registry
/// order.
///
/// Entities tagged [`RenderTag::Highlight`] use `highlight` instead of `fill`.
pub struct RenderingSystem {
    pub fill: Color,
    pub highlight: Color,
}

impl Default for RenderingSystem {
    fn default() -> Self {
        Self {
            fill: Color::RED,
            highlight: Color::GOLD,
        }
    }
}

impl System for RenderingSystem {
    fn render(&self, registry: &EntityRegistry, renderer: &mut dyn Renderer, _dt: f32) {
        for entity in registry {
            let Some(transform) = entity.get::<Transform>() else {
                continue;
            };
            let highlighted = entity
                .get::<RenderTags>()
                .is_some_and(|tags| tags.has_tag(RenderTag::Highlight));
            let color = if highlighted { self.highlight } else { self.fill };
            renderer.draw_rectangle(transform.position, transform.size, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessPlatform, Platform, PointerFrame};
    use glam::Vec2;

    #[test]
    fn draws_transforms_with_highlight_color() {
        let mut registry = EntityRegistry::new();
        let plain = registry.create_entity();
        plain.add(Transform::new(Vec2::ZERO, Vec2::ONE)).unwrap();
        let lit = registry.create_entity();
        lit.add(Transform::new(Vec2::ONE, Vec2::ONE)).unwrap();
        lit.add(RenderTags::default()).unwrap().enable(RenderTag::Highlight);
        registry.create_entity();

        let system = RenderingSystem::default();
        let mut platform = HeadlessPlatform::new(Vec::<PointerFrame>::new());
        platform.begin_frame();
        system.render(&registry, &mut platform, 0.0);
        platform.end_frame();

        let colors: Vec<_> = platform.rectangles().map(|(_, _, c)| c).collect();
        assert_eq!(colors, vec![Color::RED, Color::GOLD]);
    }
}
