//! # System — Per-Frame Logic Over the Registry
//!
//! A system is something that runs once per frame against the
//! [`EntityRegistry`]. It has up to three hooks:
//!
//! - `before_frame`: latch volatile input before any work starts.
//! - `update`: mutate entities. Runs in the update pipeline.
//! - `render`: draw entities. Gets `&EntityRegistry`, so it cannot mutate.
//!
//! Any `FnMut(&mut EntityRegistry, f32)` is an update-only system, so small
//! bits of game logic can be plain closures.
//!
//! ## SystemManager
//!
//! The [`SystemManager`] keeps two ordered lists and runs a frame as:
//!
//! ```text
//! for s in update:  s.before_frame(input); s.update(&mut registry, dt)
//! registry.sweep()
//! for s in render:  s.before_frame(input); s.render(&registry, renderer, dt)
//! ```
//!
//! Order is part of the contract. The depth sort sits last in the update list
//! so the render pass always sees a sorted registry.
//!
//! ## Comparison
//!
//! - **hecs**: No system concept at all.
//! - **bevy_ecs**: Parameter injection, parallel execution, run conditions.
//!
//! We're closer to hecs: systems run in the order they were added, one at a
//! time, and that's the whole scheduler.

use crate::config::GameConfig;
use crate::platform::{InputSource, Platform, Renderer};
use crate::systems::{DraggingSystem, RenderingSystem, SortByDepthSystem};

use super::registry::EntityRegistry;

/// Per-frame logic. Every hook defaults to doing nothing.
pub trait System {
    /// Short name used in logs and timings.
    fn name(&self) -> &'static str {
        short_system_name(std::any::type_name::<Self>())
    }

    /// Called once per frame before `update` or `render`.
    fn before_frame(&mut self, _input: &dyn InputSource) {}

    fn update(&mut self, _registry: &mut EntityRegistry, _dt: f32) {}

    fn render(&self, _registry: &EntityRegistry, _renderer: &mut dyn Renderer, _dt: f32) {}
}

/// Blanket impl: any `FnMut(&mut EntityRegistry, f32)` is an update system.
impl<F: FnMut(&mut EntityRegistry, f32)> System for F {
    fn update(&mut self, registry: &mut EntityRegistry, dt: f32) {
        (self)(registry, dt);
    }
}

/// Which pipeline a timing belongs to.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Update,
    Render,
}

/// Time one system took during the most recent frame.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: &'static str,
    pub pass: Pass,
    pub duration_us: f64,
}

/// Two ordered pipelines of boxed systems.
pub struct SystemManager {
    update_systems: Vec<Box<dyn System>>,
    render_systems: Vec<Box<dyn System>>,
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl SystemManager {
    pub fn new() -> Self {
        Self {
            update_systems: Vec::new(),
            render_systems: Vec::new(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// The game's pipelines: drag then depth sort for update, rectangles for
    /// render.
    pub fn with_default_systems(config: &GameConfig) -> Self {
        let mut manager = Self::new();
        manager.add_update_system(DraggingSystem::new(config.snap_radius));
        manager.add_update_system(SortByDepthSystem);
        manager.add_render_system(RenderingSystem::default());
        manager
    }

    /// Append to the update pipeline.
    pub fn add_update_system<S: System + 'static>(&mut self, system: S) {
        log::debug!("update system #{}: {}", self.update_systems.len(), system.name());
        self.update_systems.push(Box::new(system));
    }

    /// Append to the render pipeline.
    pub fn add_render_system<S: System + 'static>(&mut self, system: S) {
        log::debug!("render system #{}: {}", self.render_systems.len(), system.name());
        self.render_systems.push(Box::new(system));
    }

    pub fn update_system_names(&self) -> Vec<&'static str> {
        self.update_systems.iter().map(|s| s.name()).collect()
    }

    pub fn render_system_names(&self) -> Vec<&'static str> {
        self.render_systems.iter().map(|s| s.name()).collect()
    }

    /// Run the update pipeline in order.
    pub fn on_update(&mut self, registry: &mut EntityRegistry, input: &dyn InputSource, dt: f32) {
        for system in &mut self.update_systems {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();

            system.before_frame(input);
            system.update(registry, dt);

            #[cfg(feature = "diagnostics")]
            self.timings.push(SystemTiming {
                name: system.name(),
                pass: Pass::Update,
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });
        }
    }

    /// Run the render pipeline in order.
    pub fn on_render<P: Platform>(&mut self, registry: &EntityRegistry, platform: &mut P, dt: f32) {
        for system in &mut self.render_systems {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();

            system.before_frame(&*platform);
            system.render(registry, platform, dt);

            #[cfg(feature = "diagnostics")]
            self.timings.push(SystemTiming {
                name: system.name(),
                pass: Pass::Render,
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });
        }
    }

    /// One full frame: update, sweep, render.
    pub fn run_frame<P: Platform>(&mut self, registry: &mut EntityRegistry, platform: &mut P, dt: f32) {
        #[cfg(feature = "diagnostics")]
        self.timings.clear();

        self.on_update(registry, &*platform, dt);
        let swept = registry.sweep();
        if swept > 0 {
            log::trace!("frame sweep removed {swept} entities");
        }
        self.on_render(registry, platform, dt);
    }

    /// Per-system timings from the most recent frame.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

impl Default for SystemManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the module path from a fully-qualified type name, keeping only the
/// last meaningful segment (e.g. `hospy::systems::dragging::DraggingSystem`
/// → `DraggingSystem`, `{{closure}}` → `<closure>`).
fn short_system_name(full: &'static str) -> &'static str {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>"
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessPlatform, PointerFrame};
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dummy_system(_registry: &mut EntityRegistry, _dt: f32) {}

    #[test]
    fn manager_captures_system_name() {
        let mut manager = SystemManager::new();
        manager.add_update_system(dummy_system);
        assert_eq!(manager.update_system_names(), vec!["dummy_system"]);
    }

    #[test]
    fn closure_system_name() {
        let mut manager = SystemManager::new();
        manager.add_update_system(|_registry: &mut EntityRegistry, _dt: f32| {});
        assert_eq!(manager.update_system_names(), vec!["<closure>"]);
    }

    #[test]
    fn default_pipelines_are_ordered() {
        let manager = SystemManager::with_default_systems(&GameConfig::default());
        assert_eq!(
            manager.update_system_names(),
            vec!["DraggingSystem", "SortByDepthSystem"]
        );
        assert_eq!(manager.render_system_names(), vec!["RenderingSystem"]);
    }

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl System for Recorder {
        fn before_frame(&mut self, _input: &dyn InputSource) {
            self.log.borrow_mut().push(format!("{}:before", self.label));
        }

        fn update(&mut self, registry: &mut EntityRegistry, _dt: f32) {
            self.log
                .borrow_mut()
                .push(format!("{}:update:{}", self.label, registry.len()));
        }

        fn render(&self, registry: &EntityRegistry, _renderer: &mut dyn Renderer, _dt: f32) {
            self.log
                .borrow_mut()
                .push(format!("{}:render:{}", self.label, registry.len()));
        }
    }

    #[test]
    fn frame_runs_update_then_sweep_then_render() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = SystemManager::new();
        manager.add_update_system(Recorder {
            label: "a",
            log: Rc::clone(&log),
        });
        manager.add_update_system(|registry: &mut EntityRegistry, _dt: f32| {
            let doomed = registry.ids()[0];
            registry.mark_for_cleanup(doomed);
        });
        manager.add_update_system(Recorder {
            label: "b",
            log: Rc::clone(&log),
        });
        manager.add_render_system(Recorder {
            label: "r",
            log: Rc::clone(&log),
        });

        let mut registry = EntityRegistry::new();
        registry.create_entity();
        registry.create_entity();
        let mut platform = HeadlessPlatform::new([PointerFrame::released(Vec2::ZERO)]);
        platform.begin_frame();
        manager.run_frame(&mut registry, &mut platform, 0.016);
        platform.end_frame();

        // The marked entity is still visible to later update systems and gone
        // by the time rendering starts.
        assert_eq!(
            *log.borrow(),
            vec![
                "a:before",
                "a:update:2",
                "b:before",
                "b:update:2",
                "r:before",
                "r:render:1",
            ]
        );
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn timings_cover_both_pipelines() {
        let mut manager = SystemManager::with_default_systems(&GameConfig::default());
        let mut registry = EntityRegistry::new();
        let mut platform = HeadlessPlatform::new([PointerFrame::released(Vec2::ZERO)]);
        manager.run_frame(&mut registry, &mut platform, 0.016);
        manager.run_frame(&mut registry, &mut platform, 0.016);

        let timings = manager.timings();
        assert_eq!(timings.len(), 3);
        assert_eq!(timings[0].name, "DraggingSystem");
        assert_eq!(timings[2].pass, Pass::Render);
    }
}
