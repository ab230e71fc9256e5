//! Game driver and plugin system.
//!
//! [`Game`] owns everything one session needs: configuration, the entity
//! registry, the system pipelines, frame timing, and the walkability cache.
//! A [`Platform`] is passed in per call, so the same game runs against a
//! real window or the [`HeadlessPlatform`](crate::platform::HeadlessPlatform).
//!
//! # Example
//!
//! ```ignore
//! use hospy::prelude::*;
//!
//! fn main() -> hospy::Result<()> {
//!     let config = GameConfig::default();
//!     hospy::logging::init_logger(&config.log)?;
//!
//!     let mut game = Game::new(config)?
//!         .setup(|registry| prefab::setup_tray_table(registry).map(|_| ()))?;
//!     let mut platform = HeadlessPlatform::new(script);
//!     game.run(&mut platform);
//!     Ok(())
//! }
//! ```

use glam::Vec2;

use crate::config::GameConfig;
use crate::ecs::{EntityRegistry, System, SystemManager, register_builtin_components};
use crate::error::Result;
use crate::platform::{Color, Platform};
use crate::time::Time;
use crate::walkability::WalkabilityCache;

/// Bundles related systems so they can be added in one call.
pub trait Plugin {
    fn build(&self, game: &mut Game);
}

/// One running session of the tray game.
pub struct Game {
    config: GameConfig,
    registry: EntityRegistry,
    systems: SystemManager,
    time: Time,
    walkability: WalkabilityCache,
}

impl Game {
    /// Validate `config`, register the built-in components, and build the
    /// default pipelines.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        register_builtin_components()?;
        log::info!(
            "starting game ({}x{}, duplicate policy {:?}, snap radius {})",
            config.window.width,
            config.window.height,
            config.duplicate_policy,
            config.snap_radius
        );
        Ok(Self {
            registry: EntityRegistry::with_policy(config.duplicate_policy),
            systems: SystemManager::with_default_systems(&config),
            time: Time::new(),
            walkability: WalkabilityCache::new(config.tile_size),
            config,
        })
    }

    /// Populate the registry (builder pattern).
    pub fn setup<F>(mut self, populate: F) -> Result<Self>
    where
        F: FnOnce(&mut EntityRegistry) -> Result<()>,
    {
        populate(&mut self.registry)?;
        log::info!("setup created {} entities", self.registry.len());
        Ok(self)
    }

    /// Apply a plugin (builder pattern).
    pub fn plugin(mut self, plugin: impl Plugin) -> Self {
        plugin.build(&mut self);
        self
    }

    /// Append to the update pipeline, after the built-in systems.
    pub fn add_update_system<S: System + 'static>(&mut self, system: S) {
        self.systems.add_update_system(system);
    }

    /// Append to the render pipeline, after the built-in systems.
    pub fn add_render_system<S: System + 'static>(&mut self, system: S) {
        self.systems.add_render_system(system);
    }

    /// Run a single frame against `platform`.
    pub fn frame<P: Platform>(&mut self, platform: &mut P) {
        platform.begin_frame();
        let dt = platform.frame_delta();
        self.time.advance(dt);

        platform.clear_background(Color::RAY_WHITE);
        self.systems.run_frame(&mut self.registry, platform, dt);

        platform.draw_text(
            &format!("{:.0} fps", self.time.fps()),
            Vec2::new(20.0, 20.0),
            20.0,
            Color::DARK_GRAY,
        );
        platform.draw_text(
            &format!("entities: {}", self.registry.len()),
            Vec2::new(20.0, 50.0),
            20.0,
            Color::DARK_GRAY,
        );
        platform.end_frame();
    }

    /// Run frames until the platform asks to close. Returns how many frames
    /// ran.
    pub fn run<P: Platform>(&mut self, platform: &mut P) -> u64 {
        let start = self.time.frame_count();
        while !platform.should_close() {
            self.frame(platform);
        }
        let frames = self.time.frame_count() - start;
        log::info!(
            "platform closed after {frames} frames ({:.2}s)",
            self.time.elapsed_secs()
        );
        frames
    }

    /// Cached walkability of the tile under `pos`.
    pub fn is_walkable(&mut self, pos: Vec2) -> bool {
        self.walkability.is_walkable(&self.registry, pos)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn systems(&self) -> &SystemManager {
        &self.systems
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn walkability_mut(&mut self) -> &mut WalkabilityCache {
        &mut self.walkability
    }
}
