//! Pointer input state.
//!
//! [`PointerState`] is a per-frame snapshot of the pointer, latched from an
//! [`InputSource`] once at the start of a system's frame. Everything the
//! system does afterwards reads the snapshot, so the button cannot appear
//! both held and released within the same frame.

use glam::Vec2;

use crate::platform::InputSource;

/// Latched pointer position and button state.
///
/// - `held`: button is down this frame
/// - `just_pressed`: down this frame, up last frame
/// - `just_released`: up this frame, down last frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    position: Vec2,
    held: bool,
    just_pressed: bool,
    just_released: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a fresh snapshot from `source`.
    pub fn latch(&mut self, source: &dyn InputSource) {
        self.latch_raw(source.pointer_position(), source.pointer_held());
    }

    pub(crate) fn latch_raw(&mut self, position: Vec2, held: bool) {
        let was_held = self.held;
        self.position = position;
        self.held = held;
        self.just_pressed = held && !was_held;
        self.just_released = !held && was_held;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn held(&self) -> bool {
        self.held
    }

    pub fn just_pressed(&self) -> bool {
        self.just_pressed
    }

    pub fn just_released(&self) -> bool {
        self.just_released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_reported_once() {
        let mut pointer = PointerState::new();
        pointer.latch_raw(Vec2::ZERO, true);
        assert!(pointer.held() && pointer.just_pressed());

        pointer.latch_raw(Vec2::ONE, true);
        assert!(pointer.held() && !pointer.just_pressed());
        assert_eq!(pointer.position(), Vec2::ONE);

        pointer.latch_raw(Vec2::ONE, false);
        assert!(!pointer.held() && pointer.just_released());

        pointer.latch_raw(Vec2::ONE, false);
        assert!(!pointer.just_released());
    }
}
