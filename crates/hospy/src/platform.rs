//! # Platform — The Narrow Waist to the Window and Graphics Backend
//!
//! The runtime never talks to a windowing library directly. Everything it
//! needs from the outside world fits in three traits:
//!
//! - [`InputSource`]: where the pointer is and whether the button is held.
//! - [`Renderer`]: filled rectangles and a line of text.
//! - [`Platform`]: both of the above plus frame pacing.
//!
//! [`HeadlessPlatform`] implements all three without a window. It replays a
//! scripted queue of pointer frames and records every draw call, which is
//! what the tests and headless runs use.

use std::collections::VecDeque;

use glam::Vec2;

/// Linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RAY_WHITE: Self = Self::rgb(0.96, 0.96, 0.96);
    pub const DARK_GRAY: Self = Self::rgb(0.31, 0.31, 0.31);
    pub const RED: Self = Self::rgb(0.9, 0.16, 0.22);
    pub const GOLD: Self = Self::rgb(1.0, 0.8, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Pointer state as seen by the backend this frame.
pub trait InputSource {
    fn pointer_position(&self) -> Vec2;
    fn pointer_held(&self) -> bool;
}

/// Immediate-mode drawing.
pub trait Renderer {
    fn clear_background(&mut self, color: Color);
    fn draw_rectangle(&mut self, position: Vec2, size: Vec2, color: Color);
    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);
}

/// A complete backend: input, drawing, and frame pacing.
pub trait Platform: InputSource + Renderer {
    /// Seconds elapsed since the previous frame.
    fn frame_delta(&self) -> f32;
    fn begin_frame(&mut self);
    fn end_frame(&mut self);
    fn should_close(&self) -> bool;
}

// ── Headless ─────────────────────────────────────────────────────────────

/// One scripted frame of pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    pub position: Vec2,
    pub held: bool,
}

impl PointerFrame {
    pub fn held(position: Vec2) -> Self {
        Self {
            position,
            held: true,
        }
    }

    pub fn released(position: Vec2) -> Self {
        Self {
            position,
            held: false,
        }
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rectangle {
        position: Vec2,
        size: Vec2,
        color: Color,
    },
    Text {
        text: String,
        position: Vec2,
        color: Color,
    },
}

/// Window-less backend driven by a script of pointer frames.
///
/// `begin_frame` pops the next scripted frame; the pointer then keeps that
/// state until the next `begin_frame`. Once the script runs out,
/// `should_close` reports `true`. Draw calls of the last completed frame are
/// kept in [`draw_calls`](Self::draw_calls).
pub struct HeadlessPlatform {
    script: VecDeque<PointerFrame>,
    current: PointerFrame,
    frame_delta: f32,
    frames_run: u64,
    recording: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
}

impl HeadlessPlatform {
    /// Fixed step used when no other delta is given: 1/60 s.
    pub const DEFAULT_DELTA: f32 = 1.0 / 60.0;

    pub fn new(script: impl IntoIterator<Item = PointerFrame>) -> Self {
        Self {
            script: script.into_iter().collect(),
            current: PointerFrame::released(Vec2::ZERO),
            frame_delta: Self::DEFAULT_DELTA,
            frames_run: 0,
            recording: Vec::new(),
            last_frame: Vec::new(),
        }
    }

    pub fn with_frame_delta(mut self, frame_delta: f32) -> Self {
        self.frame_delta = frame_delta;
        self
    }

    /// Append more frames to the script.
    pub fn push(&mut self, frame: PointerFrame) {
        self.script.push_back(frame);
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Draw calls of the most recent completed frame.
    pub fn draw_calls(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    /// Rectangles of the most recent completed frame.
    pub fn rectangles(&self) -> impl Iterator<Item = (Vec2, Vec2, Color)> + '_ {
        self.last_frame.iter().filter_map(|cmd| match *cmd {
            DrawCommand::Rectangle {
                position,
                size,
                color,
            } => Some((position, size, color)),
            _ => None,
        })
    }
}

impl InputSource for HeadlessPlatform {
    fn pointer_position(&self) -> Vec2 {
        self.current.position
    }

    fn pointer_held(&self) -> bool {
        self.current.held
    }
}

impl Renderer for HeadlessPlatform {
    fn clear_background(&mut self, color: Color) {
        self.recording.push(DrawCommand::Clear(color));
    }

    fn draw_rectangle(&mut self, position: Vec2, size: Vec2, color: Color) {
        self.recording.push(DrawCommand::Rectangle {
            position,
            size,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, _font_size: f32, color: Color) {
        self.recording.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            color,
        });
    }
}

impl Platform for HeadlessPlatform {
    fn frame_delta(&self) -> f32 {
        self.frame_delta
    }

    fn begin_frame(&mut self) {
        if let Some(frame) = self.script.pop_front() {
            self.current = frame;
        }
        self.recording.clear();
    }

    fn end_frame(&mut self) {
        self.frames_run += 1;
        self.last_frame = std::mem::take(&mut self.recording);
    }

    fn should_close(&self) -> bool {
        self.script.is_empty()
    }
}
