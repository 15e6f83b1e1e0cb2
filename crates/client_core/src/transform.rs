//! Pan/zoom state of an image inside its display frame.
//!
//! Every editing surface owns a [`TransformRange`] that fixes the offset
//! convention, the scale bounds, the step sizes and the reset default. All
//! updates clamp; nothing here can fail.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformConvention {
    /// Signed percentage offset from the frame centre, `[-50, 50]`.
    Centered,
    /// Absolute position percentage inside the frame, `[0, 100]`.
    Absolute,
}

impl TransformConvention {
    pub fn offset_bounds(self) -> (f64, f64) {
        match self {
            TransformConvention::Centered => (-50.0, 50.0),
            TransformConvention::Absolute => (0.0, 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl TransformState {
    pub const fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }
}

impl Default for TransformState {
    fn default() -> Self {
        TransformRange::CENTERED.reset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    Left,
    Right,
    Up,
    Down,
    ZoomIn,
    ZoomOut,
}

/// Aspect of the uploaded image, used by slots whose horizontal controls
/// follow the long edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Unknown,
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width >= height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformRange {
    pub convention: TransformConvention,
    pub min_scale: f64,
    pub max_scale: f64,
    pub default: TransformState,
    pub move_step: f64,
    pub wide_step: f64,
    pub zoom_step: f64,
}

impl TransformRange {
    /// Single-image editors: phone preview, AI style and generate screens.
    pub const CENTERED: TransformRange = TransformRange {
        convention: TransformConvention::Centered,
        min_scale: 0.5,
        max_scale: 5.0,
        default: TransformState::new(0.0, 0.0, 2.0),
        move_step: 5.0,
        wide_step: 5.0,
        zoom_step: 0.1,
    };

    /// Cover shoot and glitch editors.
    pub const CENTERED_TIGHT: TransformRange = TransformRange {
        convention: TransformConvention::Centered,
        min_scale: 1.0,
        max_scale: 3.0,
        default: TransformState::new(0.0, 0.0, 2.0),
        move_step: 5.0,
        wide_step: 5.0,
        zoom_step: 0.1,
    };

    /// Per-slot editor of the 2/3/4-in-1 layouts.
    pub const MULTI_SLOT: TransformRange = TransformRange {
        convention: TransformConvention::Centered,
        min_scale: 0.5,
        max_scale: 5.0,
        default: TransformState::new(0.0, 0.0, 2.0),
        move_step: 10.0,
        wide_step: 10.0,
        zoom_step: 0.2,
    };

    /// Film strip frames, positioned absolutely.
    pub const ABSOLUTE: TransformRange = TransformRange {
        convention: TransformConvention::Absolute,
        min_scale: 1.0,
        max_scale: 3.0,
        default: TransformState::new(50.0, 50.0, 1.0),
        move_step: 5.0,
        wide_step: 10.0,
        zoom_step: 0.1,
    };

    pub fn reset(&self) -> TransformState {
        self.default
    }

    pub fn clamp(&self, state: TransformState) -> TransformState {
        let (low, high) = self.convention.offset_bounds();
        TransformState {
            x: clamp_or(state.x, low, high, self.default.x),
            y: clamp_or(state.y, low, high, self.default.y),
            scale: clamp_or(state.scale, self.min_scale, self.max_scale, self.default.scale),
        }
    }

    pub fn move_by(&self, current: TransformState, dx: f64, dy: f64) -> TransformState {
        self.clamp(TransformState {
            x: current.x + finite_or_zero(dx),
            y: current.y + finite_or_zero(dy),
            scale: current.scale,
        })
    }

    pub fn zoom_by(&self, current: TransformState, dz: f64) -> TransformState {
        self.clamp(TransformState {
            scale: current.scale + finite_or_zero(dz),
            ..current
        })
    }

    pub fn nudge(&self, current: TransformState, nudge: Nudge) -> TransformState {
        match nudge {
            Nudge::Left => self.move_by(current, -self.move_step, 0.0),
            Nudge::Right => self.move_by(current, self.move_step, 0.0),
            Nudge::Up => self.move_by(current, 0.0, -self.move_step),
            Nudge::Down => self.move_by(current, 0.0, self.move_step),
            Nudge::ZoomIn => self.zoom_by(current, self.zoom_step),
            Nudge::ZoomOut => self.zoom_by(current, -self.zoom_step),
        }
    }

    /// Horizontal nudges pan along the long edge: landscape frames move on x,
    /// anything else moves on y. Uses the wide step for horizontal controls.
    pub fn nudge_oriented(
        &self,
        current: TransformState,
        nudge: Nudge,
        orientation: Orientation,
    ) -> TransformState {
        let landscape = orientation == Orientation::Landscape;
        match nudge {
            Nudge::Left if landscape => self.move_by(current, -self.wide_step, 0.0),
            Nudge::Right if landscape => self.move_by(current, self.wide_step, 0.0),
            Nudge::Left => self.move_by(current, 0.0, -self.wide_step),
            Nudge::Right => self.move_by(current, 0.0, self.wide_step),
            other => self.nudge(current, other),
        }
    }
}

/// Text overlay anchor, absolute percentage from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextPosition {
    pub x: f64,
    pub y: f64,
}

impl TextPosition {
    pub const STEP: f64 = 5.0;

    pub fn clamped(self) -> Self {
        Self {
            x: clamp_or(self.x, 0.0, 100.0, 50.0),
            y: clamp_or(self.y, 0.0, 100.0, 50.0),
        }
    }

    pub fn nudge(self, nudge: Nudge) -> Self {
        let (dx, dy) = match nudge {
            Nudge::Left => (-Self::STEP, 0.0),
            Nudge::Right => (Self::STEP, 0.0),
            Nudge::Up => (0.0, -Self::STEP),
            Nudge::Down => (0.0, Self::STEP),
            Nudge::ZoomIn | Nudge::ZoomOut => (0.0, 0.0),
        };
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
        .clamped()
    }
}

impl Default for TextPosition {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

fn finite_or_zero(delta: f64) -> f64 {
    if delta.is_finite() {
        delta
    } else {
        0.0
    }
}

fn clamp_or(value: f64, low: f64, high: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(low, high)
    }
}

#[cfg(test)]
#[path = "tests/transform_tests.rs"]
mod tests;
