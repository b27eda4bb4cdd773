//! # Types Module
//!
//! Shared data types used across the transition core.
//!
//! ## Responsibilities
//! - **Color**: RGBA color representation with tweening support.
//! - **Shape**: The captured start/end visual state of a transition.
//!
//! ## Key Types
//! - `Color`: Float-based RGBA color.
//! - `Shape`: Origin, size, corner radius, background color and elevation.

use keyframe::CanTween;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Highest Material elevation with tabulated shadow metrics.
pub const MAX_ELEVATION: u8 = 24;

/// Represents a RGBA color in float format (0.0 - 1.0).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const YELLOW: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Linear blend towards `to`; `t` is not clamped.
    pub fn lerp(&self, to: &Color, t: f32) -> Color {
        Self {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
            a: self.a + (to.a - self.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl CanTween for Color {
    fn ease(from: Self, to: Self, time: impl keyframe::num_traits::Float) -> Self {
        let t = time.to_f32().unwrap_or(0.0);
        from.lerp(&to, t)
    }
}

/// One end of a transition: a rounded rectangle with a fill and an elevation.
///
/// Coordinates are in whatever space the host uses; nothing here converts units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Top-left corner in host coordinates.
    pub origin: Point,
    pub size: Size,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default)]
    pub background_color: Option<Color>,
    /// Material elevation, 0..=24. Validated when a transition is planned.
    #[serde(default)]
    pub elevation: u8,
}

impl Shape {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            corner_radius: 0.0,
            background_color: None,
            elevation: 0,
        }
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_elevation(mut self, elevation: u8) -> Self {
        self.elevation = elevation;
        self
    }

    /// The frame in host coordinates.
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// The frame moved to the local origin.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.size)
    }

    pub fn center(&self) -> Point {
        self.frame().center()
    }

    pub fn is_rounded(&self) -> bool {
        self.corner_radius > 0.0
    }

    /// A 56x56 floating action button anchored 16 units from the
    /// bottom-right corner of `container`.
    pub fn fab(container: Size) -> Self {
        Shape::new(
            Point::new(container.width - 72.0, container.height - 72.0),
            Size::new(56.0, 56.0),
        )
        .with_corner_radius(28.0)
        .with_background(Color::RED)
        .with_elevation(6)
    }

    /// A 200x150 dialog centered in `container`.
    pub fn dialog(container: Size) -> Self {
        Shape::new(
            Point::new(container.width / 2.0 - 100.0, container.height / 2.0 - 75.0),
            Size::new(200.0, 150.0),
        )
        .with_corner_radius(2.0)
        .with_background(Color::YELLOW)
        .with_elevation(MAX_ELEVATION)
    }
}
