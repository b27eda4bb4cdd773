//! # Shadow Geometry
//!
//! Builds the paths a shadow layer needs while its shape morphs.
//!
//! ## Responsibilities
//! - **Spread Inset**: How far a shadow ring extends past the shape.
//! - **Shadow Paths**: The rect or rounded rect a layer casts its shadow from.
//! - **Mask Rings**: Two nested contours filled with the even-odd rule, so the
//!   shadow stays visible around the shape but never under it.

use crate::shadows::ShadowProperties;
use crate::types::Shape;
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape as _, Size};
use serde::{Serialize, Serializer};

/// Flattening tolerance used when converting contours to paths.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Inflation applied to blur + spread. Rendering surfaces clip blurred
/// shadows harder than native layer shadows; this value was tuned by eye.
const SPREAD_INFLATION: f64 = 4.0;

/// Returns the distance a shadow ring extends past its shape on each axis.
pub fn spread_inset(props: &ShadowProperties) -> Size {
    Size::new(
        (props.spread + props.blur).abs() * SPREAD_INFLATION,
        (props.spread + props.blur + props.offset_y.abs()).abs() * SPREAD_INFLATION,
    )
}

/// A rect at the local origin, rounded when `corner_radius > 0`.
pub fn shape_path(size: Size, corner_radius: f64) -> BezPath {
    Contour::new(Rect::from_origin_size(Point::ZERO, size), corner_radius).to_path()
}

/// One closed contour: a rect, optionally with rounded corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contour {
    pub rect: Rect,
    pub corner_radius: f64,
}

impl Contour {
    pub fn new(rect: Rect, corner_radius: f64) -> Self {
        Self {
            rect,
            corner_radius: corner_radius.max(0.0),
        }
    }

    pub fn is_rounded(&self) -> bool {
        self.corner_radius > 0.0
    }

    fn rounded(&self) -> RoundedRect {
        RoundedRect::from_rect(self.rect, self.corner_radius)
    }

    pub fn to_path(&self) -> BezPath {
        if self.is_rounded() {
            self.rounded().to_path(PATH_TOLERANCE)
        } else {
            self.rect.to_path(PATH_TOLERANCE)
        }
    }

    pub fn area(&self) -> f64 {
        if self.is_rounded() {
            self.rounded().area().abs()
        } else {
            self.rect.area().abs()
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        if self.is_rounded() {
            self.rounded().contains(point)
        } else {
            self.rect.contains(point)
        }
    }
}

/// Fill rule used by mask paths.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    EvenOdd,
}

/// Two nested contours combined with the even-odd rule.
///
/// Mask paths are never edited in place; each phase builds a fresh one and
/// the sequencer keeps the previous one to animate from.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskPath {
    outer: Contour,
    inner: Contour,
}

impl MaskPath {
    pub fn new(outer: Contour, inner: Contour) -> Self {
        Self { outer, inner }
    }

    pub fn outer(&self) -> &Contour {
        &self.outer
    }

    pub fn inner(&self) -> &Contour {
        &self.inner
    }

    pub fn fill_rule(&self) -> FillRule {
        FillRule::EvenOdd
    }

    /// The outer contour followed by the inner one.
    pub fn to_path(&self) -> BezPath {
        let mut path = self.outer.to_path();
        path.extend(self.inner.to_path());
        path
    }

    pub fn to_svg(&self) -> String {
        self.to_path().to_svg()
    }

    pub fn outer_area(&self) -> f64 {
        self.outer.area()
    }

    pub fn inner_area(&self) -> f64 {
        self.inner.area()
    }

    /// Filled area under the even-odd rule. Exact when one contour lies
    /// inside the other.
    pub fn ring_area(&self) -> f64 {
        (self.outer_area() - self.inner_area()).abs()
    }

    /// Even-odd hit test: filled when exactly one contour contains `point`.
    pub fn contains(&self, point: Point) -> bool {
        self.outer.contains(point) != self.inner.contains(point)
    }
}

impl Serialize for MaskPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("MaskPath", 2)?;
        state.serialize_field("path", &self.to_svg())?;
        state.serialize_field("fill_rule", &self.fill_rule())?;
        state.end()
    }
}

/// Builds a shadow mask ring.
///
/// The outer contour is `outer_rect`. The inner contour sits at
/// `(-inset.width, -inset.height)` and measures `inner_size + 2 * inset`.
/// A radius of zero gives sharp corners; callers pass zero for the inner
/// radius when the source shape was not rounded.
pub fn build_ring(
    outer_rect: Rect,
    outer_corner_radius: f64,
    inner_size: Size,
    inner_corner_radius: f64,
    inset: Size,
) -> MaskPath {
    let inner_rect = Rect::new(
        -inset.width,
        -inset.height,
        inner_size.width + inset.width,
        inner_size.height + inset.height,
    );
    MaskPath::new(
        Contour::new(outer_rect, outer_corner_radius),
        Contour::new(inner_rect, inner_corner_radius),
    )
}

/// The mask a shadow layer carries before any transition: the shape's own
/// silhouette cut out of its bounds outset by the spread inset.
pub fn initial_mask(shape: &Shape, props: &ShadowProperties) -> MaskPath {
    build_ring(
        shape.bounds(),
        shape.corner_radius,
        shape.size,
        0.0,
        spread_inset(props),
    )
}
