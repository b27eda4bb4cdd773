//! # Instructions
//!
//! The output vocabulary of the sequencer. A host plays each [`Batch`] as one
//! group: every instruction shares the batch duration and the host reports a
//! single completion when the whole group has finished.

use crate::animation::EasingType;
use crate::geometry::MaskPath;
use crate::sequencer::Phase;
use crate::shadows::ShadowKind;
use crate::types::Color;
use kurbo::{BezPath, Point, QuadBez, Rect, Size, Vec2};
use serde::{Serialize, Serializer};

/// Which layer of the animating surface an instruction targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Surface,
    Shadow(ShadowKind),
    Mask(ShadowKind),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    BoundsSize,
    CornerRadius,
    Position,
    BackgroundColor,
    ShadowRadius,
    ShadowOffset,
    ShadowPath,
    MaskPath,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum PropertyValue {
    Scalar(f64),
    Size(Size),
    Offset(Vec2),
    Point(Point),
    Color(Color),
    #[serde(serialize_with = "serialize_path")]
    Path(BezPath),
    Mask(MaskPath),
    /// A quadratic motion path; the value at progress `t` is `eval(t)`.
    #[serde(serialize_with = "serialize_quad")]
    Motion(QuadBez),
}

fn serialize_path<S: Serializer>(path: &BezPath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_svg())
}

fn serialize_quad<S: Serializer>(quad: &QuadBez, serializer: S) -> Result<S::Ok, S::Error> {
    let mut path = BezPath::new();
    path.move_to(quad.p0);
    path.quad_to(quad.p1, quad.p2);
    serializer.serialize_str(&path.to_svg())
}

impl PropertyValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_size(&self) -> Option<Size> {
        match self {
            PropertyValue::Size(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mask(&self) -> Option<&MaskPath> {
        match self {
            PropertyValue::Mask(v) => Some(v),
            _ => None,
        }
    }
}

/// One property animation: `key` on `layer` goes from `from` to `to`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Instruction {
    pub layer: Layer,
    pub key: PropertyKey,
    pub from: PropertyValue,
    pub to: PropertyValue,
    pub duration: f64,
    pub timing: EasingType,
    /// Keep the final value once finished instead of reverting.
    pub hold_final_value: bool,
}

impl Instruction {
    pub fn new(
        layer: Layer,
        key: PropertyKey,
        from: PropertyValue,
        to: PropertyValue,
        duration: f64,
        timing: EasingType,
    ) -> Self {
        Self {
            layer,
            key,
            from,
            to,
            duration,
            timing,
            hold_final_value: true,
        }
    }
}

/// Structural changes the host performs around the animation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum SurfaceCommand {
    /// Insert the animating surface above the start shape.
    InsertSurface {
        frame: Rect,
        corner_radius: f64,
        background_color: Option<Color>,
        elevation: u8,
    },
    RemoveStartShape,
    ReleaseSurface,
}

/// A group of instructions committed together with one completion signal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Batch {
    pub phase: Phase,
    pub duration: f64,
    pub commands: Vec<SurfaceCommand>,
    pub instructions: Vec<Instruction>,
}

impl Batch {
    pub fn new(phase: Phase, duration: f64) -> Self {
        Self {
            phase,
            duration,
            commands: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn find(&self, layer: Layer, key: PropertyKey) -> Option<&Instruction> {
        self.instructions
            .iter()
            .find(|i| i.layer == layer && i.key == key)
    }

    pub fn with_key(&self, key: PropertyKey) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter().filter(move |i| i.key == key)
    }

    pub fn has_key(&self, key: PropertyKey) -> bool {
        self.with_key(key).next().is_some()
    }
}
