//! # Playback
//!
//! Replays a [`Timeline`] the way a host would render it, so the surface's
//! geometry can be inspected at any time without a rendering backend.
//! Animations hold their final values; a later instruction on the same
//! property replaces the one still in flight.

use crate::animation::{EasingType, Track};
use crate::instruction::{Instruction, Layer, PropertyKey, PropertyValue, SurfaceCommand};
use crate::scheduler::Timeline;
use crate::shadows::{ShadowKind, ShadowSet};
use crate::types::Color;
use keyframe::CanTween;
use kurbo::{ParamCurve, Point, QuadBez, Size};
use serde::Serialize;
use tracing::debug;

/// Two components interpolated together.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Pair(f64, f64);

impl CanTween for Pair {
    fn ease(from: Self, to: Self, time: impl keyframe::num_traits::Float) -> Self {
        let t = time.to_f64().unwrap_or(0.0);
        Pair(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
    }
}

impl From<Size> for Pair {
    fn from(size: Size) -> Self {
        Pair(size.width, size.height)
    }
}

impl From<Pair> for Size {
    fn from(pair: Pair) -> Self {
        Size::new(pair.0, pair.1)
    }
}

/// Shadow parameters of one layer at a sampled time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct ShadowFrame {
    pub kind: ShadowKind,
    pub radius: f64,
    pub offset_y: f64,
}

/// The animating surface at one instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub time: f64,
    pub bounds: Size,
    pub corner_radius: f64,
    pub position: Point,
    pub background_color: Option<Color>,
    pub shadows: Vec<ShadowFrame>,
}

#[derive(Clone, Debug)]
struct MotionSegment {
    start: f64,
    duration: f64,
    curve: QuadBez,
    easing: EasingType,
}

impl MotionSegment {
    fn eval(&self, time: f64) -> Point {
        let progress = if self.duration <= 0.0 {
            1.0
        } else {
            self.easing.eval((time - self.start) / self.duration)
        };
        self.curve.eval(progress)
    }
}

/// Sampled state of every surface property a timeline animates.
#[derive(Debug)]
pub struct Playback {
    end_time: f64,
    bounds: Track<Pair>,
    corner_radius: Track<f64>,
    initial_color: Option<Color>,
    background_color: Option<Track<Color>>,
    initial_position: Point,
    motion: Vec<MotionSegment>,
    shadow_radius: ShadowSet<Option<Track<f64>>>,
    shadow_offset: ShadowSet<Option<Track<f64>>>,
}

impl Playback {
    pub fn new(timeline: &Timeline) -> Self {
        let mut playback = Self {
            end_time: timeline.end_time(),
            bounds: Track::new(Pair::default()),
            corner_radius: Track::new(0.0),
            initial_color: None,
            background_color: None,
            initial_position: Point::ZERO,
            motion: Vec::new(),
            shadow_radius: ShadowSet::default(),
            shadow_offset: ShadowSet::default(),
        };

        for scheduled in &timeline.batches {
            for command in &scheduled.batch.commands {
                if let SurfaceCommand::InsertSurface {
                    frame,
                    corner_radius,
                    background_color,
                    ..
                } = command
                {
                    playback.bounds = Track::new(frame.size().into());
                    playback.corner_radius = Track::new(*corner_radius);
                    playback.initial_color = *background_color;
                    playback.initial_position = frame.center();
                }
            }
            for instruction in &scheduled.batch.instructions {
                playback.apply(scheduled.start_time, instruction);
            }
        }
        playback
    }

    fn apply(&mut self, start: f64, instruction: &Instruction) {
        let Instruction {
            layer,
            key,
            from,
            to,
            duration,
            timing,
            ..
        } = instruction;
        let (duration, timing) = (*duration, *timing);

        match (key, from, to) {
            (PropertyKey::BoundsSize, PropertyValue::Size(a), PropertyValue::Size(b)) => {
                self.bounds
                    .add_segment(start, (*a).into(), (*b).into(), duration, timing)
            }
            (PropertyKey::CornerRadius, PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => {
                self.corner_radius.add_segment(start, *a, *b, duration, timing)
            }
            (PropertyKey::BackgroundColor, PropertyValue::Color(a), PropertyValue::Color(b)) => self
                .background_color
                .get_or_insert_with(|| Track::new(*a))
                .add_segment(start, *a, *b, duration, timing),
            (PropertyKey::Position, PropertyValue::Point(a), PropertyValue::Motion(curve)) => {
                self.push_motion(start, duration, QuadBez::new(*a, curve.p1, curve.p2), timing)
            }
            (PropertyKey::Position, PropertyValue::Point(a), PropertyValue::Point(b)) => {
                self.push_motion(start, duration, QuadBez::new(*a, a.midpoint(*b), *b), timing)
            }
            (PropertyKey::ShadowRadius, PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => {
                if let Layer::Shadow(kind) = layer {
                    self.shadow_radius
                        .get_mut(*kind)
                        .get_or_insert_with(|| Track::new(*a))
                        .add_segment(start, *a, *b, duration, timing);
                }
            }
            (PropertyKey::ShadowOffset, PropertyValue::Offset(a), PropertyValue::Offset(b)) => {
                if let Layer::Shadow(kind) = layer {
                    self.shadow_offset
                        .get_mut(*kind)
                        .get_or_insert_with(|| Track::new(a.y))
                        .add_segment(start, a.y, b.y, duration, timing);
                }
            }
            // Paths are handed to the host as-is.
            (PropertyKey::ShadowPath, ..) | (PropertyKey::MaskPath, ..) => {}
            _ => debug!(?key, "Ignoring instruction with mismatched values"),
        }
    }

    fn push_motion(&mut self, start: f64, duration: f64, curve: QuadBez, easing: EasingType) {
        self.motion.push(MotionSegment {
            start,
            duration,
            curve,
            easing,
        });
    }

    /// Time at which every animation has settled.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    fn position_at(&self, time: f64) -> Point {
        self.motion
            .iter()
            .rev()
            .find(|segment| segment.start <= time)
            .map(|segment| segment.eval(time))
            .unwrap_or(self.initial_position)
    }

    pub fn sample(&mut self, time: f64) -> Frame {
        let background_color = match self.background_color.as_mut() {
            Some(track) => Some(track.sample(time)),
            None => self.initial_color,
        };

        let mut shadows = Vec::new();
        for kind in ShadowKind::ALL {
            let radius = self.shadow_radius.get_mut(kind).as_mut().map(|t| t.sample(time));
            let offset = self.shadow_offset.get_mut(kind).as_mut().map(|t| t.sample(time));
            if let (Some(radius), Some(offset_y)) = (radius, offset) {
                shadows.push(ShadowFrame {
                    kind,
                    radius,
                    offset_y,
                });
            }
        }

        Frame {
            time,
            bounds: self.bounds.sample(time).into(),
            corner_radius: self.corner_radius.sample(time),
            position: self.position_at(time),
            background_color,
            shadows,
        }
    }

    /// Samples at `fps` from zero through the end time, inclusive.
    pub fn frames(&mut self, fps: f64) -> Vec<Frame> {
        if !(fps > 0.0) {
            return vec![self.sample(self.end_time)];
        }
        // Phase durations rarely sum to the total exactly.
        let count = (self.end_time * fps - 1e-9).ceil().max(0.0) as usize;
        (0..=count)
            .map(|i| self.sample((i as f64 / fps).min(self.end_time)))
            .collect()
    }
}
