use keyframe::{AnimationSequence, CanTween, EasingFunction, Keyframe};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Segments shorter than this are treated as instantaneous.
const TIME_EPSILON: f64 = 1e-9;

/// Keyframes cannot share a timestamp, so jumps take this long.
const JUMP_DURATION: f64 = 1e-6;

/// Timing curves an instruction can carry. Transitions use `Linear` unless
/// configured otherwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
        }
    }
}

impl EasingType {
    /// Evaluates the easing curve at a specific point `x` (0.0 to 1.0).
    pub fn eval(&self, x: f64) -> f64 {
        self.y(x.clamp(0.0, 1.0))
    }
}

/// A value driven by segments placed at absolute times.
///
/// Gaps between segments hold the previous value, and sampling past the last
/// keyframe holds the final value.
#[derive(Clone)]
pub struct Track<T>
where
    T: Clone + CanTween + Default,
{
    /// Raw storage of keyframes (value, absolute_time, easing).
    raw_keyframes: Vec<(T, f64, EasingType)>,
    sequence: AnimationSequence<T>,
    current_value: T,
}

impl<T> Track<T>
where
    T: Clone + CanTween + Default,
{
    /// Creates a track resting at `initial`.
    pub fn new(initial: T) -> Self {
        let kf = Keyframe::new(initial.clone(), 0.0, EasingType::Linear);
        Self {
            raw_keyframes: vec![(initial.clone(), 0.0, EasingType::Linear)],
            sequence: AnimationSequence::from(vec![kf]),
            current_value: initial,
        }
    }

    /// Time of the last keyframe.
    pub fn end_time(&self) -> f64 {
        self.raw_keyframes.last().map(|k| k.1).unwrap_or(0.0)
    }

    fn last_value(&self) -> T {
        self.raw_keyframes
            .last()
            .map(|k| k.0.clone())
            .unwrap_or_else(|| self.current_value.clone())
    }

    /// Animates from `from` to `to` over `[start, start + duration]`.
    ///
    /// Segments must be added in order of their start times. A segment that
    /// starts before the previous one has finished cuts it short. `from` is
    /// expected to match the value the track holds at `start`.
    pub fn add_segment(&mut self, start: f64, from: T, to: T, duration: f64, easing: EasingType) {
        if self.raw_keyframes.len() == 1 && self.end_time() <= TIME_EPSILON {
            // Nothing animated yet: the track rests at `from` until `start`.
            self.raw_keyframes[0].0 = from.clone();
        }

        if start < self.end_time() - TIME_EPSILON {
            // A later segment replaces whatever was still in flight.
            let held = self.sample(start);
            self.raw_keyframes.retain(|k| k.1 < start - TIME_EPSILON);
            self.raw_keyframes.push((held, start, EasingType::Linear));
        } else if start > self.end_time() + TIME_EPSILON {
            let held = self.last_value();
            self.raw_keyframes.push((held, start, EasingType::Linear));
        }

        if duration > TIME_EPSILON {
            // Keyframe easing governs the motion towards the next keyframe.
            if let Some(last) = self.raw_keyframes.last_mut() {
                last.2 = easing;
            }
            self.raw_keyframes.push((to, start + duration, EasingType::Linear));
        } else if self.raw_keyframes.len() == 1 && start <= TIME_EPSILON {
            self.raw_keyframes[0].0 = to;
        } else {
            // A zero-length segment jumps straight to its target.
            self.raw_keyframes.push((to, start + JUMP_DURATION, EasingType::Linear));
        }

        self.rebuild();
    }

    fn rebuild(&mut self) {
        let frames: Vec<Keyframe<T>> = self
            .raw_keyframes
            .iter()
            .map(|(val, time, ease_type)| Keyframe::new(val.clone(), *time, *ease_type))
            .collect();

        self.sequence = AnimationSequence::from(frames);
        self.current_value = self.sequence.now();
    }

    /// Returns the value at absolute `time`.
    pub fn sample(&mut self, time: f64) -> T {
        self.sequence.advance_to(time);
        self.current_value = self.sequence.now();
        self.current_value.clone()
    }
}

impl<T> fmt::Debug for Track<T>
where
    T: Clone + CanTween + Default + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("keyframes", &self.raw_keyframes.len())
            .field("current_value", &self.current_value)
            .finish()
    }
}
