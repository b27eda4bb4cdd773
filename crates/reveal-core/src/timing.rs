//! # Phase Timing
//!
//! Splits the total duration across the three phases in proportion to the
//! distance each phase covers along the end shape's diagonal.

use crate::errors::{Result, RevealError};
use crate::sequencer::Phase;
use kurbo::Size;
use serde::Serialize;

/// Size ratios of the end shape, computed once per transition.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Dimensions {
    pub smallest: f64,
    pub largest: f64,
    /// Length of the diagonal: the diameter of the smallest circle that
    /// covers the whole end shape.
    pub diameter: f64,
    pub smallest_corner_radius: f64,
}

impl Dimensions {
    pub fn from_size(end: Size) -> Result<Self> {
        let degenerate = RevealError::DegenerateEndShape {
            width: end.width,
            height: end.height,
        };
        if !(end.width >= 0.0 && end.height >= 0.0) {
            return Err(degenerate);
        }
        let smallest = end.width.min(end.height);
        let largest = end.width.max(end.height);
        let diameter = (end.width * end.width + end.height * end.height).sqrt();
        if !(diameter > 0.0) || !diameter.is_finite() {
            return Err(degenerate);
        }
        Ok(Self {
            smallest,
            largest,
            diameter,
            smallest_corner_radius: smallest / 2.0,
        })
    }

    /// Square side of the intermediate circle.
    pub fn smallest_size(&self) -> Size {
        Size::new(self.smallest, self.smallest)
    }
}

/// Time spent in each phase, in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PhaseDurations {
    pub first: f64,
    pub second: f64,
    pub third: f64,
}

impl PhaseDurations {
    pub fn new(total: f64, dims: &Dimensions) -> Result<Self> {
        if !total.is_finite() || total < 0.0 {
            return Err(RevealError::InvalidDuration(total));
        }
        Ok(Self {
            first: total * (dims.smallest / dims.diameter),
            second: total * ((dims.largest - dims.smallest) / dims.diameter),
            third: total * ((dims.diameter - dims.largest) / dims.diameter),
        })
    }

    pub fn total(&self) -> f64 {
        self.first + self.second + self.third
    }

    /// Duration of a sized phase; zero for `Idle` and the terminal phases.
    pub fn for_phase(&self, phase: Phase) -> f64 {
        match phase {
            Phase::ShrinkToSmallest => self.first,
            Phase::GrowToBoundingBox => self.second,
            Phase::MorphCornerRadius => self.third,
            Phase::Idle | Phase::Finished | Phase::Cancelled => 0.0,
        }
    }
}
