use crate::sequencer::Phase;
use thiserror::Error;

/// Contract violations raised by the transition core.
///
/// Optional steps that cannot run (a shape without a background color, a
/// shadow layer without a committed path) are skipped, not reported here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevealError {
    #[error("Elevation {0} is outside 0..=24")]
    ElevationOutOfRange(u8),
    #[error("End shape {width}x{height} has a zero diagonal")]
    DegenerateEndShape { width: f64, height: f64 },
    #[error("Invalid total duration: {0}")]
    InvalidDuration(f64),
    #[error("Cannot handle `{event}` while in phase {phase:?}")]
    UnexpectedEvent { phase: Phase, event: &'static str },
}

pub type Result<T> = std::result::Result<T, RevealError>;
