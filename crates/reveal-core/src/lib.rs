//! # Reveal Core
//!
//! `reveal-core` plans and sequences a masked reveal transition: a small
//! elevated shape (typically a floating action button) morphs into a larger
//! one (typically a dialog) while its Material shadow follows along.
//!
//! The crate never draws anything. It emits batches of property animations
//! that a host animation system plays, and it advances only when the host
//! reports that a batch has finished.
//!
//! ## Core Features
//!
//! *   **Three-Phase Morph**: Shrink to a circle, grow to the bounding box, then
//!     morph the corner radius, each phase timed by the distance it covers.
//! *   **Material Shadows**: Umbra, penumbra and ambient metrics for elevations
//!     0 to 24, with even-odd mask rings that keep the shadow outside the shape.
//! *   **Cancellation**: A shared token checked at every phase boundary.
//! *   **Playback**: Replays a finished run at any time for inspection.
//!
//! ## Usage
//!
//! ```rust
//! use kurbo::Size;
//! use reveal_core::{Batch, Scheduler, Shape, TransitionConfig, TransitionSequencer};
//!
//! let container = Size::new(250.0, 541.0);
//! let mut sequencer = TransitionSequencer::new(
//!     Shape::fab(container),
//!     Shape::dialog(container),
//!     TransitionConfig::default(),
//! )?;
//!
//! let timeline = Scheduler::run(&mut sequencer, &mut |_: f64, _: &Batch| {})?;
//! assert_eq!(timeline.phase_batches().count(), 3);
//! # Ok::<(), reveal_core::RevealError>(())
//! ```

/// Error types returned by the transition core.
pub mod errors;

/// Shared data structures (colors, shapes).
pub mod types;

/// Easing curves and keyframe-backed tracks.
pub mod animation;

/// Material shadow metrics per elevation.
pub mod shadows;

/// Shadow paths and mask rings.
pub mod geometry;

/// Splitting the total duration across phases.
pub mod timing;

/// The instructions and batches handed to a host.
pub mod instruction;

pub mod config;

/// The phase state machine.
pub mod sequencer;

/// The host seam and the in-process driver.
pub mod scheduler;

/// Sampling a recorded timeline.
pub mod playback;

pub use config::{CancelPolicy, TransitionConfig};
pub use errors::{Result, RevealError};
pub use instruction::{Batch, Instruction, Layer, PropertyKey, PropertyValue, SurfaceCommand};
pub use playback::{Frame, Playback};
pub use scheduler::{AnimationHost, Scheduler, Timeline};
pub use sequencer::{Advance, CancellationToken, Phase, TransitionSequencer};
pub use shadows::{ShadowKind, ShadowProperties};
pub use types::{Color, Shape};
