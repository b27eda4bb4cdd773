//! # Transition Sequencer
//!
//! Drives the reveal through its phases:
//!
//! ```text
//! Idle -> ShrinkToSmallest -> GrowToBoundingBox -> MorphCornerRadius -> Finished
//!                 \                  \                   \
//!                  +------------------+-------------------+--> Cancelled
//! ```
//!
//! ## Responsibilities
//! - **Planning**: Validates the shape pair and derives dimensions, phase
//!   durations and shadow metrics once, up front.
//! - **Phase Entry**: [`enter_phase`] is a pure function from the previous
//!   geometry to the batch that starts a phase and the geometry it commits.
//! - **Driving**: [`TransitionSequencer`] advances only on explicit
//!   phase-complete events and checks its cancellation token at every
//!   boundary.

use crate::config::{CancelPolicy, TransitionConfig};
use crate::errors::{Result, RevealError};
use crate::geometry::{build_ring, initial_mask, shape_path, spread_inset, MaskPath};
use crate::instruction::{Batch, Instruction, Layer, PropertyKey, PropertyValue, SurfaceCommand};
use crate::shadows::{lookup_all, ShadowKind, ShadowProperties, ShadowSet};
use crate::timing::{Dimensions, PhaseDurations};
use crate::types::{Color, Shape};
use kurbo::{BezPath, ParamCurve, Point, QuadBez, Rect, Size, Vec2};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ShrinkToSmallest,
    GrowToBoundingBox,
    MorphCornerRadius,
    Finished,
    Cancelled,
}

impl Phase {
    /// The phase that follows on normal completion. Terminal phases map to
    /// themselves.
    pub fn next(self) -> Phase {
        match self {
            Phase::Idle => Phase::ShrinkToSmallest,
            Phase::ShrinkToSmallest => Phase::GrowToBoundingBox,
            Phase::GrowToBoundingBox => Phase::MorphCornerRadius,
            Phase::MorphCornerRadius => Phase::Finished,
            Phase::Finished => Phase::Finished,
            Phase::Cancelled => Phase::Cancelled,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Cancelled)
    }

    /// True for the three phases that animate the surface's own geometry.
    pub fn is_morph_phase(self) -> bool {
        matches!(
            self,
            Phase::ShrinkToSmallest | Phase::GrowToBoundingBox | Phase::MorphCornerRadius
        )
    }
}

/// Everything derived from the shape pair before the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionPlan {
    pub start: Shape,
    pub end: Shape,
    pub dimensions: Dimensions,
    pub durations: PhaseDurations,
    pub start_shadows: ShadowSet<ShadowProperties>,
    pub end_shadows: ShadowSet<ShadowProperties>,
    pub config: TransitionConfig,
}

impl TransitionPlan {
    pub fn new(start: Shape, end: Shape, config: TransitionConfig) -> Result<Self> {
        let start_shadows = lookup_all(start.elevation)?;
        let end_shadows = lookup_all(end.elevation)?;
        let dimensions = Dimensions::from_size(end.size)?;
        let durations = PhaseDurations::new(config.total_duration, &dimensions)?;
        Ok(Self {
            start,
            end,
            dimensions,
            durations,
            start_shadows,
            end_shadows,
            config,
        })
    }

    pub fn total_duration(&self) -> f64 {
        self.config.total_duration
    }

    /// Control point of the position arc: across at the start's height,
    /// then down/up to the end.
    pub fn motion_path(&self) -> QuadBez {
        let from = self.start.center();
        let to = self.end.center();
        QuadBez::new(from, Point::new(to.x, from.y), to)
    }

    /// Eased progress of the whole-duration animations at `time`.
    pub fn progress_at(&self, time: f64) -> f64 {
        let total = self.total_duration();
        if total <= 0.0 {
            return 1.0;
        }
        self.config.timing.eval(time / total)
    }

    fn instruction(
        &self,
        layer: Layer,
        key: PropertyKey,
        from: PropertyValue,
        to: PropertyValue,
        duration: f64,
    ) -> Instruction {
        Instruction::new(layer, key, from, to, duration, self.config.timing)
    }
}

/// What one shadow layer has committed so far.
///
/// `None` means the layer has nothing to animate from, and path morphs for
/// it are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowLayerState {
    pub shadow_path: Option<BezPath>,
    pub mask: Option<MaskPath>,
}

/// Model values of the animating surface after the last committed batch.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometrySnapshot {
    pub bounds: Size,
    pub corner_radius: f64,
    pub position: Point,
    pub background_color: Option<Color>,
    pub shadows: ShadowSet<ShadowLayerState>,
    /// Time, from the start of the transition, at which the committed
    /// bounds and corner radius are reached.
    pub settles_at: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransitionState {
    pub phase: Phase,
    pub geometry: GeometrySnapshot,
}

impl TransitionState {
    /// The surface as inserted over the start shape.
    pub fn initial(plan: &TransitionPlan) -> Self {
        let start = &plan.start;
        let shadows = if plan.config.install_shadow_layers {
            plan.start_shadows.map(|_, props| ShadowLayerState {
                shadow_path: Some(shape_path(start.size, start.corner_radius)),
                mask: Some(initial_mask(start, props)),
            })
        } else {
            ShadowSet::default()
        };
        Self {
            phase: Phase::Idle,
            geometry: GeometrySnapshot {
                bounds: start.size,
                corner_radius: start.corner_radius,
                position: start.center(),
                background_color: start.background_color,
                shadows,
                settles_at: 0.0,
            },
        }
    }
}

/// The batch that enters a phase, and the state it leaves behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub batch: Batch,
    pub next: TransitionState,
}

/// Target geometry of one phase, shared by every shadow kind.
struct PhaseTargets {
    bounds: Option<(Size, Size)>,
    corner_radius: Option<(f64, f64)>,
    shadow_path: BezPath,
}

/// Builds the batch that enters `phase` from `previous`.
///
/// Pure: the same plan and geometry always yield the same batch.
pub fn enter_phase(plan: &TransitionPlan, phase: Phase, previous: &GeometrySnapshot) -> Step {
    let duration = plan.durations.for_phase(phase);
    let batch = Batch::new(phase, duration);
    let next = TransitionState {
        phase,
        geometry: previous.clone(),
    };
    let mut step = Step { batch, next };

    match phase {
        Phase::Idle => enter_idle(plan, &mut step),
        Phase::ShrinkToSmallest | Phase::GrowToBoundingBox | Phase::MorphCornerRadius => {
            enter_morph_phase(plan, phase, &mut step)
        }
        Phase::Finished => step.batch.commands.push(SurfaceCommand::ReleaseSurface),
        Phase::Cancelled => enter_cancelled(plan, &mut step),
    }
    step
}

/// Enters the phase that follows `state.phase` on normal completion.
pub fn step(plan: &TransitionPlan, state: &TransitionState) -> Step {
    enter_phase(plan, state.phase.next(), &state.geometry)
}

fn enter_idle(plan: &TransitionPlan, step: &mut Step) {
    let (start, end) = (&plan.start, &plan.end);
    let total = plan.total_duration();
    let batch = &mut step.batch;
    let geometry = &mut step.next.geometry;
    batch.duration = total;

    batch.commands.push(SurfaceCommand::InsertSurface {
        frame: start.frame(),
        corner_radius: start.corner_radius,
        background_color: start.background_color,
        elevation: start.elevation,
    });
    batch.commands.push(SurfaceCommand::RemoveStartShape);

    match (start.background_color, end.background_color) {
        (Some(from), Some(to)) => {
            batch.push(plan.instruction(
                Layer::Surface,
                PropertyKey::BackgroundColor,
                PropertyValue::Color(from),
                PropertyValue::Color(to),
                total,
            ));
            geometry.background_color = Some(to);
        }
        _ => debug!("Background color missing on one side, skipping color interpolation"),
    }

    if plan.config.install_shadow_layers {
        for kind in ShadowKind::ALL {
            let from = plan.start_shadows.get(kind);
            let to = plan.end_shadows.get(kind);
            batch.push(plan.instruction(
                Layer::Shadow(kind),
                PropertyKey::ShadowRadius,
                PropertyValue::Scalar(from.blur),
                PropertyValue::Scalar(to.blur),
                total,
            ));
            batch.push(plan.instruction(
                Layer::Shadow(kind),
                PropertyKey::ShadowOffset,
                PropertyValue::Offset(Vec2::new(0.0, from.offset_y)),
                PropertyValue::Offset(Vec2::new(0.0, to.offset_y)),
                total,
            ));
        }
    }

    let motion = plan.motion_path();
    batch.push(plan.instruction(
        Layer::Surface,
        PropertyKey::Position,
        PropertyValue::Point(motion.p0),
        PropertyValue::Motion(motion),
        total,
    ));
    geometry.position = motion.p2;
}

fn phase_targets(plan: &TransitionPlan, phase: Phase, previous: &GeometrySnapshot) -> PhaseTargets {
    let dims = &plan.dimensions;
    let (start, end) = (&plan.start, &plan.end);
    // Shadow layers copy the start shape's rounding.
    let rounded = |radius: f64| if start.is_rounded() { radius } else { 0.0 };
    let small = dims.smallest_size();
    let circle = dims.smallest_corner_radius;

    match phase {
        Phase::ShrinkToSmallest => PhaseTargets {
            bounds: Some((previous.bounds, small)),
            corner_radius: Some((previous.corner_radius, circle)),
            shadow_path: shape_path(small, rounded(circle)),
        },
        Phase::GrowToBoundingBox => PhaseTargets {
            bounds: Some((previous.bounds, end.size)),
            corner_radius: None,
            shadow_path: shape_path(end.size, rounded(circle)),
        },
        _ => PhaseTargets {
            bounds: None,
            corner_radius: Some((previous.corner_radius, end.corner_radius)),
            shadow_path: shape_path(end.size, rounded(end.corner_radius)),
        },
    }
}

/// The mask ring a shadow layer animates to while entering `phase`.
pub fn phase_mask(plan: &TransitionPlan, phase: Phase, kind: ShadowKind) -> Option<MaskPath> {
    let dims = &plan.dimensions;
    let (start, end) = (&plan.start, &plan.end);
    let inset = spread_inset(plan.end_shadows.get(kind));
    let circle = if start.is_rounded() {
        dims.smallest_corner_radius
    } else {
        0.0
    };

    match phase {
        Phase::ShrinkToSmallest => {
            let difference = dims.smallest - start.size.width;
            let inflated = Size::new(start.size.width + difference, start.size.height + difference);
            Some(build_ring(
                Rect::from_origin_size(Point::ZERO, inflated),
                circle,
                inflated,
                circle,
                inset,
            ))
        }
        Phase::GrowToBoundingBox => Some(build_ring(end.bounds(), circle, end.size, circle, inset)),
        Phase::MorphCornerRadius | Phase::Cancelled => {
            let outer = if start.is_rounded() {
                end.corner_radius
            } else {
                0.0
            };
            let inner = if end.is_rounded() {
                end.corner_radius
            } else {
                0.0
            };
            Some(build_ring(end.bounds(), outer, end.size, inner, inset))
        }
        Phase::Idle | Phase::Finished => None,
    }
}

fn enter_morph_phase(plan: &TransitionPlan, phase: Phase, step: &mut Step) {
    let targets = phase_targets(plan, phase, &step.next.geometry);
    let duration = step.batch.duration;
    let batch = &mut step.batch;
    let geometry = &mut step.next.geometry;
    geometry.settles_at += duration;

    if let Some((from, to)) = targets.bounds {
        batch.push(plan.instruction(
            Layer::Surface,
            PropertyKey::BoundsSize,
            PropertyValue::Size(from),
            PropertyValue::Size(to),
            duration,
        ));
        geometry.bounds = to;
    }
    if let Some((from, to)) = targets.corner_radius {
        batch.push(plan.instruction(
            Layer::Surface,
            PropertyKey::CornerRadius,
            PropertyValue::Scalar(from),
            PropertyValue::Scalar(to),
            duration,
        ));
        geometry.corner_radius = to;
    }

    for kind in ShadowKind::ALL {
        let mask = phase_mask(plan, phase, kind);
        morph_shadow_layer(
            plan,
            kind,
            geometry.shadows.get_mut(kind),
            &targets.shadow_path,
            mask,
            duration,
            batch,
        );
    }
}

/// Emits the shadow path and mask morphs for one layer, threading the
/// previously committed paths into the new state.
fn morph_shadow_layer(
    plan: &TransitionPlan,
    kind: ShadowKind,
    layer: &mut ShadowLayerState,
    shadow_path: &BezPath,
    mask: Option<MaskPath>,
    duration: f64,
    batch: &mut Batch,
) {
    match layer.shadow_path.take() {
        Some(previous) => {
            batch.push(plan.instruction(
                Layer::Shadow(kind),
                PropertyKey::ShadowPath,
                PropertyValue::Path(previous),
                PropertyValue::Path(shadow_path.clone()),
                duration,
            ));
            layer.shadow_path = Some(shadow_path.clone());
        }
        None => debug!(?kind, "No committed shadow path, skipping path morph"),
    }

    match (layer.mask.take(), mask) {
        (Some(previous), Some(next)) => {
            batch.push(plan.instruction(
                Layer::Mask(kind),
                PropertyKey::MaskPath,
                PropertyValue::Mask(previous),
                PropertyValue::Mask(next.clone()),
                duration,
            ));
            layer.mask = Some(next);
        }
        (previous, _) => {
            debug!(?kind, "No committed mask, skipping mask morph");
            layer.mask = previous;
        }
    }
}

fn enter_cancelled(plan: &TransitionPlan, step: &mut Step) {
    step.batch.duration = 0.0;
    if plan.config.cancel_policy == CancelPolicy::HoldCurrent {
        hold_in_flight(plan, step);
        return;
    }

    let end = &plan.end;
    let previous = step.next.geometry.clone();
    let batch = &mut step.batch;
    let geometry = &mut step.next.geometry;

    batch.push(plan.instruction(
        Layer::Surface,
        PropertyKey::BoundsSize,
        PropertyValue::Size(previous.bounds),
        PropertyValue::Size(end.size),
        0.0,
    ));
    batch.push(plan.instruction(
        Layer::Surface,
        PropertyKey::CornerRadius,
        PropertyValue::Scalar(previous.corner_radius),
        PropertyValue::Scalar(end.corner_radius),
        0.0,
    ));
    batch.push(plan.instruction(
        Layer::Surface,
        PropertyKey::Position,
        PropertyValue::Point(previous.position),
        PropertyValue::Point(end.center()),
        0.0,
    ));
    if let (Some(from), Some(to)) = (previous.background_color, end.background_color) {
        batch.push(plan.instruction(
            Layer::Surface,
            PropertyKey::BackgroundColor,
            PropertyValue::Color(from),
            PropertyValue::Color(to),
            0.0,
        ));
        geometry.background_color = Some(to);
    }
    geometry.bounds = end.size;
    geometry.corner_radius = end.corner_radius;
    geometry.position = end.center();

    let radius = if plan.start.is_rounded() {
        end.corner_radius
    } else {
        0.0
    };
    let shadow_path = shape_path(end.size, radius);
    for kind in ShadowKind::ALL {
        let mask = phase_mask(plan, Phase::Cancelled, kind);
        morph_shadow_layer(
            plan,
            kind,
            geometry.shadows.get_mut(kind),
            &shadow_path,
            mask,
            0.0,
            batch,
        );
    }

    batch.commands.push(SurfaceCommand::ReleaseSurface);
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Freezes the whole-duration animations (position, color, shadow metrics)
/// at the values they have reached when the transition is cancelled.
fn hold_in_flight(plan: &TransitionPlan, step: &mut Step) {
    let at = step.next.geometry.settles_at;
    let progress = plan.progress_at(at);
    let batch = &mut step.batch;
    let geometry = &mut step.next.geometry;
    debug!(at, progress, "Holding in-flight animations");

    if let (Some(from), Some(to)) = (plan.start.background_color, plan.end.background_color) {
        let held = from.lerp(&to, progress as f32);
        batch.push(plan.instruction(
            Layer::Surface,
            PropertyKey::BackgroundColor,
            PropertyValue::Color(held),
            PropertyValue::Color(held),
            0.0,
        ));
        geometry.background_color = Some(held);
    }

    if plan.config.install_shadow_layers {
        for kind in ShadowKind::ALL {
            let from = plan.start_shadows.get(kind);
            let to = plan.end_shadows.get(kind);
            let blur = lerp(from.blur, to.blur, progress);
            let offset = Vec2::new(0.0, lerp(from.offset_y, to.offset_y, progress));
            batch.push(plan.instruction(
                Layer::Shadow(kind),
                PropertyKey::ShadowRadius,
                PropertyValue::Scalar(blur),
                PropertyValue::Scalar(blur),
                0.0,
            ));
            batch.push(plan.instruction(
                Layer::Shadow(kind),
                PropertyKey::ShadowOffset,
                PropertyValue::Offset(offset),
                PropertyValue::Offset(offset),
                0.0,
            ));
        }
    }

    let held = plan.motion_path().eval(progress);
    batch.push(plan.instruction(
        Layer::Surface,
        PropertyKey::Position,
        PropertyValue::Point(held),
        PropertyValue::Point(held),
        0.0,
    ));
    geometry.position = held;
}

/// Shared flag a host flips to stop a transition at the next phase boundary.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of reporting a completed phase.
#[derive(Clone, Debug, PartialEq)]
pub enum Advance {
    /// The next morph phase has started.
    Next(Batch),
    /// All phases are done; the batch releases the surface.
    Finished(Batch),
    /// The token was cancelled; the batch applies the cancel policy.
    Cancelled(Batch),
}

impl Advance {
    pub fn batch(&self) -> &Batch {
        match self {
            Advance::Next(batch) | Advance::Finished(batch) | Advance::Cancelled(batch) => batch,
        }
    }

    pub fn into_batch(self) -> Batch {
        match self {
            Advance::Next(batch) | Advance::Finished(batch) | Advance::Cancelled(batch) => batch,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Advance::Next(_))
    }
}

/// Runs one reveal from a start shape to an end shape.
///
/// The host commits each returned batch and calls
/// [`TransitionSequencer::phase_complete`] once the batch has finished.
#[derive(Debug)]
pub struct TransitionSequencer {
    plan: TransitionPlan,
    state: TransitionState,
    token: CancellationToken,
}

impl TransitionSequencer {
    pub fn new(start: Shape, end: Shape, config: TransitionConfig) -> Result<Self> {
        let plan = TransitionPlan::new(start, end, config)?;
        let state = TransitionState::initial(&plan);
        Ok(Self {
            plan,
            state,
            token: CancellationToken::new(),
        })
    }

    pub fn plan(&self) -> &TransitionPlan {
        &self.plan
    }

    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// A handle that cancels this transition at its next phase boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Starts the transition.
    ///
    /// Returns the batch spanning the whole duration (color, shadow metrics,
    /// position) followed by the batch entering `ShrinkToSmallest`. If the
    /// token is already cancelled the second batch applies the cancel policy
    /// instead and the sequencer ends in `Cancelled`.
    #[instrument(level = "debug", skip(self), fields(total = self.plan.total_duration()))]
    pub fn animate(&mut self) -> Result<Vec<Batch>> {
        if self.state.phase != Phase::Idle {
            return Err(RevealError::UnexpectedEvent {
                phase: self.state.phase,
                event: "animate",
            });
        }
        debug!(durations = ?self.plan.durations, "Planned reveal");

        let idle = enter_phase(&self.plan, Phase::Idle, &self.state.geometry);
        if self.token.is_cancelled() {
            let cancelled = enter_phase(&self.plan, Phase::Cancelled, &idle.next.geometry);
            self.state = cancelled.next;
            info!(policy = ?self.plan.config.cancel_policy, "Reveal cancelled before it started");
            return Ok(vec![idle.batch, cancelled.batch]);
        }
        let shrink = enter_phase(&self.plan, Phase::ShrinkToSmallest, &idle.next.geometry);
        self.state = shrink.next;
        debug!(phase = ?self.state.phase, duration = shrink.batch.duration, "Entered phase");
        Ok(vec![idle.batch, shrink.batch])
    }

    /// Reports that the current phase batch has finished playing.
    pub fn phase_complete(&mut self) -> Result<Advance> {
        let phase = self.state.phase;
        if !phase.is_morph_phase() {
            return Err(RevealError::UnexpectedEvent {
                phase,
                event: "phase_complete",
            });
        }

        let next = phase.next();
        if next == Phase::Finished {
            let step = enter_phase(&self.plan, Phase::Finished, &self.state.geometry);
            self.state = step.next;
            info!("Reveal finished");
            return Ok(Advance::Finished(step.batch));
        }

        if self.token.is_cancelled() {
            let step = enter_phase(&self.plan, Phase::Cancelled, &self.state.geometry);
            self.state = step.next;
            info!(after = ?phase, policy = ?self.plan.config.cancel_policy, "Reveal cancelled");
            return Ok(Advance::Cancelled(step.batch));
        }

        let step = enter_phase(&self.plan, next, &self.state.geometry);
        self.state = step.next;
        debug!(phase = ?next, duration = step.batch.duration, "Entered phase");
        Ok(Advance::Next(step.batch))
    }
}
