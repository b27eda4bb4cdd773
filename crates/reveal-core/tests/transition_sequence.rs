//! End-to-end sequencing tests
//!
//! Drives the FAB to dialog reveal through the public API and checks the
//! batches a host would receive.

use kurbo::{Point, Size};
use reveal_core::{
    Advance, Batch, CancelPolicy, Color, Layer, Phase, Playback, PropertyKey, PropertyValue,
    RevealError, Scheduler, ShadowKind, Shape, SurfaceCommand, TransitionConfig,
    TransitionSequencer,
};

fn container() -> Size {
    Size::new(250.0, 541.0)
}

fn fab_to_dialog(config: TransitionConfig) -> TransitionSequencer {
    TransitionSequencer::new(Shape::fab(container()), Shape::dialog(container()), config)
        .expect("preset shapes are valid")
}

fn noop_host() -> impl FnMut(f64, &Batch) {
    |_: f64, _: &Batch| {}
}

/// The reveal runs exactly three sized phases, in order.
#[test]
fn fab_to_dialog_runs_three_phases() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();

    let phases: Vec<Phase> = timeline.phase_batches().map(|s| s.batch.phase).collect();
    assert_eq!(
        phases,
        vec![
            Phase::ShrinkToSmallest,
            Phase::GrowToBoundingBox,
            Phase::MorphCornerRadius
        ]
    );
    assert_eq!(timeline.outcome, Phase::Finished);

    let finished = timeline.find_phase(Phase::Finished).unwrap();
    assert_eq!(finished.batch.commands, vec![SurfaceCommand::ReleaseSurface]);
}

/// Shrink targets the circle inscribed in the dialog's short side.
#[test]
fn shrink_targets_smallest_circle() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let batches = sequencer.animate().unwrap();
    let shrink = &batches[1];

    let bounds = shrink.find(Layer::Surface, PropertyKey::BoundsSize).unwrap();
    assert_eq!(bounds.to, PropertyValue::Size(Size::new(150.0, 150.0)));
    let radius = shrink.find(Layer::Surface, PropertyKey::CornerRadius).unwrap();
    assert_eq!(radius.to, PropertyValue::Scalar(75.0));
}

/// Grow leaves the radius alone; morph leaves the bounds alone.
#[test]
fn later_phases_touch_one_property_each() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    sequencer.animate().unwrap();

    let grow = sequencer.phase_complete().unwrap().into_batch();
    assert!(grow.has_key(PropertyKey::BoundsSize));
    assert!(!grow.has_key(PropertyKey::CornerRadius));
    assert_eq!(
        grow.find(Layer::Surface, PropertyKey::BoundsSize).unwrap().to,
        PropertyValue::Size(Size::new(200.0, 150.0))
    );

    let morph = sequencer.phase_complete().unwrap().into_batch();
    assert!(!morph.has_key(PropertyKey::BoundsSize));
    assert_eq!(
        morph.find(Layer::Surface, PropertyKey::CornerRadius).unwrap().to,
        PropertyValue::Scalar(2.0)
    );

    assert!(matches!(sequencer.phase_complete().unwrap(), Advance::Finished(_)));
    assert_eq!(sequencer.phase(), Phase::Finished);
}

/// Every instruction holds its final value and uses the configured timing.
#[test]
fn instructions_hold_final_values() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();
    for scheduled in &timeline.batches {
        for instruction in &scheduled.batch.instructions {
            assert!(instruction.hold_final_value);
            assert_eq!(instruction.timing, reveal_core::animation::EasingType::Linear);
        }
    }
}

/// A shape without a background color skips color interpolation silently.
#[test]
fn missing_color_skips_background_animation() {
    let start = Shape::new(Point::new(10.0, 10.0), Size::new(56.0, 56.0))
        .with_corner_radius(28.0)
        .with_elevation(6);
    let mut sequencer =
        TransitionSequencer::new(start, Shape::dialog(container()), TransitionConfig::default())
            .unwrap();
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();

    assert!(timeline
        .batches
        .iter()
        .all(|s| !s.batch.has_key(PropertyKey::BackgroundColor)));
    assert_eq!(timeline.outcome, Phase::Finished);
}

/// Without shadow layers no shadow or mask instruction is emitted.
#[test]
fn disabled_shadow_layers_emit_surface_only() {
    let config = TransitionConfig {
        install_shadow_layers: false,
        ..TransitionConfig::default()
    };
    let mut sequencer = fab_to_dialog(config);
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();

    for scheduled in &timeline.batches {
        assert!(scheduled
            .batch
            .instructions
            .iter()
            .all(|i| i.layer == Layer::Surface));
    }
    assert_eq!(timeline.phase_batches().count(), 3);
}

/// Cancelling before the second phase snaps to the end geometry.
#[test]
fn cancel_snaps_to_end() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let token = sequencer.cancellation_token();
    sequencer.animate().unwrap();
    token.cancel();

    let advance = sequencer.phase_complete().unwrap();
    let batch = match advance {
        Advance::Cancelled(batch) => batch,
        other => panic!("expected cancellation, got {:?}", other),
    };
    assert_eq!(batch.phase, Phase::Cancelled);
    assert_eq!(batch.duration, 0.0);
    assert_eq!(
        batch.find(Layer::Surface, PropertyKey::BoundsSize).unwrap().to,
        PropertyValue::Size(Size::new(200.0, 150.0))
    );
    assert_eq!(
        batch.find(Layer::Surface, PropertyKey::Position).unwrap().to,
        PropertyValue::Point(Point::new(125.0, 270.5))
    );
    assert_eq!(batch.commands.last(), Some(&SurfaceCommand::ReleaseSurface));

    // No further phases after cancellation.
    assert_eq!(sequencer.phase(), Phase::Cancelled);
    assert!(matches!(
        sequencer.phase_complete(),
        Err(RevealError::UnexpectedEvent {
            phase: Phase::Cancelled,
            ..
        })
    ));
}

/// `HoldCurrent` leaves the surface where it is.
#[test]
fn cancel_can_hold_current_geometry() {
    let config = TransitionConfig {
        cancel_policy: CancelPolicy::HoldCurrent,
        ..TransitionConfig::default()
    };
    let mut sequencer = fab_to_dialog(config);
    sequencer.animate().unwrap();
    sequencer.cancellation_token().cancel();

    let batch = sequencer.phase_complete().unwrap().into_batch();
    assert!(batch.commands.is_empty());
    assert!(!batch.has_key(PropertyKey::BoundsSize));
    assert!(!batch.has_key(PropertyKey::CornerRadius));
    for instruction in &batch.instructions {
        assert_eq!(instruction.duration, 0.0);
        assert_eq!(instruction.from, instruction.to);
    }
    assert_eq!(sequencer.state().geometry.bounds, Size::new(150.0, 150.0));
}

/// A held surface stops moving once cancelled.
#[test]
fn playback_of_held_run_stays_put() {
    let config = TransitionConfig {
        cancel_policy: CancelPolicy::HoldCurrent,
        ..TransitionConfig::default()
    };
    let mut sequencer = fab_to_dialog(config);
    let token = sequencer.cancellation_token();
    let mut host = |_: f64, batch: &Batch| {
        if batch.phase == Phase::ShrinkToSmallest {
            token.cancel();
        }
    };
    let timeline = Scheduler::run(&mut sequencer, &mut host).unwrap();
    assert_eq!(timeline.outcome, Phase::Cancelled);
    let mut playback = Playback::new(&timeline);

    let at_cancel = playback.sample(6.5);
    let later = playback.sample(10.0);
    assert!((at_cancel.position - later.position).hypot() < 1e-9);
    assert!((later.position - Point::new(125.0, 270.5)).hypot() > 1.0);
    assert_eq!(at_cancel.background_color, later.background_color);
    assert!((at_cancel.bounds.width - 150.0).abs() < 1e-6);
    assert!((later.bounds.height - 150.0).abs() < 1e-6);

    let penumbra = |frame: &reveal_core::Frame| {
        frame
            .shadows
            .iter()
            .find(|s| s.kind == ShadowKind::Penumbra)
            .map(|s| s.radius)
    };
    let held = penumbra(&later).unwrap();
    assert!((held - 26.8).abs() < 1e-6);
    assert_eq!(penumbra(&at_cancel), Some(held));
}

/// A token cancelled up front never starts a sized phase.
#[test]
fn cancel_before_animate_ends_immediately() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    sequencer.cancellation_token().cancel();
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();

    assert_eq!(timeline.outcome, Phase::Cancelled);
    assert_eq!(timeline.phase_batches().count(), 0);
    let cancelled = timeline.find_phase(Phase::Cancelled).unwrap();
    assert_eq!(cancelled.start_time, 0.0);
    assert_eq!(
        cancelled.batch.find(Layer::Surface, PropertyKey::BoundsSize).unwrap().to,
        PropertyValue::Size(Size::new(200.0, 150.0))
    );
}

/// Cancellation is not checked once the last phase has completed.
#[test]
fn cancel_after_last_phase_still_finishes() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    sequencer.animate().unwrap();
    sequencer.phase_complete().unwrap();
    sequencer.phase_complete().unwrap();
    sequencer.cancellation_token().cancel();
    assert!(matches!(sequencer.phase_complete().unwrap(), Advance::Finished(_)));
}

/// Playback past the end shows the dialog exactly.
#[test]
fn playback_settles_on_end_shape() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();
    let mut playback = Playback::new(&timeline);

    let dialog = Shape::dialog(container());
    for time in [10.0, 25.0] {
        let frame = playback.sample(time);
        assert_eq!(frame.bounds, dialog.size);
        assert!((frame.corner_radius - dialog.corner_radius).abs() < 1e-9);
        assert!((frame.position - dialog.center()).hypot() < 1e-9);
        assert_eq!(frame.background_color, Some(Color::YELLOW));
    }
}

/// Playback follows the arc: across first, then vertically.
#[test]
fn playback_position_follows_arc() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();
    let mut playback = Playback::new(&timeline);

    let half = playback.sample(5.0).position;
    // Quadratic at t = 0.5: 0.25 * p0 + 0.5 * p1 + 0.25 * p2.
    assert!((half.x - (0.25 * 206.0 + 0.5 * 125.0 + 0.25 * 125.0)).abs() < 1e-9);
    assert!((half.y - (0.75 * 497.0 + 0.25 * 270.5)).abs() < 1e-9);
}

/// Snapping on cancel shows up in playback right at the boundary.
#[test]
fn playback_of_cancelled_run_jumps_to_end() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let token = sequencer.cancellation_token();
    let mut host = |_: f64, batch: &Batch| {
        if batch.phase == Phase::ShrinkToSmallest {
            token.cancel();
        }
    };
    let timeline = Scheduler::run(&mut sequencer, &mut host).unwrap();
    let mut playback = Playback::new(&timeline);

    let frame = playback.sample(6.5);
    assert_eq!(frame.bounds, Size::new(200.0, 150.0));
    assert_eq!(frame.corner_radius, 2.0);
    assert_eq!(frame.position, Point::new(125.0, 270.5));
}

/// Shadow blur grows from the FAB's elevation to the dialog's.
#[test]
fn shadow_radius_tracks_elevation() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();
    let mut playback = Playback::new(&timeline);

    let start = playback.sample(0.0);
    let end = playback.sample(10.0);
    let ambient = |frame: &reveal_core::Frame| {
        frame
            .shadows
            .iter()
            .find(|s| s.kind == ShadowKind::Ambient)
            .map(|s| s.radius)
    };
    assert_eq!(ambient(&start), Some(18.0));
    assert_eq!(ambient(&end), Some(46.0));
}

/// Invalid inputs are rejected before anything is emitted.
#[test]
fn invalid_inputs_are_typed_errors() {
    let degenerate = Shape::new(Point::ZERO, Size::ZERO);
    assert!(matches!(
        TransitionSequencer::new(
            Shape::fab(container()),
            degenerate,
            TransitionConfig::default()
        ),
        Err(RevealError::DegenerateEndShape { .. })
    ));

    let negative = Shape::new(Point::ZERO, Size::new(-200.0, 150.0));
    assert!(matches!(
        TransitionSequencer::new(Shape::fab(container()), negative, TransitionConfig::default()),
        Err(RevealError::DegenerateEndShape { .. })
    ));

    assert!(matches!(
        TransitionSequencer::new(
            Shape::fab(container()),
            Shape::dialog(container()),
            TransitionConfig::default().with_duration(-1.0)
        ),
        Err(RevealError::InvalidDuration(_))
    ));
}

/// Timelines serialize with paths as SVG strings.
#[test]
fn timeline_serializes_to_json() {
    let mut sequencer = fab_to_dialog(TransitionConfig::default());
    let timeline = Scheduler::run(&mut sequencer, &mut noop_host()).unwrap();
    let json = serde_json::to_value(&timeline).unwrap();

    assert_eq!(json["outcome"], "finished");
    let shrink = &json["batches"][1];
    assert_eq!(shrink["phase"], "shrink_to_smallest");
    let mask = shrink["instructions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["key"] == "mask_path")
        .unwrap();
    assert_eq!(mask["to"]["type"], "mask");
    assert_eq!(mask["to"]["value"]["fill_rule"], "even_odd");
    assert!(mask["to"]["value"]["path"].as_str().unwrap().starts_with('M'));
}
