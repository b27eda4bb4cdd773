//! # Scheduler
//!
//! Runs a [`TransitionSequencer`] to completion in-process. Each batch is
//! committed to an [`AnimationHost`] at its absolute start time and is treated
//! as finished as soon as its duration has elapsed, which stands in for the
//! host's completion callback.

use crate::errors::Result;
use crate::instruction::Batch;
use crate::sequencer::{Phase, TransitionSequencer};
use serde::Serialize;
use tracing::debug;

/// Receives batches as the sequencer produces them.
pub trait AnimationHost {
    /// `at` is the absolute time, in seconds, at which `batch` starts.
    fn commit(&mut self, at: f64, batch: &Batch);
}

impl<F> AnimationHost for F
where
    F: FnMut(f64, &Batch),
{
    fn commit(&mut self, at: f64, batch: &Batch) {
        self(at, batch)
    }
}

/// A batch together with the time it was committed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduledBatch {
    pub start_time: f64,
    #[serde(flatten)]
    pub batch: Batch,
}

impl ScheduledBatch {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.batch.duration
    }
}

/// Every batch of one run, in commit order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Timeline {
    pub total_duration: f64,
    /// `Finished` or `Cancelled`.
    pub outcome: Phase,
    pub batches: Vec<ScheduledBatch>,
}

impl Timeline {
    /// Time at which the last batch finishes.
    pub fn end_time(&self) -> f64 {
        self.batches
            .iter()
            .map(ScheduledBatch::end_time)
            .fold(0.0, f64::max)
    }

    /// Batches of the three morph phases, in order.
    pub fn phase_batches(&self) -> impl Iterator<Item = &ScheduledBatch> {
        self.batches
            .iter()
            .filter(|scheduled| scheduled.batch.phase.is_morph_phase())
    }

    pub fn find_phase(&self, phase: Phase) -> Option<&ScheduledBatch> {
        self.batches.iter().find(|scheduled| scheduled.batch.phase == phase)
    }
}

pub struct Scheduler;

impl Scheduler {
    /// Drives `sequencer` from `animate` through its terminal phase.
    ///
    /// The host may cancel through the sequencer's token from inside
    /// `commit`; cancellation takes effect at the next phase boundary.
    pub fn run<H: AnimationHost + ?Sized>(
        sequencer: &mut TransitionSequencer,
        host: &mut H,
    ) -> Result<Timeline> {
        let mut batches = Vec::new();
        let mut commit = |at: f64, batch: Batch, batches: &mut Vec<ScheduledBatch>| {
            host.commit(at, &batch);
            batches.push(ScheduledBatch {
                start_time: at,
                batch,
            });
        };

        let mut cursor = 0.0;
        let mut phase_duration = 0.0;
        for batch in sequencer.animate()? {
            if batch.phase.is_morph_phase() {
                phase_duration = batch.duration;
            }
            commit(cursor, batch, &mut batches);
        }

        // A token cancelled before `animate` ends the run right away.
        while !sequencer.phase().is_terminal() {
            cursor += phase_duration;
            let batch = sequencer.phase_complete()?.into_batch();
            debug!(phase = ?batch.phase, at = cursor, "Committing batch");
            phase_duration = batch.duration;
            commit(cursor, batch, &mut batches);
        }

        Ok(Timeline {
            total_duration: sequencer.plan().total_duration(),
            outcome: sequencer.phase(),
            batches,
        })
    }
}
