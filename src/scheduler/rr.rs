use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use super::SchedulingPolicy;
use crate::core::{Job, JobId, Time};

/// Round robin over an insertion-ordered queue of job ids.
///
/// The queue is the authoritative rotation order: ids are appended the first
/// time a job shows up in the ready set, preempted jobs move to the tail in
/// the completion hook, and finished jobs are dropped.
#[derive(Debug)]
pub struct RoundRobinScheduler {
    quantum: Time,
    order: VecDeque<JobId>,
    known: FxHashSet<JobId>,
}

impl RoundRobinScheduler {
    pub fn new(quantum: Time) -> Self {
        debug_assert!(quantum > 0.0, "Round robin requires a positive quantum");
        Self {
            quantum,
            order: VecDeque::new(),
            known: FxHashSet::default(),
        }
    }

    fn track_arrivals(&mut self, ready: &[Job]) {
        for job in ready {
            if self.known.insert(job.id()) {
                self.order.push_back(job.id());
            }
        }
    }

    fn forget(&mut self, id: JobId) {
        if let Some(pos) = self.order.iter().position(|&queued| queued == id) {
            self.order.remove(pos);
        }
    }
}

impl SchedulingPolicy for RoundRobinScheduler {
    fn select_next(&mut self, ready: &[Job], _now: Time) -> Option<usize> {
        self.track_arrivals(ready);

        let index: FxHashMap<JobId, usize> = ready
            .iter()
            .enumerate()
            .map(|(idx, job)| (job.id(), idx))
            .collect();

        // Ids of jobs running on another core are skipped, not removed
        self.order
            .iter()
            .find_map(|id| index.get(id).copied())
    }

    fn time_slice(&self) -> Time {
        self.quantum
    }

    fn on_completion_or_preemption(&mut self, job: &mut Job, _now: Time) {
        self.forget(job.id());
        if job.is_finished() {
            self.known.remove(&job.id());
        } else {
            self.order.push_back(job.id());
        }
    }

    fn name(&self) -> &str {
        "Round Robin"
    }
}
