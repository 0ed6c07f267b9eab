use rustc_hash::{FxHashMap, FxHashSet};

use super::{SchedulingPolicy, select_min_by};
use crate::core::{Job, JobId, Time};

/// Lower value is more urgent. Jobs without a priority run last.
#[derive(Debug, Default)]
pub struct PriorityScheduler {
    quantum: Time,
    aging_step: i64,
    // Accumulated aging per waiting job, subtracted from its base priority
    boost: FxHashMap<JobId, i64>,
    // Jobs passed over by each outstanding selection, keyed by the selected
    // job. Several cores can select before any of their slices end.
    passed_over: FxHashMap<JobId, Vec<JobId>>,
    finished: FxHashSet<JobId>,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preemptive variant: every `quantum` the running job goes back to the
    /// ready set and each job passed over gains `step` of urgency.
    pub fn with_aging(quantum: Time, step: i64) -> Self {
        debug_assert!(quantum > 0.0, "Aging requires a positive quantum");
        Self {
            quantum,
            aging_step: step,
            ..Self::default()
        }
    }

    pub fn effective_priority(&self, job: &Job) -> i64 {
        let base = job.priority().map_or(i64::MAX, i64::from);
        base.saturating_sub(self.boost.get(&job.id()).copied().unwrap_or(0))
    }

    fn ages(&self) -> bool {
        self.aging_step > 0
    }
}

impl SchedulingPolicy for PriorityScheduler {
    fn select_next(&mut self, ready: &[Job], _now: Time) -> Option<usize> {
        let selected = select_min_by(ready, |a, b| {
            self.effective_priority(a).cmp(&self.effective_priority(b))
        })?;

        if self.ages() {
            let others = ready
                .iter()
                .enumerate()
                .filter(|&(idx, _)| idx != selected)
                .map(|(_, job)| job.id())
                .collect();
            self.passed_over.insert(ready[selected].id(), others);
        }
        Some(selected)
    }

    fn time_slice(&self) -> Time {
        self.quantum
    }

    fn on_completion_or_preemption(&mut self, job: &mut Job, _now: Time) {
        if !self.ages() {
            return;
        }

        // The job that just ran starts aging from scratch
        self.boost.remove(&job.id());
        if job.is_finished() {
            self.finished.insert(job.id());
        }

        let Some(passed_over) = self.passed_over.remove(&job.id()) else {
            return;
        };
        for id in passed_over {
            // Finished on another core since this selection was made
            if self.finished.contains(&id) {
                continue;
            }
            *self.boost.entry(id).or_insert(0) += self.aging_step;
        }
    }

    fn name(&self) -> &str {
        if self.ages() {
            "Priority (aging)"
        } else {
            "Priority"
        }
    }
}
