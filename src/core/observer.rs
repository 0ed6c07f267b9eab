use rustc_hash::FxHashSet;

use super::state::JobId;

/// Checks per-core occupancy every time a worker fills its executing slot.
/// A job id found in two slots is counted, never fatal: duplicate ids in the
/// input legitimately produce it.
#[derive(Debug, Default, Clone)]
pub struct Observer {
    observations: u64,
    double_dispatches: u64,
    peak_parallelism: usize,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, executing: &[Option<JobId>]) {
        self.observations += 1;

        let mut seen = FxHashSet::default();
        let mut busy = 0;
        for job in executing.iter().flatten() {
            busy += 1;
            if !seen.insert(*job) {
                self.double_dispatches += 1;
            }
        }
        self.peak_parallelism = self.peak_parallelism.max(busy);
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Times a job id was seen in two executing slots at once.
    pub fn double_dispatches(&self) -> u64 {
        self.double_dispatches
    }

    pub fn peak_parallelism(&self) -> usize {
        self.peak_parallelism
    }
}
