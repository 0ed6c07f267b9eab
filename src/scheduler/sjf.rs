use super::{SchedulingPolicy, select_min_by};
use crate::core::{Job, Time};

/// Non-preemptive shortest job first. Only considers jobs already in the
/// ready set; never looks ahead to future arrivals.
#[derive(Debug, Default)]
pub struct SjfScheduler;

impl SjfScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl SchedulingPolicy for SjfScheduler {
    fn select_next(&mut self, ready: &[Job], _now: Time) -> Option<usize> {
        select_min_by(ready, |a, b| a.remaining_time().total_cmp(&b.remaining_time()))
    }

    fn time_slice(&self) -> Time {
        0.0
    }

    fn name(&self) -> &str {
        "SJF"
    }
}
