use super::{SchedulingPolicy, select_min_by};
use crate::core::{Job, Time};

/// First come, first served. Runs each job to completion.
#[derive(Debug, Default)]
pub struct FcfsScheduler;

impl FcfsScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl SchedulingPolicy for FcfsScheduler {
    fn select_next(&mut self, ready: &[Job], _now: Time) -> Option<usize> {
        select_min_by(ready, |a, b| a.arrival_time().total_cmp(&b.arrival_time()))
    }

    fn time_slice(&self) -> Time {
        0.0
    }

    fn name(&self) -> &str {
        "FCFS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_earliest_arrival() {
        let ready = vec![Job::new(1, 2.0, 1.0), Job::new(2, 1.0, 9.0)];
        assert_eq!(FcfsScheduler::new().select_next(&ready, 2.0), Some(1));
    }

    #[test]
    fn same_arrival_picks_lower_id() {
        let ready = vec![Job::new(5, 0.0, 1.0), Job::new(3, 0.0, 1.0)];
        assert_eq!(FcfsScheduler::new().select_next(&ready, 0.0), Some(1));
    }

    #[test]
    fn runs_to_completion() {
        assert_eq!(FcfsScheduler::new().time_slice(), 0.0);
    }
}
