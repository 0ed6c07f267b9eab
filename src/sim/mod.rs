pub mod driver;
pub mod pool;

use std::collections::VecDeque;

pub use driver::SequentialEngine;
pub use pool::{Pacing, WorkerPool};

use crate::config::{EngineKind, SimConfig};
use crate::core::{EPSILON, Job, ScheduleResult, Time, arrival_order};
use crate::error::Result;

/// Run `jobs` under the policy, engine and core count described by `config`.
pub fn simulate(config: &SimConfig, jobs: Vec<Job>) -> Result<ScheduleResult> {
    let mut policy = config.build_policy()?;

    match config.engine() {
        EngineKind::Sequential => Ok(SequentialEngine::new().run(jobs, &mut policy)),
        EngineKind::Pool => {
            let pool = WorkerPool::new(config.cores)?.with_pacing(config.pacing);
            Ok(pool.run(jobs, &mut policy))
        }
    }
}

/// Sort jobs into the pending list, earliest arrival first.
pub(crate) fn pending_list(mut jobs: Vec<Job>) -> VecDeque<Job> {
    jobs.sort_by(arrival_order);
    jobs.into()
}

/// Move every pending job that has arrived by `now` into `ready`.
pub(crate) fn admit_arrivals(pending: &mut VecDeque<Job>, ready: &mut Vec<Job>, now: Time) {
    // Contiguous, since pending is sorted by arrival
    while pending
        .front()
        .is_some_and(|job| job.arrival_time() <= now + EPSILON)
    {
        if let Some(mut job) = pending.pop_front() {
            job.admit();
            ready.push(job);
        }
    }
}

/// Clock value to jump to when nothing is ready. A front job whose arrival
/// does not compare past `now` (NaN) is admitted as-is instead.
pub(crate) fn skip_to_next_arrival(
    pending: &mut VecDeque<Job>,
    ready: &mut Vec<Job>,
    now: Time,
) -> Time {
    match pending.front().map(Job::arrival_time) {
        Some(next) if next > now => next,
        Some(_) => {
            if let Some(mut job) = pending.pop_front() {
                job.admit();
                ready.push(job);
            }
            now
        }
        None => now,
    }
}

/// Length of the next run for a job with `remaining` work. Malformed work
/// (NaN, infinite or not positive) gets an empty slice.
pub(crate) fn slice_for(remaining: Time, quantum: Time) -> Time {
    if !(remaining > EPSILON && remaining.is_finite()) {
        return 0.0;
    }
    let execution = if quantum > 0.0 {
        remaining.min(quantum)
    } else {
        remaining
    };
    // A near-zero slice would never drain the job
    if execution < EPSILON { remaining } else { execution }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_respects_quantum() {
        assert_eq!(slice_for(5.0, 2.0), 2.0);
        assert_eq!(slice_for(1.0, 2.0), 1.0);
        assert_eq!(slice_for(5.0, 0.0), 5.0);
    }

    #[test]
    fn tiny_quantum_runs_the_rest() {
        assert_eq!(slice_for(3.0, 1e-9), 3.0);
    }

    #[test]
    fn malformed_work_gets_an_empty_slice() {
        assert_eq!(slice_for(f64::NAN, 0.0), 0.0);
        assert_eq!(slice_for(f64::INFINITY, 2.0), 0.0);
        assert_eq!(slice_for(f64::NEG_INFINITY, 0.0), 0.0);
        assert_eq!(slice_for(-4.0, 2.0), 0.0);
    }

    #[test]
    fn admits_within_epsilon() {
        let mut pending = pending_list(vec![
            Job::new(2, 1.000001, 1.0),
            Job::new(1, 0.0, 1.0),
            Job::new(3, 4.0, 1.0),
        ]);
        let mut ready = Vec::new();
        admit_arrivals(&mut pending, &mut ready, 1.0);

        let ids: Vec<_> = ready.iter().map(Job::id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(pending.len(), 1);
        assert!(ready.iter().all(|job| job.state() == crate::core::JobState::Ready));
    }
}
