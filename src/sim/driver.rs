use log::{debug, info, warn};

use super::{admit_arrivals, pending_list, skip_to_next_arrival, slice_for};
use crate::core::{
    DispatchRecord, EPSILON, Job, MetricsCollector, ScheduleResult, SliceOutcome,
};
use crate::scheduler::SchedulingPolicy;

const CORE: usize = 0;

/// Deterministic single-core discrete-event simulator. The clock jumps from
/// one dispatch boundary or arrival to the next; nothing sleeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialEngine;

impl SequentialEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn run<P>(&self, jobs: Vec<Job>, policy: &mut P) -> ScheduleResult
    where
        P: SchedulingPolicy + ?Sized,
    {
        let mut metrics = MetricsCollector::new();
        let quantum = policy.time_slice();
        metrics.set_run_info(policy.name(), quantum, 1);

        let mut pending = pending_list(jobs);
        let Some(simulation_start) = pending.front().map(Job::arrival_time) else {
            info!("No jobs to schedule");
            return metrics.into_result();
        };

        info!(
            "Scheduling {} jobs with {} on a single core",
            pending.len(),
            policy.name()
        );

        let mut ready: Vec<Job> = Vec::with_capacity(pending.len());
        let mut clock = simulation_start;

        while !pending.is_empty() || !ready.is_empty() {
            admit_arrivals(&mut pending, &mut ready, clock);

            if ready.is_empty() {
                let next_arrival = skip_to_next_arrival(&mut pending, &mut ready, clock);
                metrics.record_idle(next_arrival - clock);
                clock = next_arrival;
                continue;
            }

            let idx = match policy.select_next(&ready, clock) {
                Some(idx) if idx < ready.len() => idx,
                other => {
                    warn!(
                        "{} returned {:?} for {} ready jobs, falling back to queue head",
                        policy.name(),
                        other,
                        ready.len()
                    );
                    0
                }
            };
            let mut job = ready.remove(idx);

            let dispatch_time = clock.max(job.ready_since());
            if dispatch_time - clock > EPSILON {
                metrics.record_idle(dispatch_time - clock);
                clock = dispatch_time;
            }

            job.dispatch(clock);
            metrics.record_dispatch();

            let execution = slice_for(job.remaining_time(), quantum);
            let slice_start = clock;
            clock += execution;
            metrics.record_active(execution);

            let done = job.consume(execution);
            debug!(
                "t={:.3} job {} ran {:.3} (remaining {:.3})",
                slice_start,
                job.id(),
                execution,
                job.remaining_time()
            );
            metrics.record_slice(DispatchRecord {
                job: job.id(),
                core: CORE,
                start: slice_start,
                end: clock,
                outcome: if done {
                    SliceOutcome::Finished
                } else {
                    SliceOutcome::Preempted
                },
            });

            if done {
                job.finish(clock);
                policy.on_completion_or_preemption(&mut job, clock);
                metrics.record_completion(job);
            } else {
                job.preempt(clock);
                policy.on_completion_or_preemption(&mut job, clock);
                ready.push(job);
            }
        }

        metrics.set_makespan(clock - simulation_start);
        info!(
            "{} finished {} jobs, makespan {:.3}, {} context switches",
            policy.name(),
            metrics.completed(),
            clock - simulation_start,
            metrics.context_switches()
        );
        metrics.into_result()
    }
}
