use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use super::{admit_arrivals, pending_list, skip_to_next_arrival, slice_for};
use crate::core::{
    CoreId, DispatchRecord, EPSILON, Job, JobId, Observer, ScheduleResult, SharedMetrics,
    SliceOutcome, Time,
};
use crate::error::{Result, SimError};
use crate::scheduler::SchedulingPolicy;

/// How simulated execution maps onto wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pacing {
    /// Slices complete instantly; only the simulated clocks move.
    #[default]
    Virtual,
    /// Each worker sleeps `per_unit` for every simulated time unit it runs.
    RealTime { per_unit: Duration },
}

/// Max of all per-core clocks, stored as f64 bits.
#[derive(Debug)]
struct Horizon(AtomicU64);

impl Horizon {
    fn new(start: Time) -> Self {
        Self(AtomicU64::new(start.to_bits()))
    }

    fn advance_to(&self, t: Time) {
        let mut current = self.0.load(Ordering::Relaxed);
        while Time::from_bits(current) < t {
            match self.0.compare_exchange_weak(
                current,
                t.to_bits(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    fn load(&self) -> Time {
        Time::from_bits(self.0.load(Ordering::Acquire))
    }
}

// Everything guarded by the queue lock
struct PoolState<'p, P: ?Sized> {
    pending: VecDeque<Job>,
    ready: Vec<Job>,
    executing: Vec<Option<JobId>>,
    unfinished: usize,
    policy: &'p mut P,
    observer: Observer,
}

struct Shared<'p, P: ?Sized> {
    state: Mutex<PoolState<'p, P>>,
    job_available: Condvar,
    terminate: AtomicBool,
    horizon: Horizon,
    metrics: SharedMetrics,
    quantum: Time,
    start: Time,
}

impl<'p, P: ?Sized> Shared<'p, P> {
    fn lock(&self) -> MutexGuard<'_, PoolState<'p, P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Wakes every waiting worker for shutdown if the owning worker unwinds.
/// The panicking worker's job is lost, so `unfinished` can no longer reach
/// zero on its own.
struct TerminateOnPanic<'s, 'p, P: ?Sized> {
    core: CoreId,
    shared: &'s Shared<'p, P>,
}

impl<P: ?Sized> Drop for TerminateOnPanic<'_, '_, P> {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        error!("core {} panicked, shutting the pool down", self.core);
        self.shared.terminate.store(true, Ordering::Release);
        // Notify under the lock so a worker between its terminate check and
        // its wait cannot miss the wakeup
        let _state = self.shared.lock();
        self.shared.job_available.notify_all();
    }
}

/// Simulates `cores` CPUs as real threads pulling from one shared ready
/// queue under one policy instance.
///
/// Each worker keeps its own simulated clock. A job never starts before it
/// became ready, so a job preempted on one core cannot resume on another
/// core at an earlier simulated time. Makespan is the latest clock reached by
/// any core.
///
/// Cross-core ordering is approximate. A worker whose clock has run ahead
/// admits every arrival up to its own clock and may take a job that a lagging
/// idle core would have started earlier in simulated time. The job still
/// starts no earlier than its arrival, but the resulting schedule can differ
/// from a lock-step multi-core simulation.
///
/// A panicking worker shuts the pool down: the other workers drain what is
/// ready and exit, and the panic resurfaces from `run`.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    cores: usize,
    pacing: Pacing,
}

impl WorkerPool {
    pub fn new(cores: usize) -> Result<Self> {
        if cores == 0 {
            return Err(SimError::NoCores);
        }
        Ok(Self {
            cores,
            pacing: Pacing::Virtual,
        })
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn cores(&self) -> usize {
        self.cores
    }

    pub fn run<P>(&self, jobs: Vec<Job>, policy: &mut P) -> ScheduleResult
    where
        P: SchedulingPolicy + ?Sized,
    {
        self.run_observed(jobs, policy).0
    }

    /// Like [`WorkerPool::run`], also returning the occupancy observer.
    pub fn run_observed<P>(&self, jobs: Vec<Job>, policy: &mut P) -> (ScheduleResult, Observer)
    where
        P: SchedulingPolicy + ?Sized,
    {
        let metrics = SharedMetrics::new();
        let quantum = policy.time_slice();
        metrics.set_run_info(policy.name(), quantum, self.cores);

        let pending = pending_list(jobs);
        let Some(start) = pending.front().map(Job::arrival_time) else {
            info!("No jobs to schedule");
            return (metrics.into_result(), Observer::new());
        };

        info!(
            "Scheduling {} jobs with {} on {} cores",
            pending.len(),
            policy.name(),
            self.cores
        );

        let shared = Shared {
            state: Mutex::new(PoolState {
                unfinished: pending.len(),
                ready: Vec::with_capacity(pending.len()),
                pending,
                executing: vec![None; self.cores],
                policy,
                observer: Observer::new(),
            }),
            job_available: Condvar::new(),
            terminate: AtomicBool::new(false),
            horizon: Horizon::new(start),
            metrics,
            quantum,
            start,
        };

        thread::scope(|s| {
            for core in 0..self.cores {
                let shared = &shared;
                s.spawn(move || self.worker(core, shared));
            }
        });

        let makespan = shared.horizon.load() - start;
        let Shared { state, metrics, .. } = shared;
        let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(state.ready.is_empty() && state.pending.is_empty());

        metrics.set_makespan(makespan);
        let result = metrics.into_result();
        info!(
            "{} finished {} jobs on {} cores, makespan {:.3}, {} context switches",
            result.policy,
            result.completed_jobs.len(),
            self.cores,
            result.makespan,
            result.context_switches()
        );
        (result, state.observer)
    }

    fn worker<P>(&self, core: CoreId, shared: &Shared<'_, P>)
    where
        P: SchedulingPolicy + ?Sized,
    {
        let _guard = TerminateOnPanic { core, shared };
        let mut clock = shared.start;

        loop {
            let mut state = shared.lock();

            // Wait until something is ready, fast-forwarding over arrival gaps
            loop {
                let st = &mut *state;
                admit_arrivals(&mut st.pending, &mut st.ready, clock);
                if !st.ready.is_empty() {
                    break;
                }
                if !st.pending.is_empty() {
                    let next_arrival = skip_to_next_arrival(&mut st.pending, &mut st.ready, clock);
                    shared.metrics.record_idle(next_arrival - clock);
                    clock = next_arrival;
                    continue;
                }
                if shared.terminate.load(Ordering::Acquire) {
                    debug!("core {core} exiting at t={clock:.3}");
                    return;
                }
                state = shared
                    .job_available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }

            // Select and remove in one critical section
            let st = &mut *state;
            let idx = match st.policy.select_next(&st.ready, clock) {
                Some(idx) if idx < st.ready.len() => idx,
                other => {
                    warn!(
                        "{} returned {:?} for {} ready jobs on core {core}, falling back to queue head",
                        st.policy.name(),
                        other,
                        st.ready.len()
                    );
                    0
                }
            };
            let mut job = st.ready.remove(idx);

            let dispatch_time = clock.max(job.ready_since());
            if dispatch_time - clock > EPSILON {
                shared.metrics.record_idle(dispatch_time - clock);
                clock = dispatch_time;
            }

            job.dispatch(clock);
            st.executing[core] = Some(job.id());
            st.observer.observe(&st.executing);
            shared.metrics.record_dispatch();
            drop(state);

            // The worker owns the job until it is finished or requeued
            let execution = slice_for(job.remaining_time(), shared.quantum);
            self.pace(execution);

            let slice_start = clock;
            clock += execution;
            shared.horizon.advance_to(clock);
            shared.metrics.record_active(execution);

            let done = job.consume(execution);
            debug!(
                "core {core} t={:.3} job {} ran {:.3} (remaining {:.3})",
                slice_start,
                job.id(),
                execution,
                job.remaining_time()
            );
            shared.metrics.record_slice(DispatchRecord {
                job: job.id(),
                core,
                start: slice_start,
                end: clock,
                outcome: if done {
                    SliceOutcome::Finished
                } else {
                    SliceOutcome::Preempted
                },
            });

            let mut state = shared.lock();
            let st = &mut *state;
            if done {
                job.finish(clock);
                st.policy.on_completion_or_preemption(&mut job, clock);
                shared.metrics.record_completion(job);
                st.unfinished -= 1;
                if st.unfinished == 0 {
                    shared.terminate.store(true, Ordering::Release);
                    shared.job_available.notify_all();
                }
            } else {
                job.preempt(clock);
                st.policy.on_completion_or_preemption(&mut job, clock);
                st.ready.push(job);
                // An idle core may pick the requeued job right away
                shared.job_available.notify_one();
            }
            st.executing[core] = None;
        }
    }

    fn pace(&self, execution: Time) {
        if let Pacing::RealTime { per_unit } = self.pacing {
            if execution > 0.0 && execution.is_finite() {
                thread::sleep(per_unit.mul_f64(execution));
            }
        }
    }
}
