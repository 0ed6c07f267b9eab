use std::sync::{Mutex, MutexGuard, PoisonError};

use average::{Estimate, Max, Mean};

use super::event::DispatchRecord;
use super::state::{Job, Time};

fn average_of(total: Time, count: usize) -> Time {
    if count == 0 {
        0.0
    } else {
        total / count as Time
    }
}

fn utilization(active: Time, makespan: Time) -> Time {
    let ratio = active / makespan;
    if !(makespan > 0.0) || ratio.is_nan() {
        return 0.0;
    }
    // Active time is summed over cores but makespan is one wall clock
    ratio.clamp(0.0, 1.0)
}

fn context_switches(dispatches: usize) -> usize {
    dispatches.saturating_sub(1)
}

/// Everything one run produced. Read-only input to the report layer.
#[derive(Debug, Clone, Default)]
pub struct ScheduleResult {
    pub policy: String,
    pub quantum: Time,
    pub cores: usize,
    pub completed_jobs: Vec<Job>,
    pub timeline: Vec<DispatchRecord>,
    pub total_waiting_time: Time,
    pub total_turnaround_time: Time,
    pub cpu_active_time: Time,
    pub idle_time: Time,
    pub makespan: Time,
    pub dispatch_count: usize,
}

impl ScheduleResult {
    pub fn average_waiting_time(&self) -> Time {
        average_of(self.total_waiting_time, self.completed_jobs.len())
    }

    pub fn average_turnaround_time(&self) -> Time {
        average_of(self.total_turnaround_time, self.completed_jobs.len())
    }

    pub fn cpu_utilization(&self) -> Time {
        utilization(self.cpu_active_time, self.makespan)
    }

    pub fn context_switches(&self) -> usize {
        context_switches(self.dispatch_count)
    }

    pub fn average_response_time(&self) -> Time {
        let mean: Mean = self
            .completed_jobs
            .iter()
            .filter_map(Job::response_time)
            .collect();
        if mean.is_empty() { 0.0 } else { mean.estimate() }
    }

    /// Longest time any single job spent waiting.
    pub fn max_waiting_time(&self) -> Time {
        if self.completed_jobs.is_empty() {
            return 0.0;
        }
        let max: Max = self
            .completed_jobs
            .iter()
            .map(Job::waiting_time)
            .collect();
        max.max()
    }

    pub fn jobs_by_id(&self) -> Vec<&Job> {
        let mut jobs: Vec<&Job> = self.completed_jobs.iter().collect();
        jobs.sort_by_key(|job| job.id());
        jobs
    }

    pub fn is_empty(&self) -> bool {
        self.completed_jobs.is_empty()
    }
}

/// Single-threaded accumulator. The sequential engine owns one directly,
/// the worker pool goes through [`SharedMetrics`].
#[derive(Debug, Default)]
pub struct MetricsCollector {
    result: ScheduleResult,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_completion(&mut self, job: Job) {
        debug_assert!(job.is_finished(), "Recording unfinished job {}", job.id());
        self.result.total_waiting_time += job.waiting_time();
        self.result.total_turnaround_time += job.turnaround_time();
        self.result.completed_jobs.push(job);
    }

    pub fn record_active(&mut self, duration: Time) {
        if duration > 0.0 {
            self.result.cpu_active_time += duration;
        }
    }

    pub fn record_idle(&mut self, duration: Time) {
        if duration > 0.0 {
            self.result.idle_time += duration;
        }
    }

    pub fn record_dispatch(&mut self) {
        self.result.dispatch_count += 1;
    }

    pub fn record_slice(&mut self, record: DispatchRecord) {
        self.result.timeline.push(record);
    }

    pub fn set_makespan(&mut self, makespan: Time) {
        self.result.makespan = if !(makespan >= super::EPSILON) {
            0.0
        } else {
            makespan
        };
    }

    pub fn set_run_info(&mut self, policy: &str, quantum: Time, cores: usize) {
        self.result.policy = policy.to_string();
        self.result.quantum = quantum;
        self.result.cores = cores;
    }

    pub fn completed(&self) -> usize {
        self.result.completed_jobs.len()
    }

    pub fn average_waiting_time(&self) -> Time {
        self.result.average_waiting_time()
    }

    pub fn average_turnaround_time(&self) -> Time {
        self.result.average_turnaround_time()
    }

    pub fn cpu_utilization(&self) -> Time {
        self.result.cpu_utilization()
    }

    pub fn context_switches(&self) -> usize {
        self.result.context_switches()
    }

    pub fn reset(&mut self) {
        self.result = ScheduleResult::default();
    }

    pub fn snapshot(&self) -> ScheduleResult {
        self.result.clone()
    }

    pub fn into_result(self) -> ScheduleResult {
        self.result
    }
}

/// Lock-guarded collector shared by the pool's workers.
#[derive(Debug, Default)]
pub struct SharedMetrics {
    inner: Mutex<MetricsCollector>,
}

impl SharedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsCollector> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_completion(&self, job: Job) {
        self.lock().record_completion(job);
    }

    pub fn record_active(&self, duration: Time) {
        self.lock().record_active(duration);
    }

    pub fn record_idle(&self, duration: Time) {
        self.lock().record_idle(duration);
    }

    pub fn record_dispatch(&self) {
        self.lock().record_dispatch();
    }

    pub fn record_slice(&self, record: DispatchRecord) {
        self.lock().record_slice(record);
    }

    pub fn set_makespan(&self, makespan: Time) {
        self.lock().set_makespan(makespan);
    }

    pub fn set_run_info(&self, policy: &str, quantum: Time, cores: usize) {
        self.lock().set_run_info(policy, quantum, cores);
    }

    pub fn completed(&self) -> usize {
        self.lock().completed()
    }

    pub fn average_waiting_time(&self) -> Time {
        self.lock().average_waiting_time()
    }

    pub fn average_turnaround_time(&self) -> Time {
        self.lock().average_turnaround_time()
    }

    pub fn cpu_utilization(&self) -> Time {
        self.lock().cpu_utilization()
    }

    pub fn context_switches(&self) -> usize {
        self.lock().context_switches()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn snapshot(&self) -> ScheduleResult {
        self.lock().snapshot()
    }

    pub fn into_result(self) -> ScheduleResult {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_result()
    }
}
