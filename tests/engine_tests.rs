use rand::prelude::*;
use sched_sim::core::{EPSILON, JobState, SliceOutcome};
use sched_sim::scheduler::{
    FcfsScheduler, PriorityScheduler, RoundRobinScheduler, SchedulingPolicy, SjfScheduler,
};
use sched_sim::workload::bernoulli_jobs;
use sched_sim::{Job, JobId, PolicyKind, ScheduleResult, SequentialEngine, SimConfig, Time};

fn run(jobs: Vec<Job>, policy: &mut impl SchedulingPolicy) -> ScheduleResult {
    SequentialEngine::new().run(jobs, policy)
}

fn job<'a>(result: &'a ScheduleResult, id: JobId) -> &'a Job {
    result
        .completed_jobs
        .iter()
        .find(|j| j.id() == id)
        .unwrap()
}

fn dispatch_order(result: &ScheduleResult) -> Vec<JobId> {
    result.timeline.iter().map(|r| r.job).collect()
}

fn assert_invariants(result: &ScheduleResult, input_ids: &[JobId]) {
    assert_eq!(result.completed_jobs.len(), input_ids.len());
    let mut ids: Vec<_> = result.completed_jobs.iter().map(Job::id).collect();
    ids.sort_unstable();
    let mut expected = input_ids.to_vec();
    expected.sort_unstable();
    assert_eq!(ids, expected);

    for job in &result.completed_jobs {
        assert_eq!(job.state(), JobState::Finished);
        assert_eq!(job.remaining_time(), 0.0);
        assert!(
            (job.waiting_time() + job.burst_time() - job.turnaround_time()).abs() < EPSILON,
            "job {} breaks waiting + burst == turnaround",
            job.id()
        );
        assert!(job.start_time().unwrap() >= job.arrival_time() - EPSILON);
    }

    assert!(result.makespan >= 0.0);
    assert!((0.0..=1.0).contains(&result.cpu_utilization()));
    assert_eq!(
        result.context_switches(),
        result.dispatch_count.saturating_sub(1)
    );
}

fn assert_single_core_accounting(result: &ScheduleResult) {
    let diff = result.idle_time + result.cpu_active_time - result.makespan;
    assert!(diff.abs() < 1e-6, "idle + active != makespan (off by {diff})");
}

#[test]
fn test_fcfs_runs_in_arrival_then_id_order() {
    let jobs = vec![Job::new(1, 0.0, 5.0), Job::new(2, 0.0, 3.0)];
    let result = run(jobs, &mut FcfsScheduler::new());

    assert_eq!(dispatch_order(&result), vec![1, 2]);
    assert_eq!(job(&result, 1).finish_time(), Some(5.0));
    assert_eq!(job(&result, 2).finish_time(), Some(8.0));
    assert_eq!(job(&result, 1).waiting_time(), 0.0);
    assert_eq!(job(&result, 2).waiting_time(), 5.0);
    assert_eq!(job(&result, 1).turnaround_time(), 5.0);
    assert_eq!(job(&result, 2).turnaround_time(), 8.0);
    assert_eq!(result.average_waiting_time(), 2.5);
    assert_eq!(result.average_turnaround_time(), 6.5);
    assert_eq!(result.context_switches(), 1);
    assert_eq!(result.cpu_utilization(), 1.0);
    assert_invariants(&result, &[1, 2]);
}

#[test]
fn test_sjf_does_not_look_ahead() {
    let jobs = vec![Job::new(1, 0.0, 5.0), Job::new(2, 1.0, 2.0)];
    let result = run(jobs, &mut SjfScheduler::new());

    assert_eq!(dispatch_order(&result), vec![1, 2]);
    assert_eq!(job(&result, 1).finish_time(), Some(5.0));
    assert_eq!(job(&result, 2).finish_time(), Some(7.0));
    assert_eq!(job(&result, 2).waiting_time(), 4.0);
    assert_invariants(&result, &[1, 2]);
}

#[test]
fn test_sjf_prefers_shorter_ready_job() {
    let jobs = vec![
        Job::new(1, 0.0, 3.0),
        Job::new(2, 1.0, 6.0),
        Job::new(3, 2.0, 1.0),
    ];
    let result = run(jobs, &mut SjfScheduler::new());
    // At t=3 both 2 and 3 are ready; 3 is shorter
    assert_eq!(dispatch_order(&result), vec![1, 3, 2]);
    assert_eq!(job(&result, 3).finish_time(), Some(4.0));
    assert_eq!(job(&result, 2).finish_time(), Some(10.0));
}

#[test]
fn test_round_robin_interleaves() {
    let jobs = vec![Job::new(1, 0.0, 5.0), Job::new(2, 0.0, 3.0)];
    let result = run(jobs, &mut RoundRobinScheduler::new(2.0));

    assert_eq!(dispatch_order(&result), vec![1, 2, 1, 2, 1]);
    assert_eq!(result.dispatch_count, 5);
    assert_eq!(result.context_switches(), 4);
    assert_eq!(job(&result, 2).finish_time(), Some(7.0));
    assert_eq!(job(&result, 1).finish_time(), Some(8.0));
    assert_eq!(job(&result, 1).waiting_time(), 3.0);
    assert_eq!(job(&result, 2).waiting_time(), 4.0);
    assert_eq!(job(&result, 1).start_time(), Some(0.0));
    assert_eq!(job(&result, 2).start_time(), Some(2.0));
    assert_eq!(result.makespan, 8.0);
    assert_invariants(&result, &[1, 2]);
    assert_single_core_accounting(&result);
}

#[test]
fn test_round_robin_preempted_job_goes_behind_waiting_jobs() {
    let jobs = vec![
        Job::new(1, 0.0, 4.0),
        Job::new(2, 0.0, 2.0),
        Job::new(3, 0.0, 2.0),
    ];
    let result = run(jobs, &mut RoundRobinScheduler::new(2.0));
    assert_eq!(dispatch_order(&result), vec![1, 2, 3, 1]);
    assert_eq!(job(&result, 1).finish_time(), Some(8.0));
}

#[test]
fn test_priority_orders_by_urgency_then_id() {
    let jobs = vec![
        Job::new(1, 0.0, 4.0).with_priority(3),
        Job::new(2, 0.0, 2.0).with_priority(1),
        Job::new(3, 0.0, 1.0).with_priority(1),
    ];
    let result = run(jobs, &mut PriorityScheduler::new());
    assert_eq!(dispatch_order(&result), vec![2, 3, 1]);
    assert_eq!(job(&result, 1).finish_time(), Some(7.0));
    assert_eq!(result.context_switches(), 2);
}

#[test]
fn test_priority_aging_bounds_starvation() {
    let jobs = || {
        vec![
            Job::new(1, 0.0, 10.0).with_priority(0),
            Job::new(2, 0.0, 1.0).with_priority(3),
        ]
    };

    let plain = run(jobs(), &mut PriorityScheduler::new());
    assert_eq!(job(&plain, 2).finish_time(), Some(11.0));

    let aged = run(jobs(), &mut PriorityScheduler::with_aging(1.0, 1));
    assert_eq!(job(&aged, 2).finish_time(), Some(5.0));
    assert_eq!(job(&aged, 1).finish_time(), Some(11.0));
    assert_invariants(&aged, &[1, 2]);
}

#[test]
fn test_idle_gap_between_arrivals() {
    let jobs = vec![Job::new(1, 0.0, 2.0), Job::new(2, 5.0, 1.0)];
    let result = run(jobs, &mut FcfsScheduler::new());

    assert_eq!(job(&result, 2).start_time(), Some(5.0));
    assert_eq!(job(&result, 2).waiting_time(), 0.0);
    assert_eq!(result.idle_time, 3.0);
    assert_eq!(result.cpu_active_time, 3.0);
    assert_eq!(result.makespan, 6.0);
    assert_eq!(result.cpu_utilization(), 0.5);
    assert_single_core_accounting(&result);
}

#[test]
fn test_unsorted_input_is_sorted_by_arrival() {
    let jobs = vec![
        Job::new(3, 4.0, 1.0),
        Job::new(1, 2.0, 1.0),
        Job::new(2, 2.0, 1.0),
    ];
    let result = run(jobs, &mut FcfsScheduler::new());
    assert_eq!(dispatch_order(&result), vec![1, 2, 3]);
    assert_eq!(job(&result, 1).start_time(), Some(2.0));
    assert_eq!(result.makespan, 3.0);
}

#[test]
fn test_empty_job_list() {
    let result = run(Vec::new(), &mut FcfsScheduler::new());
    assert!(result.is_empty());
    assert_eq!(result.makespan, 0.0);
    assert_eq!(result.cpu_utilization(), 0.0);
    assert_eq!(result.average_waiting_time(), 0.0);
}

/// Declines every selection; the engine must fall back to the queue head.
struct Declining;

impl SchedulingPolicy for Declining {
    fn select_next(&mut self, _ready: &[Job], _now: Time) -> Option<usize> {
        None
    }

    fn time_slice(&self) -> Time {
        1.0
    }

    fn name(&self) -> &str {
        "declining"
    }
}

#[test]
fn test_declining_policy_falls_back_to_head() {
    let jobs = vec![Job::new(1, 0.0, 2.0), Job::new(2, 0.0, 1.0)];
    let result = run(jobs, &mut Declining);
    // Preempted jobs return to the tail, so the head rotates
    assert_eq!(dispatch_order(&result), vec![1, 2, 1]);
    assert_invariants(&result, &[1, 2]);
}

/// Counts hook calls, proving a new policy needs nothing but the trait.
#[derive(Default)]
struct LongestFirst {
    hooks: usize,
    finished: usize,
}

impl SchedulingPolicy for LongestFirst {
    fn select_next(&mut self, ready: &[Job], _now: Time) -> Option<usize> {
        sched_sim::scheduler::select_min_by(ready, |a, b| {
            b.remaining_time().total_cmp(&a.remaining_time())
        })
    }

    fn time_slice(&self) -> Time {
        0.0
    }

    fn on_completion_or_preemption(&mut self, job: &mut Job, _now: Time) {
        self.hooks += 1;
        if job.is_finished() {
            self.finished += 1;
        }
    }

    fn name(&self) -> &str {
        "LJF"
    }
}

#[test]
fn test_custom_policy_plugs_in() {
    let mut policy = LongestFirst::default();
    let jobs = vec![
        Job::new(1, 0.0, 1.0),
        Job::new(2, 0.0, 3.0),
        Job::new(3, 0.0, 2.0),
    ];
    let result = run(jobs, &mut policy);
    assert_eq!(dispatch_order(&result), vec![2, 3, 1]);
    assert_eq!(policy.hooks, 3);
    assert_eq!(policy.finished, 3);
    assert_eq!(result.policy, "LJF");
}

#[test]
fn test_fractional_quanta_do_not_drift() {
    let jobs: Vec<Job> = (1..=20)
        .map(|id| Job::new(id, id as f64 * 0.07, 0.1 + id as f64 * 0.013))
        .collect();
    let result = run(jobs, &mut RoundRobinScheduler::new(0.03));
    assert_invariants(&result, &(1..=20).collect::<Vec<_>>());
    assert_single_core_accounting(&result);

    let total_burst: f64 = result.completed_jobs.iter().map(Job::burst_time).sum();
    assert!((result.cpu_active_time - total_burst).abs() < 1e-6);
}

#[test]
fn test_engine_is_deterministic() {
    let jobs = bernoulli_jobs(100, 0.4, 0.5, 1.0, 4.0, 7);
    let a = run(jobs.clone(), &mut RoundRobinScheduler::new(1.5));
    let b = run(jobs, &mut RoundRobinScheduler::new(1.5));
    assert_eq!(a.timeline, b.timeline);
    assert_eq!(a.total_waiting_time, b.total_waiting_time);
    assert_eq!(a.dispatch_count, b.dispatch_count);
}

#[test]
fn test_invariants_hold_on_random_workloads() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    for trial in 0..40 {
        let n = rng.random_range(1..30);
        let jobs: Vec<Job> = (0..n)
            .map(|id| {
                Job::new(
                    id,
                    rng.random_range(0.0..20.0),
                    rng.random_range(0.1..6.0),
                )
                .with_priority(rng.random_range(0..5))
            })
            .collect();
        let ids: Vec<JobId> = jobs.iter().map(Job::id).collect();

        for kind in [
            PolicyKind::Fcfs,
            PolicyKind::Sjf,
            PolicyKind::RoundRobin,
            PolicyKind::Priority,
        ] {
            let config = SimConfig::new(kind).with_quantum(0.75);
            let mut policy = config.build_policy().unwrap();
            let result = SequentialEngine::new().run(jobs.clone(), &mut policy);

            assert_invariants(&result, &ids);
            assert_single_core_accounting(&result);
            assert_eq!(result.timeline.len(), result.dispatch_count, "trial {trial}");
            assert!(
                result
                    .timeline
                    .windows(2)
                    .all(|w| w[0].end <= w[1].start + EPSILON),
                "slices overlap on a single core"
            );
            let finished = result
                .timeline
                .iter()
                .filter(|r| r.outcome == SliceOutcome::Finished)
                .count();
            assert_eq!(finished, ids.len());
        }
    }
}
