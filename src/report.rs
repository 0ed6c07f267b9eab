use std::fmt;

use crate::core::{Job, ScheduleResult, SliceOutcome, Time};

const RULE: &str = "------------------------------------------------";

/// Per-job table plus aggregate metrics. Rows are ordered by job id,
/// independent of completion order.
pub struct Summary<'a> {
    result: &'a ScheduleResult,
}

impl<'a> Summary<'a> {
    pub fn new(result: &'a ScheduleResult) -> Self {
        Self { result }
    }
}

fn opt(t: Option<Time>) -> String {
    t.map_or_else(|| "-".to_string(), |t| format!("{t:.2}"))
}

fn write_row(f: &mut fmt::Formatter<'_>, job: &Job) -> fmt::Result {
    writeln!(
        f,
        "{:>3} | {:>7.2} | {:>5.2} | {:>5} | {:>6} | {:>6.2} | {:>10.2}",
        job.id(),
        job.arrival_time(),
        job.burst_time(),
        opt(job.start_time()),
        opt(job.finish_time()),
        job.waiting_time(),
        job.turnaround_time()
    )
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;

        write!(f, "Algorithm: {}", result.policy)?;
        if result.quantum > 0.0 {
            write!(f, " (Quantum = {})", result.quantum)?;
        }
        if result.cores > 1 {
            write!(f, " on {} cores", result.cores)?;
        }
        writeln!(f)?;

        if result.is_empty() {
            return writeln!(f, "No jobs to schedule.");
        }

        writeln!(f, "{RULE}")?;
        writeln!(f, "Job | Arrival | Burst | Start | Finish |   Wait | Turnaround")?;
        writeln!(f, "{RULE}")?;
        for job in result.jobs_by_id() {
            write_row(f, job)?;
        }
        writeln!(f, "{RULE}")?;

        writeln!(f, "Average Waiting Time: {:.2}", result.average_waiting_time())?;
        writeln!(
            f,
            "Average Turnaround Time: {:.2}",
            result.average_turnaround_time()
        )?;
        writeln!(f, "Average Response Time: {:.2}", result.average_response_time())?;
        writeln!(f, "Longest Wait: {:.2}", result.max_waiting_time())?;
        writeln!(f, "CPU Utilization: {:.2}%", result.cpu_utilization() * 100.0)?;
        writeln!(f, "Context Switches: {}", result.context_switches())
    }
}

/// Dispatch-by-dispatch listing, in the order slices were recorded.
pub struct Timeline<'a> {
    result: &'a ScheduleResult,
}

impl<'a> Timeline<'a> {
    pub fn new(result: &'a ScheduleResult) -> Self {
        Self { result }
    }
}

impl fmt::Display for Timeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.result.timeline {
            let outcome = match record.outcome {
                SliceOutcome::Finished => "finished",
                SliceOutcome::Preempted => "preempted",
            };
            writeln!(
                f,
                "core {} [{:>8.2}, {:>8.2}) job {} {}",
                record.core, record.start, record.end, record.job, outcome
            )?;
        }
        Ok(())
    }
}
