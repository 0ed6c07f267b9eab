//! Job sources: a plain-text job list and a seeded random generator.
//!
//! The text format is one job per line, `id arrival burst [priority]`,
//! separated by whitespace or commas. Blank lines and `#` comments are
//! skipped.

use std::path::Path;

use rand::prelude::*;
use rustc_hash::FxHashSet;

use crate::core::{Job, JobId, Time};
use crate::error::{Result, SimError};

pub fn load_jobs(path: impl AsRef<Path>) -> Result<Vec<Job>> {
    let text = std::fs::read_to_string(path)?;
    parse_jobs(&text)
}

pub fn parse_jobs(text: &str) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();
    let mut ids = FxHashSet::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if !(3..=4).contains(&fields.len()) {
            return Err(invalid(
                line,
                format!("expected `id arrival burst [priority]`, got {} fields", fields.len()),
            ));
        }

        let id: JobId = fields[0]
            .parse()
            .map_err(|_| invalid(line, format!("bad id {:?}", fields[0])))?;
        let arrival: Time = fields[1]
            .parse()
            .map_err(|_| invalid(line, format!("bad arrival time {:?}", fields[1])))?;
        let burst: Time = fields[2]
            .parse()
            .map_err(|_| invalid(line, format!("bad burst time {:?}", fields[2])))?;

        if !arrival.is_finite() || arrival < 0.0 {
            return Err(invalid(line, format!("arrival time must be >= 0, got {arrival}")));
        }
        if !burst.is_finite() || burst <= 0.0 {
            return Err(invalid(line, format!("burst time must be > 0, got {burst}")));
        }
        if !ids.insert(id) {
            return Err(SimError::DuplicateJob(id));
        }

        let mut job = Job::new(id, arrival, burst);
        if let Some(raw_priority) = fields.get(3) {
            let priority: i32 = raw_priority
                .parse()
                .map_err(|_| invalid(line, format!("bad priority {raw_priority:?}")))?;
            job = job.with_priority(priority);
        }
        jobs.push(job);
    }

    Ok(jobs)
}

fn invalid(line: usize, reason: String) -> SimError {
    SimError::InvalidJob { line, reason }
}

/// Each tick, a job arrives with probability `p_arrival`; it is short with
/// probability `p_short`. Priorities are drawn from `0..8`.
pub fn bernoulli_jobs(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Time,
    long_ticks: Time,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            let priority = rng.random_range(0..8);
            jobs.push(Job::new(jobs.len() as JobId + 1, t as Time, burst).with_priority(priority));
        }
    }

    jobs
}
