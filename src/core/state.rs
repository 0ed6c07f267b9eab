pub type JobId = u64;
pub type CoreId = usize;
pub type Time = f64;

/// Absorbs floating point drift from repeated slice subtraction. Applies to
/// arrival admission and remaining-time completion checks.
pub const EPSILON: Time = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    New,
    Ready,
    Running,
    Finished,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::New => write!(f, "new"),
            JobState::Ready => write!(f, "ready"),
            JobState::Running => write!(f, "running"),
            JobState::Finished => write!(f, "finished"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    arrival_time: Time,
    burst_time: Time,
    priority: Option<i32>,
    remaining_time: Time,
    state: JobState,
    start_time: Option<Time>,
    finish_time: Option<Time>,
    waiting_time: Time,
    turnaround_time: Time,
    // Arrival, or the end of the last preempted slice
    ready_since: Time,
}

impl Job {
    pub fn new(id: JobId, arrival_time: Time, burst_time: Time) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            priority: None,
            remaining_time: burst_time,
            state: JobState::New,
            start_time: None,
            finish_time: None,
            waiting_time: 0.0,
            turnaround_time: 0.0,
            ready_since: arrival_time,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn burst_time(&self) -> Time {
        self.burst_time
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn remaining_time(&self) -> Time {
        self.remaining_time
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn start_time(&self) -> Option<Time> {
        self.start_time
    }

    pub fn finish_time(&self) -> Option<Time> {
        self.finish_time
    }

    pub fn waiting_time(&self) -> Time {
        self.waiting_time
    }

    pub fn turnaround_time(&self) -> Time {
        self.turnaround_time
    }

    pub fn ready_since(&self) -> Time {
        self.ready_since
    }

    /// Time from arrival to first dispatch.
    pub fn response_time(&self) -> Option<Time> {
        self.start_time.map(|start| start - self.arrival_time)
    }

    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }

    pub(crate) fn admit(&mut self) {
        debug_assert_eq!(
            self.state,
            JobState::New,
            "Job {} admitted twice",
            self.id
        );
        self.state = JobState::Ready;
        self.ready_since = self.arrival_time;
    }

    pub(crate) fn dispatch(&mut self, at: Time) {
        debug_assert_eq!(
            self.state,
            JobState::Ready,
            "Job {} must be Ready before dispatch",
            self.id
        );
        if self.start_time.is_none() {
            self.start_time = Some(at);
        }
        self.state = JobState::Running;
    }

    // Returns true once no work is left. NaN or infinite remaining work
    // counts as none, so a malformed burst cannot keep a job alive.
    pub(crate) fn consume(&mut self, execution: Time) -> bool {
        debug_assert_eq!(self.state, JobState::Running);
        let remaining = self.remaining_time - execution;
        self.remaining_time = if remaining > EPSILON && remaining.is_finite() {
            remaining
        } else {
            0.0
        };
        self.remaining_time == 0.0
    }

    pub(crate) fn preempt(&mut self, at: Time) {
        debug_assert_eq!(
            self.state,
            JobState::Running,
            "Job {} preempted while not running",
            self.id
        );
        self.state = JobState::Ready;
        self.ready_since = at;
    }

    pub(crate) fn finish(&mut self, at: Time) {
        debug_assert_eq!(
            self.state,
            JobState::Running,
            "Job {} must be running before marked finished",
            self.id
        );
        debug_assert!(self.finish_time.is_none());

        self.remaining_time = 0.0;
        self.state = JobState::Finished;
        self.finish_time = Some(at);
        self.turnaround_time = at - self.arrival_time;
        self.waiting_time = self.turnaround_time - self.burst_time;
    }
}

/// Sort key used to build the pending list: arrival first, then id.
pub fn arrival_order(a: &Job, b: &Job) -> std::cmp::Ordering {
    a.arrival_time
        .total_cmp(&b.arrival_time)
        .then_with(|| a.id.cmp(&b.id))
}
