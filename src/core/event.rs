use crate::core::{CoreId, JobId, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceOutcome {
    Preempted,
    Finished,
}

/// One contiguous run of a job on a core.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub job: JobId,
    pub core: CoreId,
    pub start: Time,
    pub end: Time,
    pub outcome: SliceOutcome,
}

impl DispatchRecord {
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}
