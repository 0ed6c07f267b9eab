use thiserror::Error;

use crate::core::{JobId, Time};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("{policy} requires a positive quantum, got {quantum}")]
    InvalidQuantum { policy: String, quantum: Time },

    #[error("Aging step must be positive, got {0}")]
    InvalidAgingStep(i64),

    #[error("Worker pool requires at least one core")]
    NoCores,

    #[error("Line {line}: {reason}")]
    InvalidJob { line: usize, reason: String },

    #[error("Duplicate job id {0}")]
    DuplicateJob(JobId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
