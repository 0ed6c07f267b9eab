pub mod config;
pub mod core;
pub mod error;
pub mod report;
pub mod scheduler;
pub mod sim;
pub mod workload;

pub use config::{EngineKind, PolicyKind, SimConfig};
pub use crate::core::{Job, JobId, JobState, ScheduleResult, Time};
pub use error::{Result, SimError};
pub use scheduler::SchedulingPolicy;
pub use sim::{Pacing, SequentialEngine, WorkerPool, simulate};
