pub mod event;
pub mod metrics;
pub mod observer;
pub mod state;

pub use event::{DispatchRecord, SliceOutcome};
pub use metrics::{MetricsCollector, ScheduleResult, SharedMetrics};
pub use observer::Observer;
pub use state::{CoreId, EPSILON, Job, JobId, JobState, Time, arrival_order};
