pub mod fifo;
pub mod priq;
pub mod rr;
pub mod sjf;

use std::cmp::Ordering;

use crate::core::{Job, Time};
pub use fifo::FcfsScheduler;
pub use priq::PriorityScheduler;
pub use rr::RoundRobinScheduler;
pub use sjf::SjfScheduler;

/// Contract every scheduling algorithm implements. Both engines drive a
/// policy exclusively through these four calls.
pub trait SchedulingPolicy: Send {
    /// Index into `ready` of the job to dispatch next. `None` only when
    /// `ready` is empty; engines fall back to the head otherwise.
    fn select_next(&mut self, ready: &[Job], now: Time) -> Option<usize>;

    /// Preemption quantum. Zero runs the selected job to completion.
    fn time_slice(&self) -> Time;

    /// Called after every dispatch ends, whether the job finished or was
    /// preempted back to the ready queue.
    fn on_completion_or_preemption(&mut self, _job: &mut Job, _now: Time) {}

    fn name(&self) -> &str;
}

impl<P: SchedulingPolicy + ?Sized> SchedulingPolicy for Box<P> {
    fn select_next(&mut self, ready: &[Job], now: Time) -> Option<usize> {
        (**self).select_next(ready, now)
    }

    fn time_slice(&self) -> Time {
        (**self).time_slice()
    }

    fn on_completion_or_preemption(&mut self, job: &mut Job, now: Time) {
        (**self).on_completion_or_preemption(job, now)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Minimum of `ready` under `primary`, lower id on ties.
pub fn select_min_by<F>(ready: &[Job], mut primary: F) -> Option<usize>
where
    F: FnMut(&Job, &Job) -> Ordering,
{
    ready
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| primary(a, b).then_with(|| a.id().cmp(&b.id())))
        .map(|(idx, _)| idx)
}
