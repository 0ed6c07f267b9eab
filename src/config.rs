use crate::core::Time;
use crate::error::{Result, SimError};
use crate::scheduler::{
    FcfsScheduler, PriorityScheduler, RoundRobinScheduler, SchedulingPolicy, SjfScheduler,
};
use crate::sim::Pacing;

pub const DEFAULT_QUANTUM: Time = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    Fcfs,
    Sjf,
    RoundRobin,
    Priority,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::Fcfs => write!(f, "fcfs"),
            PolicyKind::Sjf => write!(f, "sjf"),
            PolicyKind::RoundRobin => write!(f, "rr"),
            PolicyKind::Priority => write!(f, "priority"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Deterministic discrete-event engine, always one core.
    Sequential,
    /// One thread per simulated core.
    Pool,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub cores: usize,
    pub policy: PolicyKind,
    /// Used by round robin and aging priority; ignored otherwise.
    pub quantum: Time,
    /// Enables aging for the priority policy.
    pub aging_step: Option<i64>,
    /// `None` picks the sequential engine for one core and the pool otherwise.
    pub engine: Option<EngineKind>,
    pub pacing: Pacing,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cores: 1,
            policy: PolicyKind::Fcfs,
            quantum: DEFAULT_QUANTUM,
            aging_step: None,
            engine: None,
            pacing: Pacing::Virtual,
        }
    }
}

impl SimConfig {
    pub fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    pub fn with_quantum(mut self, quantum: Time) -> Self {
        self.quantum = quantum;
        self
    }

    pub fn with_aging(mut self, step: i64) -> Self {
        self.aging_step = Some(step);
        self
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn engine(&self) -> EngineKind {
        self.engine.unwrap_or(if self.cores > 1 {
            EngineKind::Pool
        } else {
            EngineKind::Sequential
        })
    }

    fn needs_quantum(&self) -> bool {
        match self.policy {
            PolicyKind::RoundRobin => true,
            PolicyKind::Priority => self.aging_step.is_some(),
            PolicyKind::Fcfs | PolicyKind::Sjf => false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cores == 0 {
            return Err(SimError::NoCores);
        }
        // Written to also reject NaN
        if self.needs_quantum() && !(self.quantum > 0.0) {
            return Err(SimError::InvalidQuantum {
                policy: self.policy.to_string(),
                quantum: self.quantum,
            });
        }
        if let Some(step) = self.aging_step {
            if step <= 0 {
                return Err(SimError::InvalidAgingStep(step));
            }
        }
        if self.engine == Some(EngineKind::Sequential) && self.cores > 1 {
            log::warn!(
                "Sequential engine simulates one core, ignoring cores={}",
                self.cores
            );
        }
        Ok(())
    }

    pub fn build_policy(&self) -> Result<Box<dyn SchedulingPolicy>> {
        self.validate()?;
        Ok(match (self.policy, self.aging_step) {
            (PolicyKind::Fcfs, _) => Box::new(FcfsScheduler::new()),
            (PolicyKind::Sjf, _) => Box::new(SjfScheduler::new()),
            (PolicyKind::RoundRobin, _) => Box::new(RoundRobinScheduler::new(self.quantum)),
            (PolicyKind::Priority, None) => Box::new(PriorityScheduler::new()),
            (PolicyKind::Priority, Some(step)) => {
                Box::new(PriorityScheduler::with_aging(self.quantum, step))
            }
        })
    }
}
