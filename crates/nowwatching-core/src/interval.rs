use nowwatching_config::PollingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollInterval {
    /// Something is playing.
    Fast,
    /// Nothing is playing.
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPolicy {
    pub fast: Duration,
    pub slow: Duration,
}

impl IntervalPolicy {
    pub fn new(fast: Duration, slow: Duration) -> Self {
        Self { fast, slow }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(config.fast_interval(), config.slow_interval())
    }

    pub fn duration(&self, interval: PollInterval) -> Duration {
        match interval {
            PollInterval::Fast => self.fast,
            PollInterval::Slow => self.slow,
        }
    }
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

/// The coordinator's current poll interval. Starts fast.
#[derive(Debug, Clone)]
pub struct IntervalState {
    policy: IntervalPolicy,
    current: PollInterval,
}

impl IntervalState {
    pub fn new(policy: IntervalPolicy) -> Self {
        Self {
            policy,
            current: PollInterval::Fast,
        }
    }

    pub fn current(&self) -> PollInterval {
        self.current
    }

    pub fn duration(&self) -> Duration {
        self.policy.duration(self.current)
    }

    pub fn policy(&self) -> &IntervalPolicy {
        &self.policy
    }

    /// Move to `target`. Returns `true` only when the interval actually changed.
    pub fn switch_to(&mut self, target: PollInterval) -> bool {
        if self.current == target {
            return false;
        }
        self.current = target;
        true
    }
}
