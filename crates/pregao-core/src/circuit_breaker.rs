use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Externally visible breaker position, used for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive upstream failures that trip the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays open before letting one trial call through.
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        // A full B3 scan issues ~130 calls; a handful of failures in a row
        // means Yahoo is down or blocking us, not that one ticker is delisted.
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { since: Instant },
    /// At most one trial call is in flight; everyone else waits for its verdict.
    HalfOpen { trial: bool },
}

/// Shared by every ticker job of a scan, so one outage stops the whole scan
/// from hammering Yahoo.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    phase: Mutex<Phase>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    fn phase(&self) -> MutexGuard<'_, Phase> {
        self.phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `false` means skip the upstream call entirely.
    pub fn allow_request(&self) -> bool {
        let mut phase = self.phase();
        match *phase {
            Phase::Closed { .. } => true,
            Phase::HalfOpen { trial: true } => false,
            Phase::HalfOpen { trial: false } => {
                *phase = Phase::HalfOpen { trial: true };
                true
            }
            Phase::Open { since } if since.elapsed() >= self.config.open_timeout => {
                tracing::debug!("circuit half-open, sending a trial call to yahoo");
                *phase = Phase::HalfOpen { trial: true };
                true
            }
            Phase::Open { .. } => false,
        }
    }

    /// Admission for one upstream call that must end in a verdict.
    ///
    /// A permit dropped without [`Permit::succeed`] or [`Permit::fail`] (a
    /// cancelled call, an early return) gives the half-open trial slot back
    /// instead of leaving the breaker waiting forever.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        self.allow_request().then_some(Permit {
            breaker: self,
            settled: false,
        })
    }

    fn release_trial(&self) {
        let mut phase = self.phase();
        if matches!(*phase, Phase::HalfOpen { trial: true }) {
            *phase = Phase::HalfOpen { trial: false };
        }
    }

    pub fn record_success(&self) {
        let mut phase = self.phase();
        if !matches!(*phase, Phase::Closed { .. }) {
            tracing::info!("circuit closed, yahoo answering again");
        }
        *phase = Phase::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut phase = self.phase();
        let next = match *phase {
            Phase::Closed { failures } => {
                let failures = failures.saturating_add(1);
                if failures >= self.config.failure_threshold {
                    tracing::warn!(failures, "circuit opened after consecutive yahoo failures");
                    Phase::Open {
                        since: Instant::now(),
                    }
                } else {
                    Phase::Closed { failures }
                }
            }
            Phase::HalfOpen { .. } => {
                tracing::warn!("trial call failed, circuit open again");
                Phase::Open {
                    since: Instant::now(),
                }
            }
            open @ Phase::Open { .. } => open,
        };
        *phase = next;
    }

    pub fn state(&self) -> CircuitState {
        match *self.phase() {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[must_use = "an unsettled permit only releases the trial slot"]
#[derive(Debug)]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl Permit<'_> {
    pub fn succeed(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn fail(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release_trial();
        }
    }
}
