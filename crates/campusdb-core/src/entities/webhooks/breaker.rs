//! Circuit breaker for webhook endpoints.
//!
//! Guards the dispatcher against endpoints that keep failing: after
//! `failure_threshold` consecutive failures the breaker opens and calls are
//! refused for `open_for_ms`, after which trial calls are let through in the
//! half-open state.

use campusdb_commons::now_millis;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the breaker.
    pub failure_threshold: u32,
    /// How long the breaker refuses calls once open, in milliseconds.
    pub open_for_ms: i64,
    /// Successful trial calls required to close again from half-open.
    ///
    /// Known limitation: the half-open success counter restarts on every
    /// recorded call instead of accumulating, so values above 1 never close
    /// the breaker.
    /// TODO: decide whether half-open successes should accumulate across
    /// trial calls before changing this.
    pub recovery_calls: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_for_ms: 30_000,
            recovery_calls: 1,
        }
    }
}

#[derive(Debug)]
enum BreakerState {
    Closed { failures: u32 },
    Open { until_ms: i64 },
    HalfOpen { successes: u32 },
}

/// Per-endpoint circuit breaker.
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
        }
    }

    /// Whether a call may go through right now. An expired open window
    /// transitions the breaker to half-open and admits the trial call.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } => true,
            BreakerState::HalfOpen { .. } => true,
            BreakerState::Open { until_ms } => {
                if now_millis() >= until_ms {
                    *state = BreakerState::HalfOpen { successes: 0 };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } => {
                *state = BreakerState::Closed { failures: 0 };
            }
            BreakerState::HalfOpen { .. } => {
                // The counter restarts on every recorded call rather than
                // accumulating; see BreakerConfig::recovery_calls.
                let successes = 1;
                if successes >= self.config.recovery_calls {
                    *state = BreakerState::Closed { failures: 0 };
                } else {
                    *state = BreakerState::HalfOpen { successes };
                }
            }
            BreakerState::Open { .. } => {}
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.config.failure_threshold {
                    *state = BreakerState::Open {
                        until_ms: now_millis() + self.config.open_for_ms,
                    };
                } else {
                    *state = BreakerState::Closed { failures };
                }
            }
            // A failed trial call reopens the breaker immediately.
            BreakerState::HalfOpen { .. } => {
                *state = BreakerState::Open {
                    until_ms: now_millis() + self.config.open_for_ms,
                };
            }
            BreakerState::Open { .. } => {}
        }
    }
}
