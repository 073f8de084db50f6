//! Blocking poll loop that waits for a remote lifecycle state.
//!
//! The waiter probes the remote state, sleeps, and probes again with a capped exponential
//! interval. Sleeps never extend past the caller's deadline, so a wait returns no later than
//! one probe round-trip after the timeout elapses. Time is read through [`Clock`] so tests can
//! drive the loop without sleeping.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::HandleError;

/// Default upper bound for waits that do not name one.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Floor applied to every poll interval, whatever the policy says.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time source and sleeper used by [`StateWaiter`].
pub trait Clock: Send + Sync {
    /// Monotonic time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Polling interval schedule. Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Interval before the second probe.
    pub initial_interval: Duration,
    /// Interval ceiling.
    pub max_interval: Duration,
    /// Growth factor applied after each probe.
    pub multiplier: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(200),
            max_interval: Duration::from_secs(2),
            multiplier: 2,
        }
    }
}

impl PollPolicy {
    /// Fixed-interval schedule.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1,
        }
    }

    fn first_interval(&self) -> Duration {
        self.initial_interval.max(MIN_POLL_INTERVAL)
    }

    fn next_interval(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.multiplier.max(1))
            .min(self.max_interval)
            .max(MIN_POLL_INTERVAL)
    }
}

/// Something whose remote state can be observed.
pub trait StateProbe {
    /// Name used in errors and logs.
    fn subject(&self) -> String;

    /// Fetches the current remote state.
    fn observe_state(&self) -> Result<String, HandleError>;

    /// Whether `state` can never change again.
    fn is_terminal(&self, state: &str) -> bool;
}

/// Polls a [`StateProbe`] until it reaches a target state.
#[derive(Clone)]
pub struct StateWaiter {
    policy: PollPolicy,
    clock: Arc<dyn Clock>,
}

impl Default for StateWaiter {
    fn default() -> Self {
        Self::new(PollPolicy::default(), Arc::new(SystemClock::new()))
    }
}

impl StateWaiter {
    pub fn new(policy: PollPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    /// Blocks until `probe` reports `target`, a different terminal state, or `timeout` elapses.
    ///
    /// The state is probed at least once, so a zero timeout still succeeds when the target
    /// has already been reached.
    pub fn wait(
        &self,
        probe: &dyn StateProbe,
        target: &str,
        timeout: Duration,
    ) -> Result<(), HandleError> {
        let started = self.clock.now();
        let mut interval = self.policy.first_interval();
        let mut probes: u32 = 0;

        loop {
            let observed = probe.observe_state()?;
            probes = probes.saturating_add(1);
            tracing::debug!(
                subject = %probe.subject(),
                observed = %observed,
                target,
                probes,
                "polled remote state"
            );

            if observed == target {
                return Ok(());
            }

            if probe.is_terminal(&observed) {
                return Err(HandleError::UnexpectedTerminalState {
                    subject: probe.subject(),
                    target: target.to_string(),
                    observed,
                });
            }

            let waited = self.clock.now().saturating_sub(started);
            if waited >= timeout {
                return Err(HandleError::Timeout {
                    subject: probe.subject(),
                    target: target.to_string(),
                    observed,
                    waited_ms: waited.as_millis().try_into().unwrap_or(u64::MAX),
                });
            }

            self.clock.sleep(interval.min(timeout - waited));
            interval = self.policy.next_interval(interval);
        }
    }
}
