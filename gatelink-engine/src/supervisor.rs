/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Reconnection supervisor.
//!
//! The supervisor builds a fresh session per attempt, drives its poll loop
//! while it stays connected and, once it drops, sleeps and tries again until
//! the attempt budget is spent.

use gatelink_session::clock::Clock;
use gatelink_session::session::Session;
use gatelink_transport::poll::Multiplexer;
use gatelink_transport::traits::{Endpoint, Transport};
use std::time::Duration;
use tracing::info;

/// Default number of connection attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Default pause between attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Reconnection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Gateway to connect to.
    pub endpoint: Endpoint,
    /// Total connection attempts, at least one is always made.
    pub max_attempts: u32,
    /// Pause after a session ends.
    pub retry_interval: Duration,
}

impl SupervisorConfig {
    /// Creates settings with the default attempt budget and interval.
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Sets the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the pause between attempts.
    #[must_use]
    pub const fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

/// Blocks the supervisor between attempts.
pub trait Sleeper {
    /// Sleeps for `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Sleeper backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Result of a supervisor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Connection attempts made.
    pub attempts: u32,
    /// Attempts that reached a connected session.
    pub sessions_established: u32,
}

/// Drives sessions until the attempt budget is spent.
#[derive(Debug)]
pub struct Supervisor<S = ThreadSleeper> {
    config: SupervisorConfig,
    sleeper: S,
}

impl Supervisor<ThreadSleeper> {
    /// Creates a supervisor that sleeps on the current thread.
    #[must_use]
    pub const fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: Sleeper> Supervisor<S> {
    /// Replaces the sleeper.
    #[must_use]
    pub fn with_sleeper<R: Sleeper>(self, sleeper: R) -> Supervisor<R> {
        Supervisor {
            config: self.config,
            sleeper,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Returns the sleeper.
    #[must_use]
    pub const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Runs attempts until the budget is spent.
    ///
    /// `new_session` is called once per attempt with the 1-based attempt
    /// number and must return a session in the Connect phase.
    pub fn run<T, M, C, F>(&mut self, mut new_session: F) -> RunSummary
    where
        T: Transport,
        M: Multiplexer,
        C: Clock,
        F: FnMut(u32) -> Session<T, M, C>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut summary = RunSummary::default();
        info!(endpoint = %self.config.endpoint, max_attempts, "Start of gateway session loop");

        loop {
            summary.attempts += 1;
            info!("Attempt {} of {}", summary.attempts, max_attempts);

            let mut session = new_session(summary.attempts);
            if session.connect(&self.config.endpoint).is_ok() {
                summary.sessions_established += 1;
                while session.is_connected() {
                    session.poll_once();
                }
            }
            drop(session);

            if summary.attempts >= max_attempts {
                break;
            }

            info!(
                "Sleeping {} seconds before next attempt",
                self.config.retry_interval.as_secs()
            );
            self.sleeper.sleep(self.config.retry_interval);
        }

        info!(
            attempts = summary.attempts,
            sessions = summary.sessions_established,
            "End of gateway session loop"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelink_core::event::GatewayEvent;
    use gatelink_core::types::{Instrument, OrderId, OrderIntent, TickerId, Timestamp};
    use gatelink_session::clock::ManualClock;
    use gatelink_session::config::SessionConfig;
    use gatelink_transport::error::TransportError;
    use gatelink_transport::poll::{Interest, Readiness};
    use parking_lot::Mutex;
    use std::io;
    use std::os::fd::RawFd;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Counters {
        connects: u32,
        disconnects: u32,
    }

    /// Transport that accepts or refuses connections per attempt.
    struct ScriptedTransport {
        accept: bool,
        connected: bool,
        counters: Arc<Mutex<Counters>>,
    }

    impl Transport for ScriptedTransport {
        fn connect(&mut self, _endpoint: &Endpoint) -> Result<(), TransportError> {
            self.counters.lock().connects += 1;
            if !self.accept {
                return Err(io::Error::from(io::ErrorKind::ConnectionRefused).into());
            }
            self.connected = true;
            Ok(())
        }

        fn disconnect(&mut self) {
            self.counters.lock().disconnects += 1;
            self.connected = false;
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn handle(&self) -> Option<RawFd> {
            self.connected.then_some(3)
        }

        fn is_outbound_empty(&self) -> bool {
            true
        }

        fn on_readable(&mut self, _events: &mut Vec<GatewayEvent>) -> Result<(), TransportError> {
            Ok(())
        }

        fn on_writable(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn on_errorable(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn request_market_data(
            &mut self,
            _ticker_id: TickerId,
            _instrument: &Instrument,
            _snapshot: bool,
        ) -> Result<(), TransportError> {
            Ok(())
        }

        fn request_current_time(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        fn place_order(
            &mut self,
            _order_id: OrderId,
            _intent: &OrderIntent,
        ) -> Result<(), TransportError> {
            Ok(())
        }

        fn cancel_order(&mut self, _order_id: OrderId) -> Result<(), TransportError> {
            Ok(())
        }
    }

    /// Multiplexer whose wait always fails, ending a session on its first wait.
    struct BrokenMultiplexer;

    impl Multiplexer for BrokenMultiplexer {
        fn wait(
            &mut self,
            _fd: RawFd,
            _interest: Interest,
            _timeout: Option<Duration>,
        ) -> io::Result<Readiness> {
            Err(io::Error::other("wait failed"))
        }
    }

    #[derive(Debug, Default)]
    struct CountingSleeper {
        sleeps: Vec<Duration>,
    }

    impl Sleeper for CountingSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.sleeps.push(duration);
        }
    }

    fn run(
        max_attempts: u32,
        accept: impl Fn(u32) -> bool,
    ) -> (RunSummary, Counters, Vec<Duration>) {
        let counters = Arc::new(Mutex::new(Counters::default()));
        let config = SupervisorConfig::default()
            .with_max_attempts(max_attempts)
            .with_retry_interval(Duration::from_secs(10));
        let mut supervisor = Supervisor::new(config).with_sleeper(CountingSleeper::default());

        let summary = supervisor.run(|attempt| {
            let transport = ScriptedTransport {
                accept: accept(attempt),
                connected: false,
                counters: Arc::clone(&counters),
            };
            Session::new(
                transport,
                BrokenMultiplexer,
                ManualClock::new(Timestamp::from_secs(0)),
                SessionConfig::default(),
            )
        });

        let counters = std::mem::take(&mut *counters.lock());
        (summary, counters, supervisor.sleeper().sleeps.clone())
    }

    #[test]
    fn test_three_refused_attempts() {
        let (summary, counters, sleeps) = run(3, |_| false);

        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.sessions_established, 0);
        assert_eq!(counters.connects, 3);
        assert_eq!(sleeps, vec![Duration::from_secs(10); 2]);
    }

    #[test]
    fn test_sessions_that_drop_are_retried() {
        let (summary, counters, sleeps) = run(3, |_| true);

        assert_eq!(summary.attempts, 3);
        assert_eq!(summary.sessions_established, 3);
        assert_eq!(counters.connects, 3);
        assert_eq!(counters.disconnects, 3);
        assert_eq!(sleeps.len(), 2);
    }

    #[test]
    fn test_mixed_attempts() {
        let (summary, counters, sleeps) = run(4, |attempt| attempt % 2 == 0);

        assert_eq!(summary.attempts, 4);
        assert_eq!(summary.sessions_established, 2);
        assert_eq!(counters.connects, 4);
        assert_eq!(sleeps.len(), 3);
    }

    #[test]
    fn test_single_attempt_never_sleeps() {
        let (summary, _, sleeps) = run(1, |_| false);
        assert_eq!(summary.attempts, 1);
        assert!(sleeps.is_empty());

        let (summary, _, sleeps) = run(0, |_| false);
        assert_eq!(summary.attempts, 1);
        assert!(sleeps.is_empty());
    }

    #[test]
    fn test_supervisor_config_defaults() {
        let config = SupervisorConfig::default();
        assert_eq!(config.max_attempts, 50);
        assert_eq!(config.retry_interval, Duration::from_secs(10));
        assert_eq!(config.endpoint.addr(), "127.0.0.1:4001");
    }
}
