/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Ping scheduling.
//!
//! This module tracks the keep-alive round trip:
//! - The deadline armed when a current-time request goes out
//! - The idle deadline armed when the reply comes back
//! - The round-trip time of the last successful ping

use gatelink_core::types::Timestamp;
use std::time::Duration;

/// Computes ping deadlines from the session clock.
#[derive(Debug, Clone)]
pub struct PingSchedule {
    /// Time allowed for the reply.
    timeout: Duration,
    /// Time between a reply and the next ping.
    interval: Duration,
    /// When the outstanding ping was sent.
    sent_at: Option<Timestamp>,
    /// When the last reply arrived.
    last_reply: Option<Timestamp>,
    /// Round-trip time of the last successful ping.
    last_round_trip: Option<Duration>,
    /// Number of successful pings.
    completed: u64,
}

impl PingSchedule {
    /// Creates a schedule.
    ///
    /// # Arguments
    /// * `timeout` - Time allowed for a reply
    /// * `interval` - Pause between a reply and the next ping
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            sent_at: None,
            last_reply: None,
            last_round_trip: None,
            completed: 0,
        }
    }

    /// Records a ping sent at `now` and returns its reply deadline.
    pub fn on_ping_sent(&mut self, now: Timestamp) -> Timestamp {
        self.sent_at = Some(now);
        now.plus(self.timeout)
    }

    /// Records a reply received at `now` and returns the next ping deadline.
    ///
    /// Returns `None` if no ping was outstanding.
    pub fn on_reply(&mut self, now: Timestamp) -> Option<Timestamp> {
        let sent_at = self.sent_at.take()?;
        self.last_reply = Some(now);
        self.last_round_trip = Some(now.saturating_duration_since(sent_at));
        self.completed += 1;
        Some(now.plus(self.interval))
    }

    /// Returns true while a ping awaits its reply.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.sent_at.is_some()
    }

    /// Returns the round-trip time of the last successful ping.
    #[must_use]
    pub const fn last_round_trip(&self) -> Option<Duration> {
        self.last_round_trip
    }

    /// Returns when the last reply arrived.
    #[must_use]
    pub const fn last_reply(&self) -> Option<Timestamp> {
        self.last_reply
    }

    /// Returns the number of successful pings.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.completed
    }

    /// Returns the reply timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the ping interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Forgets any outstanding ping.
    pub fn reset(&mut self) {
        self.sent_at = None;
    }
}
