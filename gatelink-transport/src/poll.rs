/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Single-descriptor readiness waiting.
//!
//! The session drives one socket, so the multiplexer waits on exactly one
//! descriptor. [`PollMultiplexer`] is the `poll(2)` implementation; tests
//! substitute scripted readiness through the [`Multiplexer`] trait.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

/// Conditions the caller wants to be woken for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interest {
    /// Wake when the descriptor is readable.
    pub read: bool,
    /// Wake when the descriptor is writable.
    pub write: bool,
}

impl Interest {
    /// Read interest only.
    pub const READ: Self = Self {
        read: true,
        write: false,
    };

    /// Read and write interest.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
    };
}

/// Conditions reported by a wait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Data (or end of stream) is available.
    pub readable: bool,
    /// The send buffer has room.
    pub writable: bool,
    /// The descriptor is in an error state.
    pub errored: bool,
}

impl Readiness {
    /// Returns true if no condition fired.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.readable && !self.writable && !self.errored
    }
}

/// Waits for readiness on a single descriptor.
pub trait Multiplexer {
    /// Blocks until `fd` matches `interest` or the timeout elapses.
    ///
    /// `None` waits indefinitely. A zero timeout polls without blocking.
    ///
    /// # Errors
    /// Returns an I/O error if the underlying wait fails.
    fn wait(
        &mut self,
        fd: RawFd,
        interest: Interest,
        timeout: Option<Duration>,
    ) -> io::Result<Readiness>;
}

/// `poll(2)` based multiplexer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PollMultiplexer;

impl PollMultiplexer {
    /// Creates a new multiplexer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Converts a timeout to whole milliseconds, rounding up.
fn timeout_millis(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(timeout) => {
            let nanos = timeout.as_nanos();
            let millis = nanos.div_ceil(1_000_000);
            libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX)
        }
    }
}

impl Multiplexer for PollMultiplexer {
    fn wait(
        &mut self,
        fd: RawFd,
        interest: Interest,
        timeout: Option<Duration>,
    ) -> io::Result<Readiness> {
        let mut events: libc::c_short = 0;
        if interest.read {
            events |= libc::POLLIN;
        }
        if interest.write {
            events |= libc::POLLOUT;
        }

        let mut pollfd = libc::pollfd {
            fd,
            events,
            revents: 0,
        };

        // SAFETY: `pollfd` is a valid, exclusively borrowed array of length 1
        // for the duration of the call.
        let rc = unsafe { libc::poll(&mut pollfd, 1, timeout_millis(timeout)) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Readiness::default());
            }
            return Err(err);
        }

        let revents = pollfd.revents;
        Ok(Readiness {
            readable: revents & (libc::POLLIN | libc::POLLHUP) != 0,
            writable: revents & libc::POLLOUT != 0,
            errored: revents & (libc::POLLERR | libc::POLLNVAL) != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::os::fd::AsRawFd;

    #[test]
    fn test_timeout_millis() {
        assert_eq!(timeout_millis(None), -1);
        assert_eq!(timeout_millis(Some(Duration::ZERO)), 0);
        assert_eq!(timeout_millis(Some(Duration::from_micros(1))), 1);
        assert_eq!(timeout_millis(Some(Duration::from_millis(1500))), 1500);
    }

    #[test]
    fn test_readiness_is_empty() {
        assert!(Readiness::default().is_empty());
        assert!(
            !Readiness {
                readable: true,
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_poll_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (mut server, _) = listener.accept().unwrap();
        let mut mux = PollMultiplexer::new();

        let ready = mux
            .wait(client.as_raw_fd(), Interest::READ, Some(Duration::ZERO))
            .unwrap();
        assert!(!ready.readable);

        let ready = mux
            .wait(
                client.as_raw_fd(),
                Interest::READ_WRITE,
                Some(Duration::from_millis(100)),
            )
            .unwrap();
        assert!(ready.writable);

        server.write_all(b"ping").unwrap();
        let ready = mux
            .wait(client.as_raw_fd(), Interest::READ, Some(Duration::from_secs(2)))
            .unwrap();
        assert!(ready.readable);
    }
}
