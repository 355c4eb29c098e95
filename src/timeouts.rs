//! Timeout configuration for strata-link connections and calls.

use std::time::Duration;

/// Timeout configuration for the driver.
///
/// # Examples
///
/// ```rust
/// use strata_link::StrataLinkTimeouts;
/// use std::time::Duration;
///
/// let timeouts = StrataLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(3))
///     .request_timeout_secs(60)
///     .build();
/// assert_eq!(timeouts.request_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct StrataLinkTimeouts {
    /// Maximum time for the TCP + WebSocket handshake.
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Maximum time a call made through the client waits for its response.
    /// Set to 0 to wait until the response arrives or the connection closes.
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Idle interval after which the send task issues a WebSocket Ping.
    /// Set to 0 to disable keep-alive pings.
    /// Default: 10 seconds
    pub keepalive_interval: Duration,

    /// Maximum wait for any inbound frame after a keep-alive Ping.
    /// Set to 0 to disable pong checking.
    /// Default: 5 seconds
    pub pong_timeout: Duration,

    /// Budget for flushing the Close frame during `disconnect()`.
    /// Default: 2 seconds
    pub close_timeout: Duration,
}

impl Default for StrataLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            keepalive_interval: Duration::from_secs(10),
            pong_timeout: Duration::from_secs(5),
            close_timeout: Duration::from_secs(2),
        }
    }
}

impl StrataLinkTimeouts {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> StrataLinkTimeoutsBuilder {
        StrataLinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a server on localhost.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(15),
            pong_timeout: Duration::from_secs(5),
            close_timeout: Duration::from_millis(500),
        }
    }

    /// Long timeouts for high-latency or unreliable networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            keepalive_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(10),
            close_timeout: Duration::from_secs(5),
        }
    }

    /// Check if a duration represents "no timeout" (zero or very large).
    pub fn is_no_timeout(duration: Duration) -> bool {
        duration.is_zero() || duration > Duration::from_secs(86400 * 365)
    }
}

/// Builder for [`StrataLinkTimeouts`].
#[derive(Debug, Clone)]
pub struct StrataLinkTimeoutsBuilder {
    timeouts: StrataLinkTimeouts,
}

impl StrataLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: StrataLinkTimeouts::default(),
        }
    }

    /// Set the handshake timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the handshake timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the per-call response timeout. Zero disables it.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set the per-call response timeout in seconds.
    pub fn request_timeout_secs(self, secs: u64) -> Self {
        self.request_timeout(Duration::from_secs(secs))
    }

    /// Set the keep-alive ping interval. Zero disables pings.
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.timeouts.keepalive_interval = interval;
        self
    }

    /// Set the pong timeout. Zero disables pong checking.
    pub fn pong_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.pong_timeout = timeout;
        self
    }

    /// Set the close-frame flush budget.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.close_timeout = timeout;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> StrataLinkTimeouts {
        self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = StrataLinkTimeouts::default();
        assert_eq!(timeouts.connection_timeout, Duration::from_secs(10));
        assert_eq!(timeouts.request_timeout, Duration::from_secs(30));
        assert_eq!(timeouts.keepalive_interval, Duration::from_secs(10));
        assert_eq!(timeouts.pong_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder() {
        let timeouts = StrataLinkTimeouts::builder()
            .connection_timeout_secs(60)
            .request_timeout(Duration::ZERO)
            .keepalive_interval(Duration::ZERO)
            .build();

        assert_eq!(timeouts.connection_timeout, Duration::from_secs(60));
        assert!(timeouts.request_timeout.is_zero());
        assert!(timeouts.keepalive_interval.is_zero());
    }

    #[test]
    fn test_presets_are_ordered() {
        let fast = StrataLinkTimeouts::fast();
        let relaxed = StrataLinkTimeouts::relaxed();
        assert!(fast.connection_timeout < relaxed.connection_timeout);
        assert!(fast.request_timeout < relaxed.request_timeout);
    }

    #[test]
    fn test_is_no_timeout() {
        assert!(StrataLinkTimeouts::is_no_timeout(Duration::ZERO));
        assert!(StrataLinkTimeouts::is_no_timeout(Duration::MAX));
        assert!(!StrataLinkTimeouts::is_no_timeout(Duration::from_secs(1)));
    }
}
