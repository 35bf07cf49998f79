use std::time::Duration;

use thiserror::Error;

use crate::{client::Client, forwarder::RemoteAddr, metric::Defaults};

/// Errors that could occur while building a gmetric client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to parse the remote address.
    #[error("invalid remote address: {reason}")]
    InvalidRemoteAddress {
        /// Details about the parsing failure.
        reason: String,
    },
}

/// Builder for a gmetric [`Client`].
#[derive(Clone, Debug, Default)]
pub struct ClientBuilder {
    remote_addrs: Vec<RemoteAddr>,
    defaults: Defaults,
}

impl ClientBuilder {
    /// Adds a remote address to send packets to.
    ///
    /// The address needs to be in the format of `<scheme>://<host>:<port>`, where the scheme is either `udp` or `tcp`.
    /// When the scheme is omitted, UDP is used. The host is only resolved when the client is opened.
    ///
    /// Every remote address gets its own connection, and every packet is sent to all of them.
    ///
    /// # Errors
    ///
    /// If the given address is not able to be parsed as a valid address, an error will be returned indicating the
    /// reason.
    pub fn with_remote_address<A>(mut self, addr: A) -> Result<Self, BuildError>
    where
        A: AsRef<str>,
    {
        let remote_addr = RemoteAddr::try_from(addr.as_ref())
            .map_err(|reason| BuildError::InvalidRemoteAddress { reason })?;
        self.remote_addrs.push(remote_addr);
        Ok(self)
    }

    /// Adds an already-typed remote address to send packets to.
    #[must_use]
    pub fn with_socket_address<A>(mut self, addr: A) -> Self
    where
        A: Into<RemoteAddr>,
    {
        self.remote_addrs.push(addr.into());
        self
    }

    /// Sets the default origin host for metrics that do not specify one.
    #[must_use]
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.defaults.host = host.into();
        self
    }

    /// Sets the default spoofed origin, in `ip:hostname` form, for metrics that do not specify one.
    ///
    /// When set, gmond records metrics as coming from the spoofed host rather than from the sender's address.
    #[must_use]
    pub fn with_spoof<S: Into<String>>(mut self, spoof: S) -> Self {
        self.defaults.spoof = spoof.into();
        self
    }

    /// Sets the default reporting period for metrics that do not specify one.
    ///
    /// Sent as the maximum expected time between updates, in whole seconds.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.defaults.tick_interval = tick_interval;
        self
    }

    /// Sets the default lifetime for metrics that do not specify one.
    ///
    /// gmond keeps displaying a metric for this long after its last update. Sent in whole seconds; zero means forever.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.defaults.lifetime = lifetime;
        self
    }

    /// Builds the client.
    ///
    /// The client must be opened with [`Client::open`] before any metrics can be written.
    pub fn build(self) -> Client {
        Client::new(self.remote_addrs, self.defaults)
    }
}
