use std::{
    fmt, io,
    net::{SocketAddr, ToSocketAddrs as _},
};

pub mod sync;

/// A destination that packets are sent to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RemoteAddr {
    /// A gmond UDP channel, in `<host>:<port>` form.
    Udp(String),

    /// A gmond TCP channel, in `<host>:<port>` form.
    Tcp(String),
}

impl RemoteAddr {
    /// Returns the transport ID for the remote address.
    ///
    /// This is a simple acronym related to the transport that will be used for the remote address, such as `udp` for
    /// UDP, and so on.
    pub const fn transport_id(&self) -> &'static str {
        match self {
            RemoteAddr::Udp(_) => "udp",
            RemoteAddr::Tcp(_) => "tcp",
        }
    }

    /// Returns the `<host>:<port>` part of the address.
    pub fn host_port(&self) -> &str {
        match self {
            RemoteAddr::Udp(addr) | RemoteAddr::Tcp(addr) => addr,
        }
    }

    /// Resolves the address to the socket addresses it refers to.
    pub(crate) fn resolve(&self) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = self.host_port().to_socket_addrs()?.collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("'{}' did not resolve to any address", self.host_port()),
            ));
        }

        Ok(addrs)
    }
}

impl From<SocketAddr> for RemoteAddr {
    fn from(addr: SocketAddr) -> Self {
        RemoteAddr::Udp(addr.to_string())
    }
}

impl<'a> TryFrom<&'a str> for RemoteAddr {
    type Error = String;

    fn try_from(addr: &'a str) -> Result<Self, Self::Error> {
        let (scheme, host_port) = match addr.split_once("://") {
            Some((scheme, host_port)) => (scheme, host_port),
            None => ("udp", addr),
        };

        validate_host_port(host_port)?;

        match scheme {
            "udp" => Ok(RemoteAddr::Udp(host_port.to_string())),
            "tcp" => Ok(RemoteAddr::Tcp(host_port.to_string())),
            _ => Err(format!("invalid scheme '{scheme}' (expected 'udp' or 'tcp')")),
        }
    }
}

fn validate_host_port(host_port: &str) -> Result<(), String> {
    let Some((host, port)) = host_port.rsplit_once(':') else {
        return Err(format!("missing port in '{host_port}'"));
    };

    if host.is_empty() {
        return Err(format!("missing host in '{host_port}'"));
    }

    port.parse::<u16>().map(|_| ()).map_err(|e| format!("invalid port '{port}': {e}"))
}

impl fmt::Display for RemoteAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.transport_id(), self.host_port())
    }
}
