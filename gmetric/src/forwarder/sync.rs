use std::{
    io::{self, Write as _},
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, UdpSocket},
};

use tracing::{debug, trace};

use crate::error::Error;

use super::RemoteAddr;

/// A destination that encoded packets can be written to.
pub(crate) trait Transport {
    /// Returns a description of the remote end, used when reporting errors.
    fn peer(&self) -> String;

    /// Writes the full payload to the remote end.
    fn send(&self, payload: &[u8]) -> io::Result<()>;
}

enum Socket {
    Udp(UdpSocket),
    Tcp(TcpStream),
}

/// A live connection to a single destination.
pub(crate) struct Connection {
    remote_addr: RemoteAddr,
    socket: Socket,
}

impl Connection {
    /// Connects to the given remote address.
    ///
    /// For UDP, this binds an ephemeral local socket and fixes its peer, which involves no network traffic. For TCP, a
    /// full connection is established.
    pub fn connect(remote_addr: &RemoteAddr) -> io::Result<Self> {
        let addrs = remote_addr.resolve()?;

        let socket = match remote_addr {
            RemoteAddr::Udp(_) => connect_udp(&addrs).map(Socket::Udp)?,
            RemoteAddr::Tcp(_) => TcpStream::connect(&addrs[..]).map(Socket::Tcp)?,
        };

        Ok(Connection { remote_addr: remote_addr.clone(), socket })
    }
}

/// Connects a datagram socket to the first of `addrs` that accepts it.
///
/// Each candidate gets a socket bound in its own address family, so a host that resolves to an unreachable IPv6
/// address first can still be reached over IPv4.
fn connect_udp(addrs: &[SocketAddr]) -> io::Result<UdpSocket> {
    let mut last_err = None;

    for addr in addrs {
        let local: SocketAddr =
            if addr.is_ipv4() { (Ipv4Addr::UNSPECIFIED, 0).into() } else { (Ipv6Addr::UNSPECIFIED, 0).into() };

        match UdpSocket::bind(local).and_then(|socket| socket.connect(addr).map(|()| socket)) {
            Ok(socket) => return Ok(socket),
            Err(e) => {
                trace!(peer = %addr, error = %e, "Failed to connect datagram socket, trying next address.");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no addresses to connect to")))
}

impl Transport for Connection {
    fn peer(&self) -> String {
        self.remote_addr.to_string()
    }

    fn send(&self, payload: &[u8]) -> io::Result<()> {
        match &self.socket {
            Socket::Udp(socket) => {
                let sent = socket.send(payload)?;
                if sent == payload.len() {
                    Ok(())
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("sent {sent} of {} bytes in datagram", payload.len()),
                    ))
                }
            }
            Socket::Tcp(stream) => {
                let mut stream = stream;
                stream.write_all(payload)
            }
        }
    }
}

/// Opens a connection to every remote address.
///
/// If any address fails, the connections opened so far are closed and the error is returned.
pub(crate) fn connect_all(remote_addrs: &[RemoteAddr]) -> Result<Vec<Connection>, Error> {
    let mut connections = Vec::with_capacity(remote_addrs.len());

    for remote_addr in remote_addrs {
        match Connection::connect(remote_addr) {
            Ok(connection) => {
                debug!(remote = %remote_addr, transport = remote_addr.transport_id(), "Opened connection.");
                connections.push(connection);
            }
            Err(e) => {
                debug!(
                    remote = %remote_addr,
                    error = %e,
                    opened = connections.len(),
                    "Failed to open connection, closing connections opened so far."
                );
                drop(connections);

                return Err(Error::Connect { remote: remote_addr.to_string(), source: e });
            }
        }
    }

    Ok(connections)
}

/// Writes the same payload to every transport, in order.
///
/// The first failing transport aborts the call: transports after it are not written to.
pub(crate) fn send_all<T: Transport>(transports: &[T], payload: &[u8]) -> Result<(), Error> {
    for transport in transports {
        if let Err(e) = transport.send(payload) {
            debug!(remote = %transport.peer(), error = %e, "Failed to send payload.");
            return Err(Error::Write { remote: transport.peer(), source: e });
        }

        trace!(remote = %transport.peer(), len = payload.len(), "Sent payload.");
    }

    Ok(())
}
