use tracing::{debug, trace};

use crate::{
    builder::ClientBuilder,
    error::Error,
    forwarder::{
        sync::{connect_all, send_all, Connection},
        RemoteAddr,
    },
    metric::{Defaults, Metric},
    value::Value,
    writer::{encode_metadata, encode_value},
};

enum ClientState {
    // Never opened.
    Idle,

    // Connected to every remote address.
    Open(Vec<Connection>),

    // Closed, and not reusable.
    Closed,
}

/// A client that sends gmetric packets to one or more gmond instances.
///
/// Clients are created unopened, via [`Client::builder`]. [`Client::open`] establishes one connection per remote
/// address, after which metadata and values can be written any number of times. [`Client::close`] tears the
/// connections down for good: a closed client cannot be reopened.
///
/// Writes take `&self` and never change the set of connections, so an open client can be shared between threads.
/// However, writes to TCP destinations are not serialized: two threads writing at once can interleave the bytes of
/// their packets on the stream, corrupting it. Callers sharing a client with TCP destinations must serialize their
/// writes, for example behind a `Mutex`.
pub struct Client {
    remote_addrs: Vec<RemoteAddr>,
    defaults: Defaults,
    state: ClientState,
}

impl Client {
    pub(crate) fn new(remote_addrs: Vec<RemoteAddr>, defaults: Defaults) -> Self {
        Client { remote_addrs, defaults, state: ClientState::Idle }
    }

    /// Creates a [`ClientBuilder`] for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Returns the configured remote addresses.
    pub fn remote_addrs(&self) -> &[RemoteAddr] {
        &self.remote_addrs
    }

    /// Returns the defaults applied to metrics with unset fields.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Returns a mutable reference to the defaults applied to metrics with unset fields.
    pub fn defaults_mut(&mut self) -> &mut Defaults {
        &mut self.defaults
    }

    /// Returns `true` if the client is open.
    pub fn is_open(&self) -> bool {
        matches!(self.state, ClientState::Open(_))
    }

    /// Opens a connection to every remote address.
    ///
    /// # Errors
    ///
    /// If no remote addresses are configured, or the client is already open or was closed, an error is returned. If
    /// any remote address cannot be resolved or connected to, connections opened so far are closed and the error is
    /// returned, leaving the client unopened.
    pub fn open(&mut self) -> Result<(), Error> {
        if self.remote_addrs.is_empty() {
            return Err(Error::NoAddrs);
        }

        match self.state {
            ClientState::Idle => {}
            ClientState::Open(_) => return Err(Error::AlreadyOpened),
            ClientState::Closed => return Err(Error::Closed),
        }

        let connections = connect_all(&self.remote_addrs)?;
        debug!(connections = connections.len(), "Opened client.");

        self.state = ClientState::Open(connections);
        Ok(())
    }

    /// Closes every connection.
    ///
    /// # Errors
    ///
    /// If no remote addresses are configured, or the client was never opened or is already closed, an error is
    /// returned.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.remote_addrs.is_empty() {
            return Err(Error::NoAddrs);
        }

        match std::mem::replace(&mut self.state, ClientState::Closed) {
            ClientState::Open(connections) => {
                debug!(connections = connections.len(), "Closing client.");
                drop(connections);
                Ok(())
            }
            ClientState::Idle => {
                self.state = ClientState::Idle;
                Err(Error::NotOpened)
            }
            ClientState::Closed => Err(Error::Closed),
        }
    }

    fn connections(&self) -> Result<&[Connection], Error> {
        match &self.state {
            ClientState::Open(connections) => Ok(connections),
            ClientState::Idle => Err(Error::NotOpened),
            ClientState::Closed => Err(Error::Closed),
        }
    }

    /// Sends the metadata packet for `metric` to every remote address.
    ///
    /// gmond needs the metadata of a metric before it accepts values for it, and forgets it on restart, so metadata
    /// should be re-sent periodically (see `send_metadata_interval` in `gmond.conf`).
    ///
    /// # Errors
    ///
    /// If the client is not open, or the metric has no name or value type, an error is returned and nothing is sent. If
    /// writing to a remote address fails, the error is returned and the remaining remote addresses are skipped.
    pub fn write_meta(&self, metric: &Metric) -> Result<(), Error> {
        let connections = self.connections()?;
        let payload = encode_metadata(metric, &self.defaults)?;

        trace!(metric = %metric.name, len = payload.len(), "Sending metadata packet.");
        send_all(connections, &payload)
    }

    /// Sends a value packet for `metric` to every remote address.
    ///
    /// # Errors
    ///
    /// If the client is not open, the metric has no name or value type, or the value does not fit the metric's value
    /// type, an error is returned and nothing is sent. If writing to a remote address fails, the error is returned and
    /// the remaining remote addresses are skipped.
    pub fn write_value<V>(&self, metric: &Metric, value: V) -> Result<(), Error>
    where
        V: Into<Value>,
    {
        let connections = self.connections()?;
        let payload = encode_value(metric, &self.defaults, &value.into())?;

        trace!(metric = %metric.name, len = payload.len(), "Sending value packet.");
        send_all(connections, &payload)
    }
}

#[cfg(test)]
mod tests {
    use std::{net::UdpSocket, time::Duration};

    use super::Client;
    use crate::{
        error::Error,
        metric::{Metric, Slope, ValueType},
    };

    const ALL_VALUE_TYPES: [ValueType; 9] = [
        ValueType::Uint8,
        ValueType::Int8,
        ValueType::Uint16,
        ValueType::Int16,
        ValueType::Uint32,
        ValueType::Int32,
        ValueType::Float32,
        ValueType::Float64,
        ValueType::String,
    ];

    fn open_client(receiver: &UdpSocket) -> Client {
        let mut client = Client::builder().with_socket_address(receiver.local_addr().unwrap()).build();
        client.open().unwrap();
        client
    }

    #[test]
    fn no_addrs() {
        let mut client = Client::builder().build();
        assert!(matches!(client.open(), Err(Error::NoAddrs)));
        assert!(matches!(client.close(), Err(Error::NoAddrs)));
        assert!(!client.is_open());
    }

    #[test]
    fn not_opened() {
        let client = Client::builder().with_remote_address("127.0.0.1:8649").unwrap().build();
        let metric = Metric::new("string_metric", ValueType::String).with_host("localhost");

        assert!(matches!(client.write_meta(&metric), Err(Error::NotOpened)));
        assert!(matches!(client.write_value(&metric, "val"), Err(Error::NotOpened)));
    }

    #[test]
    fn close_before_open() {
        let mut client = Client::builder().with_remote_address("127.0.0.1:8649").unwrap().build();
        assert!(matches!(client.close(), Err(Error::NotOpened)));

        // The failed close must not have consumed the client.
        client.open().unwrap();
        client.close().unwrap();
    }

    #[test]
    fn lifecycle() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut client = open_client(&receiver);
        let metric = Metric::new("m", ValueType::Uint8).with_host("localhost");

        assert!(client.is_open());
        assert!(matches!(client.open(), Err(Error::AlreadyOpened)));

        client.write_meta(&metric).unwrap();
        client.write_value(&metric, 1u8).unwrap();
        client.write_value(&metric, 2u8).unwrap();
        client.close().unwrap();

        assert!(!client.is_open());
        assert!(matches!(client.write_meta(&metric), Err(Error::Closed)));
        assert!(matches!(client.write_value(&metric, 1u8), Err(Error::Closed)));
        assert!(matches!(client.open(), Err(Error::Closed)));
        assert!(matches!(client.close(), Err(Error::Closed)));
    }

    #[test]
    fn no_name() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let client = open_client(&receiver);

        for value_type in ALL_VALUE_TYPES {
            let metric = Metric { value_type: Some(value_type), ..Default::default() };
            assert!(matches!(client.write_meta(&metric), Err(Error::NoName)), "{value_type}");
            assert!(matches!(client.write_value(&metric, "val"), Err(Error::NoName)), "{value_type}");
        }

        let metric = Metric::default();
        assert!(matches!(client.write_meta(&metric), Err(Error::NoName)));
        assert!(matches!(client.write_value(&metric, "val"), Err(Error::NoName)));
    }

    #[test]
    fn no_value_type() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let client = open_client(&receiver);

        let metric = Metric { name: "no_value_type_metric".to_string(), ..Default::default() };
        assert!(matches!(client.write_meta(&metric), Err(Error::NoValueType)));
        assert!(matches!(client.write_value(&metric, "val"), Err(Error::NoValueType)));
    }

    #[test]
    fn validation_failures_send_nothing() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_nonblocking(true).unwrap();
        let client = open_client(&receiver);

        let metric = Metric::new("uint8_metric", ValueType::Uint8)
            .with_units("count")
            .with_slope(Slope::Both)
            .with_tick_interval(Duration::from_secs(20));

        let result = client.write_value(&metric, 300u32);
        assert!(matches!(result, Err(Error::ValueOutOfRange { .. })));
        assert!(result.unwrap_err().is_validation());

        let mut buf = [0u8; 512];
        assert!(receiver.recv(&mut buf).is_err(), "nothing should have been sent");
    }

    #[test]
    fn defaults_can_change_after_build() {
        let mut client = Client::builder().build();
        client.defaults_mut().lifetime = Duration::from_secs(86400);
        assert_eq!(client.defaults().lifetime, Duration::from_secs(86400));
    }

    #[test]
    fn client_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }

    #[test]
    fn error_classes() {
        assert!(Error::NoAddrs.is_config());
        assert!(Error::NotOpened.is_config());
        assert!(Error::NoName.is_validation());
        assert!(!Error::NoName.is_transport());
    }
}
