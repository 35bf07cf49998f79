//! A client for sending metrics to [Ganglia][ganglia]'s gmond using the gmetric protocol.
//!
//! [ganglia]: http://ganglia.info/
//!
//! # Usage
//!
//! ```no_run
//! # use std::time::Duration;
//! # use gmetric::{Client, Metric, Slope, ValueType};
//! // First, create a client. A client can send to any number of gmond instances, over UDP or TCP.
//! let mut client = Client::builder()
//!     .with_remote_address("udp://127.0.0.1:8649")
//!     .expect("failed to parse remote address")
//!     .with_host("web0.app.com")
//!     .build();
//!
//! // Connections only need to be opened once, on application startup.
//! client.open().expect("failed to open client");
//!
//! let metric = Metric::new("web_requests", ValueType::Uint32)
//!     .with_title("Number of Web Requests")
//!     .with_units("count")
//!     .with_slope(Slope::Both)
//!     .with_tick_interval(Duration::from_secs(20))
//!     .with_lifetime(Duration::from_secs(24 * 60 * 60));
//!
//! // gmond must know about a metric before it accepts values for it. Metadata only needs to be sent every
//! // `send_metadata_interval`, as configured in `gmond.conf`.
//! client.write_meta(&metric).expect("failed to send metadata");
//! client.write_value(&metric, 1u32).expect("failed to send value");
//!
//! // Close the connections before terminating the application.
//! client.close().expect("failed to close client");
//! ```
//!
//! # Wire format
//!
//! Packets follow the gmond 3.1 XDR layout, so they are understood by unmodified gmond instances. Each call to
//! [`Client::write_meta`] or [`Client::write_value`] encodes a single packet and writes the same bytes to every remote
//! address.
//!
//! # Failure handling
//!
//! Every call is a single attempt. Sending stops at the first remote address that fails, and the error is returned to
//! the caller: nothing is retried, buffered, or sent in the background. No timeouts are imposed either, so a write that
//! blocks on the network blocks the caller.
//!
//! # Defaults
//!
//! The host, spoofed origin, tick interval and lifetime of a [`Metric`] fall back to the [`Defaults`] configured on the
//! client whenever they are left unset.

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod builder;
pub use self::builder::{BuildError, ClientBuilder};

mod client;
pub use self::client::Client;

mod error;
pub use self::error::Error;

mod forwarder;
pub use self::forwarder::RemoteAddr;

mod metric;
pub use self::metric::{Defaults, Metric, Slope, ValueType};

mod value;
pub use self::value::Value;

mod writer;
