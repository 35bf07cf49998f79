use std::io;

use thiserror::Error as ThisError;

use crate::metric::ValueType;

/// Errors that could occur while opening, writing to, or closing a [`Client`][crate::Client].
#[derive(Debug, ThisError)]
pub enum Error {
    /// The client has no destination addresses configured.
    #[error("no addrs provided")]
    NoAddrs,

    /// The client was used before being opened.
    #[error("client not opened")]
    NotOpened,

    /// The client was opened a second time without being closed.
    #[error("client already opened")]
    AlreadyOpened,

    /// The client was used after being closed.
    #[error("client closed")]
    Closed,

    /// The metric has an empty name.
    #[error("metric has no name")]
    NoName,

    /// The metric has no value type declared.
    #[error("metric has no ValueType")]
    NoValueType,

    /// The value does not fit within the range of the metric's value type.
    #[error("value {value} is out of range for {value_type}")]
    ValueOutOfRange {
        /// The offending value, rendered as text.
        value: String,

        /// The declared value type of the metric.
        value_type: ValueType,
    },

    /// The value cannot be represented by the metric's value type at all.
    #[error("value {value} cannot be written as {value_type}")]
    ValueTypeMismatch {
        /// The offending value, rendered as text.
        value: String,

        /// The declared value type of the metric.
        value_type: ValueType,
    },

    /// A string field is longer than the 32-bit length prefix of a packet can describe.
    #[error("string of {len} bytes is too long for a packet")]
    StringTooLong {
        /// The length of the string, in bytes.
        len: usize,
    },

    /// A destination could not be resolved or connected to.
    #[error("failed to connect to {remote}: {source}")]
    Connect {
        /// The destination that failed.
        remote: String,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// Writing a packet to a destination failed.
    #[error("failed to write to {remote}: {source}")]
    Write {
        /// The destination that failed.
        remote: String,

        /// The underlying I/O error.
        source: io::Error,
    },
}

impl Error {
    /// Returns `true` if the error is caused by how the client is configured or the order its methods were called in.
    pub const fn is_config(&self) -> bool {
        matches!(self, Error::NoAddrs | Error::NotOpened | Error::AlreadyOpened | Error::Closed)
    }

    /// Returns `true` if the error is caused by an invalid metric or value.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoName
                | Error::NoValueType
                | Error::ValueOutOfRange { .. }
                | Error::ValueTypeMismatch { .. }
                | Error::StringTooLong { .. }
        )
    }

    /// Returns `true` if the error was reported by the network layer.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Error::Connect { .. } | Error::Write { .. })
    }
}
