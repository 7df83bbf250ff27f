//! Error types for directory operations.
//!
//! Every client operation returns an explicit `Result<T, Error>`; there is no
//! "check the last error on the handle" side channel. Protocol errors always
//! carry the numeric result code reported by the server alongside a label for
//! the operation that failed.

use thiserror::Error;

/// Main error type for directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transport-level failure: the server cannot be reached or the
    /// connection was lost mid-operation.
    #[error("Connection to {endpoint} failed: {reason}")]
    Connection {
        /// The `host:port` endpoint that could not be reached.
        endpoint: String,
        /// Underlying transport failure description.
        reason: String,
    },

    /// An operation was invoked while no session is established.
    #[error("Not connected to the directory server")]
    NotConnected,

    /// The server rejected or could not complete a well-formed request.
    #[error("{operation} failed: {message} (code {code})")]
    Protocol {
        /// Label of the operation that failed (`bind`, `search`, `add`, ...).
        operation: String,
        /// Numeric LDAP result code reported by the server or library.
        code: u32,
        /// Diagnostic message from the server, or additional context.
        message: String,
    },

    /// A caller-supplied search scope value is not one of the recognized
    /// scopes. Raised before any network interaction.
    #[error("Invalid search scope: {0}")]
    InvalidScope(i32),

    /// A caller-supplied argument was rejected before dispatch.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error (invalid endpoint, bad option value, ...).
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Specialized result type for directory operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a protocol error for the given operation label.
    #[must_use]
    pub fn protocol(operation: impl Into<String>, code: u32, message: impl Into<String>) -> Self {
        Self::Protocol {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    /// Creates a connection error for the given endpoint.
    #[must_use]
    pub fn connection(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::NotConnected => "NOT_CONNECTED",
            Self::Protocol { .. } => "PROTOCOL_ERROR",
            Self::InvalidScope(_) => "INVALID_SCOPE",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns the LDAP result code carried by a protocol error, if any.
    #[must_use]
    pub fn result_code(&self) -> Option<u32> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if the error indicates a transport-level problem that a
    /// caller may address by reconnecting.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::NotConnected)
    }
}
