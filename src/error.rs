//! Error types for the relay and the client.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Relay errors.
///
/// `Bind` is fatal for the server. `Connection` only ever ends the handler
/// of the connection it names.
#[derive(Debug)]
pub enum RelayError {
    /// The listening endpoint could not be established.
    Bind(String, io::Error),
    /// Read or write failure on one connection.
    Connection(SocketAddr, io::Error),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Bind(addr, e) => write!(f, "Failed to bind to '{}': {}", addr, e),
            RelayError::Connection(peer, e) => write!(f, "Connection error with {}: {}", peer, e),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Bind(_, e) | RelayError::Connection(_, e) => Some(e),
        }
    }
}

/// Echo client errors
#[derive(Debug)]
pub enum ClientError {
    Connect(String, io::Error),
    Io(io::Error),
    /// The server closed before echoing the whole payload.
    Truncated { expected: usize, received: usize },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Connect(addr, e) => write!(f, "Failed to connect to '{}': {}", addr, e),
            ClientError::Io(e) => write!(f, "IO error: {}", e),
            ClientError::Truncated { expected, received } => write!(
                f,
                "Connection closed after {} of {} echoed bytes",
                received, expected
            ),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Connect(_, e) | ClientError::Io(e) => Some(e),
            ClientError::Truncated { .. } => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        ClientError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RelayError::Bind(
            "0.0.0.0:8888".to_string(),
            io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to bind to '0.0.0.0:8888': address in use"
        );

        let err = ClientError::Truncated {
            expected: 14,
            received: 3,
        };
        assert_eq!(
            err.to_string(),
            "Connection closed after 3 of 14 echoed bytes"
        );
    }
}
