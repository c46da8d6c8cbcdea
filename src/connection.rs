//! Per-connection state.
//!
//! A connection is either open or closed. It is owned by the task handling
//! it and never shared with other handlers.

use std::net::SocketAddr;

/// Current state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Reading and echoing bytes.
    Open,
    /// Peer closed, or the connection failed. Terminal.
    Closed,
}

/// A single client connection.
#[derive(Debug)]
pub struct Connection {
    peer: SocketAddr,
    state: ConnState,
    bytes_echoed: u64,
}

impl Connection {
    /// Create a new connection in the open state.
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            state: ConnState::Open,
            bytes_echoed: 0,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnState::Open
    }

    /// Total bytes written back to the peer.
    pub fn bytes_echoed(&self) -> u64 {
        self.bytes_echoed
    }

    /// Account for `n` bytes echoed back. Ignored once closed.
    pub fn record_echo(&mut self, n: usize) {
        if self.is_open() {
            self.bytes_echoed += n as u64;
        }
    }

    /// Mark the connection closed.
    pub fn close(&mut self) {
        self.state = ConnState::Closed;
    }
}
