//! Echo relay protocol.
//!
//! There is no framing: whatever a client writes is written back to it
//! unchanged, in order, until the client closes its side.
//!
//! ```text
//! Client sends:    Hello, server!
//! Server returns:  Hello, server!
//! ```
//!
//! A read of zero bytes (the peer half-closed or closed) and an I/O error
//! both end the connection. The handler then shuts down its own write side
//! so the peer sees end-of-stream.

pub mod handler;

pub use handler::handle_connection;
