//! echo-relay: a TCP echo relay.
//!
//! Every accepted connection gets its own task that writes back exactly the
//! bytes it reads, until the peer closes or the connection fails. Handlers
//! share no state with each other.
//!
//! The crate also ships a small client used by the `echo-client` binary and
//! by the tests.

pub mod client;
pub mod config;
pub mod connection;
pub mod echo;
pub mod error;
pub mod server;

pub use client::EchoClient;
pub use config::Config;
pub use error::{ClientError, RelayError};
pub use server::Server;
