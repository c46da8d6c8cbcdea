//! TCP listener for the echo relay.
//!
//! Binds once, accepts connections in a loop and spawns one task per
//! connection. Tasks share nothing; the only shared pieces are the listening
//! socket and the semaphore capping live connections.

use crate::config::Config;
use crate::connection::Connection;
use crate::echo::handle_connection;
use crate::error::RelayError;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Pause after a failed accept before trying again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Server instance
pub struct Server {
    config: Config,
    listener: TcpListener,
    connection_limit: Arc<Semaphore>,
}

impl Server {
    /// Bind the listening socket.
    ///
    /// Fails with `RelayError::Bind` if the configuration is out of range,
    /// or the address cannot be resolved or is unavailable (already in use,
    /// insufficient privilege).
    pub async fn bind(config: Config) -> Result<Self, RelayError> {
        let bind_error = |e: io::Error| RelayError::Bind(config.listen.clone(), e);

        config
            .validate()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e.to_string())))?;

        let addr = tokio::net::lookup_host(&config.listen)
            .await
            .map_err(bind_error)?
            .next()
            .ok_or_else(|| {
                bind_error(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "address resolved to nothing",
                ))
            })?;

        let listener = create_listener(addr, config.backlog).map_err(bind_error)?;
        let listener = TcpListener::from_std(listener).map_err(bind_error)?;

        info!(address = %addr, backlog = config.backlog, "Server listening");

        Ok(Server {
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            config,
            listener,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Handlers already running are not cancelled; they end when their peer
    /// closes.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            // Wait for a connection slot
            if self.connection_limit.available_permits() == 0 {
                warn!(
                    max_connections = self.config.max_connections,
                    "Connection limit reached, pausing accept"
                );
            }
            let permit = tokio::select! {
                _ = &mut shutdown => break,
                permit = self.connection_limit.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let accepted = tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    info!(peer = %peer, "Accepted connection");

                    let buffer_size = self.config.buffer_size;

                    tokio::spawn(async move {
                        let mut conn = Connection::new(peer);
                        if let Err(e) = handle_connection(stream, &mut conn, buffer_size).await {
                            debug!(error = %e, "Connection error");
                        }
                        info!(peer = %peer, bytes = conn.bytes_echoed(), "Connection closed");
                        drop(permit);
                    });
                }
                Err(e) => {
                    // Transient (EMFILE, ECONNABORTED, ...): back off and keep accepting
                    warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }

        info!("Listener stopped");
    }
}

/// Create a nonblocking TCP listener with SO_REUSEADDR and the given backlog.
fn create_listener(addr: SocketAddr, backlog: u32) -> io::Result<std::net::TcpListener> {
    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX))?;

    Ok(socket.into())
}
