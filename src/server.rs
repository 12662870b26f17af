//! TCP server for turtle canvas sessions.
//!
//! Accepts connections and runs one task per client. Each task owns its
//! own canvas; nothing is shared between sessions.

use crate::config::{CanvasConfig, Config};
use crate::protocols::turtle::handle_connection;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Listen backlog
const BACKLOG: i32 = 1024;

/// Server instance
pub struct Server {
    listener: TcpListener,
    canvas: CanvasConfig,
    connection_limit: Arc<Semaphore>,
}

impl Server {
    /// Bind the listening socket.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let addr = config
            .listen_addr()
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no listen address"))?;

        let listener = TcpListener::from_std(create_listener(addr)?)?;
        info!(address = %listener.local_addr()?, "Server listening");

        Ok(Server {
            listener,
            canvas: config.canvas,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
        })
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until interrupted.
    pub async fn run(&self) -> io::Result<()> {
        tokio::select! {
            result = self.accept_loop() => result,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!(
                    memory_mb = %format!("{:.2}", peak_memory_mb()),
                    "Interrupted, shutting down"
                );
                Ok(())
            }
        }
    }

    async fn accept_loop(&self) -> io::Result<()> {
        loop {
            // Wait for a connection slot
            let permit = self
                .connection_limit
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    info!(%peer, "Client connected");
                    let canvas = self.canvas;

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, canvas).await {
                            debug!(%peer, error = %e, "Connection error");
                        }
                        info!(%peer, "Client disconnected");
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Create a non-blocking TCP listener with `SO_REUSEADDR`.
fn create_listener(addr: SocketAddr) -> io::Result<std::net::TcpListener> {
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
    socket.listen(BACKLOG)?;

    Ok(socket.into())
}

/// Peak resident set size of this process in megabytes.
fn peak_memory_mb() -> f64 {
    // SAFETY: getrusage only writes into the zeroed struct we pass it.
    let usage = unsafe {
        let mut usage: libc::rusage = std::mem::zeroed();
        if libc::getrusage(libc::RUSAGE_SELF, &mut usage) != 0 {
            return 0.0;
        }
        usage
    };

    // ru_maxrss is kilobytes on Linux, bytes on macOS
    let bytes = if cfg!(target_os = "macos") {
        usage.ru_maxrss as f64
    } else {
        usage.ru_maxrss as f64 * 1024.0
    };
    bytes / 1024.0 / 1024.0
}
