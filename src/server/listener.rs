use std::io;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::info;

use crate::config::ServerConfig;
use crate::control::Controller;
use crate::hardware::Hardware;
use crate::http::connection::{Connection, ConnectionSettings};

/// Owns the listening socket and the controller for the life of the process.
///
/// Connections are served strictly one at a time: the next accept happens
/// only after the current connection is closed, so hardware calls follow
/// connection arrival order.
pub struct Server<H> {
    listener: TcpListener,
    controller: Controller<H>,
    settings: ConnectionSettings,
}

impl<H: Hardware> Server<H> {
    /// Binds with `SO_REUSEADDR` and the configured backlog.
    pub async fn bind(cfg: &ServerConfig, controller: Controller<H>) -> anyhow::Result<Self> {
        let addr = resolve(&cfg.listen_addr).await?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket
            .bind(addr)
            .with_context(|| format!("failed to bind {}", addr))?;
        let listener = socket.listen(cfg.backlog)?;

        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            controller,
            settings: ConnectionSettings {
                max_request_bytes: cfg.max_request_bytes,
                read_timeout: cfg.read_timeout(),
            },
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection and serves it to completion.
    ///
    /// Connection failures are logged and swallowed. Only a fatal accept
    /// error is returned.
    pub async fn serve_one(&mut self) -> anyhow::Result<()> {
        let (socket, peer) = match self.listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) if is_transient(&e) => {
                tracing::warn!(error = %e, "Transient accept failure");
                return Ok(());
            }
            Err(e) => return Err(e).context("accept failed"),
        };
        info!("Accepted connection from {}", peer);

        let conn = Connection::new(socket, self.settings);
        if let Err(e) = conn.run(&mut self.controller).await {
            tracing::warn!(peer = %peer, error = %e, "Connection aborted");
        }

        Ok(())
    }

    /// Serves connections until a fatal accept error.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            self.serve_one().await?;
        }
    }
}

async fn resolve(listen_addr: &str) -> anyhow::Result<SocketAddr> {
    let mut addrs: Vec<SocketAddr> = tokio::net::lookup_host(listen_addr)
        .await
        .with_context(|| format!("invalid listen address {}", listen_addr))?
        .collect();
    // Prefer IPv4 when a name resolves to both.
    addrs.sort_by_key(|a| !a.is_ipv4());
    addrs
        .into_iter()
        .next()
        .with_context(|| format!("listen address {} resolved to nothing", listen_addr))
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
