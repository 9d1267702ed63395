use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::control::{ActionResult, Controller};
use crate::hardware::Hardware;
use crate::http::parser::parse_request_line;
use crate::http::request::ParsedRequest;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;

/// Per-connection limits.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub max_request_bytes: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_request_bytes: 1024,
            read_timeout: None,
        }
    }
}

/// One accepted connection. Serves exactly one request and is consumed by
/// [`Connection::run`].
pub struct Connection<S> {
    stream: S,
    settings: ConnectionSettings,
    state: ConnectionState,
}

#[derive(Debug)]
pub enum ConnectionState {
    Reading,
    Routing(ParsedRequest),
    Acted(ActionResult),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, settings: ConnectionSettings) -> Self {
        Self {
            stream,
            settings,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to `Closed`.
    ///
    /// The stream is shut down exactly once whichever step the connection
    /// leaves from. Read and write failures are returned after the close;
    /// hardware faults are answered with a 500 and are not errors here.
    pub async fn run<H>(mut self, controller: &mut Controller<H>) -> anyhow::Result<()>
    where
        H: Hardware + ?Sized,
    {
        let mut failure = None;

        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(req) => self.state = ConnectionState::Routing(req),
                    Err(e) => {
                        failure = Some(e.context("failed to read request"));
                    }
                },

                ConnectionState::Routing(req) => {
                    let result = controller.handle(&req);
                    self.state = ConnectionState::Acted(result);
                }

                ConnectionState::Acted(result) => {
                    let response = Response::for_result(&result);
                    tracing::debug!(status = response.status.as_u16(), "Response built");
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response));
                }

                ConnectionState::Writing(mut writer) => {
                    if let Err(e) = writer.write_to_stream(&mut self.stream).await {
                        failure = Some(e.context("failed to write response"));
                    }
                }

                ConnectionState::Closed => {
                    self.close().await;
                    break;
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Performs the single bounded read. An empty read parses as malformed.
    async fn read_request(&mut self) -> anyhow::Result<ParsedRequest> {
        let mut buf = vec![0u8; self.settings.max_request_bytes];

        let n = match self.settings.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.stream.read(&mut buf))
                .await
                .map_err(|_| anyhow::anyhow!("read timed out after {:?}", limit))??,
            None => self.stream.read(&mut buf).await?,
        };

        if n == 0 {
            tracing::debug!("Client closed connection before sending data");
        }

        Ok(parse_request_line(&buf[..n]))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after response failed");
        }
    }
}
