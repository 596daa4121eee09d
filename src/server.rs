//! TCP front end for the task store.
//!
//! Requests are newline-delimited lines. Each reply is the interpreter's
//! text followed by one empty line, so a reader knows where it ends.

use crate::cli::ServerConfig;
use crate::command::CommandInterpreter;
use crate::task::TaskManager;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        source: std::io::Error,
    },

    #[error("Connection closed by peer")]
    Closed,

    #[error("Transport error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LinesCodecError> for TransportError {
    fn from(error: LinesCodecError) -> Self {
        match error {
            LinesCodecError::Io(e) => TransportError::Io(e),
            LinesCodecError::MaxLineLengthExceeded => TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "line too long",
            )),
        }
    }
}

/// Write one reply frame: the text, then an empty terminator line
async fn write_reply(
    framed: &mut Framed<TcpStream, LinesCodec>,
    reply: &str,
) -> Result<(), TransportError> {
    framed.send(format!("{}\n", reply)).await?;
    Ok(())
}

/// Bound listener plus the shared interpreter every connection uses
pub struct TaskServer {
    listener: TcpListener,
    interpreter: CommandInterpreter,
    max_line_length: usize,
}

impl TaskServer {
    /// Bind the configured address; the store lives as long as the server
    pub async fn bind(config: &ServerConfig, manager: TaskManager) -> Result<Self, TransportError> {
        let address = config.address();
        let listener =
            TcpListener::bind(&address)
                .await
                .map_err(|source| TransportError::Bind {
                    address: address.clone(),
                    source,
                })?;

        info!("Task server listening on {}", address);
        Ok(Self {
            listener,
            interpreter: CommandInterpreter::new(manager),
            max_line_length: config.max_line_length,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn manager(&self) -> &TaskManager {
        self.interpreter.manager()
    }

    /// Accept connections until the process ends
    pub async fn run(self) -> Result<(), TransportError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already being served keep running on their own tasks.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), TransportError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("Connected to {}", peer);
                        let interpreter = self.interpreter.clone();
                        let max_line_length = self.max_line_length;
                        tokio::spawn(async move {
                            match handle_connection(stream, interpreter, max_line_length).await {
                                Ok(()) => info!("Connection from {} closed", peer),
                                Err(e) => warn!("Connection from {} failed: {}", peer, e),
                            }
                        });
                    }
                    Err(e) => warn!("Failed to accept connection: {}", e),
                },
            }
        }
    }
}

/// Serve one connection: read a line, execute it, write the reply, repeat.
///
/// Returns when the peer closes the stream. Any lock taken by a command is
/// released before its reply is written.
pub async fn handle_connection(
    stream: TcpStream,
    interpreter: CommandInterpreter,
    max_line_length: usize,
) -> Result<(), TransportError> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));
    let mut after_error = false;

    loop {
        // The framed stream yields `None` once after a decode error, then resumes.
        let frame = match framed.next().await {
            Some(frame) => frame,
            None if after_error => {
                after_error = false;
                continue;
            }
            None => break,
        };
        after_error = frame.is_err();

        let reply = match frame {
            Ok(line) => {
                debug!("Received command: {}", line);
                interpreter.execute(&line).await
            }
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                debug!("Discarding request longer than {} bytes", max_line_length);
                format!(
                    "Erro: comando excede o tamanho máximo de {} bytes.",
                    max_line_length
                )
            }
            Err(LinesCodecError::Io(e)) => return Err(e.into()),
        };

        write_reply(&mut framed, &reply).await?;
    }

    Ok(())
}
