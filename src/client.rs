//! Interactive line client for the task server.

use crate::server::TransportError;
use futures::{SinkExt, StreamExt};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info};

pub const PROMPT: &str = "Digite um comando para o servidor: ";

/// Word that ends an interactive session
pub const EXIT_COMMAND: &str = "exit";

pub struct TaskClient {
    framed: Framed<TcpStream, LinesCodec>,
}

impl TaskClient {
    pub async fn connect(address: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|source| TransportError::Connect {
                address: address.to_string(),
                source,
            })?;

        info!("Connected to task server at {}", address);
        Ok(Self {
            framed: Framed::new(stream, LinesCodec::new()),
        })
    }

    /// Send one command and wait for its complete reply.
    ///
    /// Line breaks inside `command` are flattened to spaces so the request
    /// stays a single line.
    pub async fn send(&mut self, command: &str) -> Result<String, TransportError> {
        let line = command.replace(['\r', '\n'], " ");
        self.framed.send(line).await?;

        let mut reply = Vec::new();
        loop {
            match self.framed.next().await {
                Some(Ok(line)) if line.is_empty() => break,
                Some(Ok(line)) => reply.push(line),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(TransportError::Closed),
            }
        }

        debug!("Received {} reply lines", reply.len());
        Ok(reply.join("\n"))
    }

    /// Read commands from stdin until `exit` or end of input, printing each reply
    pub async fn interact(&mut self) -> Result<(), TransportError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{}", PROMPT);
            std::io::stdout().flush()?;

            let Some(input) = lines.next_line().await? else {
                break;
            };
            let input = input.trim();

            if input.eq_ignore_ascii_case(EXIT_COMMAND) {
                break;
            }

            let reply = self.send(input).await?;
            println!("Resposta do servidor: {}", reply);
        }

        Ok(())
    }
}
