use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::logger;
use crate::tcp::header::{Header, HeaderType, HEADER_LENGTH};
use crate::tcp::packet::Packet;
use crate::tcp::protocol::Protocol;
use crate::utils::errors::ServerError;

/// Frames larger than this close the connection instead of being buffered.
pub const MAX_PAYLOAD_LENGTH: u32 = 1024 * 1024;

pub struct ServerInstance {
    pub socket: TcpListener,
    pub protocol: Arc<Protocol>,
}

impl ServerInstance {
    pub async fn create_instance(
        host: &str,
        port: u16,
        protocol: Arc<Protocol>,
    ) -> Result<ServerInstance, ServerError> {
        let socket = TcpListener::bind((host, port)).await?;
        let instance = ServerInstance { socket, protocol };
        logger!(INFO, "[SERVER] Listening on {}", instance.local_addr()?);
        Ok(instance)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Accepts clients forever, one task per connection.
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.socket.accept().await {
                Ok((stream, addr)) => {
                    logger!(DEBUG, "[SERVER] Incoming connection from `{addr}`");
                    let protocol = Arc::clone(&self.protocol);
                    tokio::spawn(async move {
                        ServerInstance::handle_client(protocol, stream, addr).await;
                        logger!(DEBUG, "[SERVER] Closed connection with `{addr}`");
                    });
                }
                Err(error) => logger!(WARN, "[SERVER] Failed to accept connection ({error})"),
            }
        }
    }

    /// Reads frames from one client until it disconnects, sends something
    /// unframeable, or a write fails.
    async fn handle_client(protocol: Arc<Protocol>, mut stream: TcpStream, addr: SocketAddr) {
        loop {
            let mut header_bytes = [0u8; HEADER_LENGTH];
            if stream.read_exact(&mut header_bytes).await.is_err() {
                return;
            }

            let header = match Header::from_bytes(&header_bytes) {
                Ok(header) => header,
                Err(error) => {
                    // The stream can't be resynchronized after a bad header.
                    logger!(WARN, "[SERVER] Invalid header from `{addr}` ({error})");
                    let response =
                        Protocol::error_packet(HeaderType::InvalidHeader, &error.to_string(), Vec::new());
                    let _ = stream.write_all(&response.wrap_packet()).await;
                    return;
                }
            };

            if header.payload_length > MAX_PAYLOAD_LENGTH {
                logger!(
                    WARN,
                    "[SERVER] `{addr}` sent a {} byte payload, closing",
                    header.payload_length
                );
                return;
            }

            let mut frame = vec![0u8; HEADER_LENGTH + header.payload_length as usize];
            frame[..HEADER_LENGTH].copy_from_slice(&header_bytes);
            if stream.read_exact(&mut frame[HEADER_LENGTH..]).await.is_err() {
                return;
            }

            let packet = match Packet::parse(&frame) {
                Ok(packet) => packet,
                Err(error) => {
                    logger!(ERROR, "[SERVER] Unreadable frame from `{addr}` ({error})");
                    return;
                }
            };
            let response = protocol.handle_packet(&packet).await;

            if let Err(error) = stream.write_all(&response.wrap_packet()).await {
                logger!(ERROR, "[SERVER] Unable to write to `{addr}` ({error})");
                return;
            }

            if packet.header.header_type == HeaderType::Disconnect {
                return;
            }
        }
    }
}
