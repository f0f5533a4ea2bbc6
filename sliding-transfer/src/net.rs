//! The client-side [`ProtocolAdapter`] implementation: a blocking UDP
//! socket standing in for `example/client.py::Client._send` / `_recv`.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use sliding_window::{ProtocolAdapter, RecvError};

use crate::error::TransferError;
use crate::wire::{Ack, Command, Request};

const MAX_DATAGRAM: usize = 2048;

pub struct UdpClientAdapter {
    socket: UdpSocket,
    peer: SocketAddr,
    next_id: u64,
}

impl UdpClientAdapter {
    pub fn connect(peer: SocketAddr) -> Result<Self, TransferError> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(peer)?;
        Ok(Self {
            socket,
            peer,
            next_id: 0,
        })
    }
}

impl ProtocolAdapter for UdpClientAdapter {
    type Payload = Command;
    type Tag = u64;
    type Error = TransferError;

    fn send(&mut self, payload: &Command) -> Result<u64, TransferError> {
        let id = self.next_id;
        self.next_id += 1;
        let request = Request {
            id,
            command: payload.clone(),
        };
        tracing::debug!(id, peer = %self.peer, "sending request");
        self.socket.send(&request.to_bytes())?;
        Ok(id)
    }

    fn recv(&mut self, timeout: Duration) -> Result<u64, RecvError<TransferError>> {
        // `Duration::ZERO` means "poll, do not block" (spec §4.1), not
        // an automatic timeout: `set_read_timeout` rejects
        // `Some(Duration::ZERO)` outright, so a zero budget instead puts
        // the socket in non-blocking mode for a single recv attempt,
        // matching `socket.settimeout(0)` in the original Python client.
        if timeout.is_zero() {
            self.socket
                .set_nonblocking(true)
                .map_err(|e| RecvError::Other(TransferError::Io(e)))?;
            let result = self.recv_once();
            // Restore blocking mode so a later, non-zero-budget recv
            // actually blocks instead of racing `set_read_timeout`.
            self.socket
                .set_nonblocking(false)
                .map_err(|e| RecvError::Other(TransferError::Io(e)))?;
            return result;
        }

        self.socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| RecvError::Other(TransferError::Io(e)))?;
        self.recv_once()
    }
}

impl UdpClientAdapter {
    fn recv_once(&self) -> Result<u64, RecvError<TransferError>> {
        let mut buf = [0u8; MAX_DATAGRAM];
        match self.socket.recv(&mut buf) {
            Ok(n) => {
                let ack = Ack::from_bytes(&buf[..n]).map_err(|e| RecvError::Other(e.into()))?;
                tracing::debug!(id = ack.id, "received ack");
                Ok(ack.id)
            }
            Err(e) if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                Err(RecvError::Timeout)
            }
            Err(e) => Err(RecvError::Other(TransferError::Io(e))),
        }
    }
}
