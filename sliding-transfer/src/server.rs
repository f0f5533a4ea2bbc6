//! Receive side: `original_source/example/server.py::Server`, reproduced
//! with a blocking `UdpSocket` in place of Python's socket + pickle.
//!
//! The engine on the other side of the wire only cares that every
//! acknowledged request gets exactly one `Ack`; this loop has no notion
//! of a window itself; it is the passive half of the protocol.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::net::{SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::client::hex_encode;
use crate::error::TransferError;
use crate::wire::{Ack, Command, Request};

const MAX_DATAGRAM: usize = 2048;

/// One file transfer in progress per peer address, mirroring the Python
/// original's single-peer `self.fobj` (generalized here to many peers,
/// since a `UdpSocket` has no notion of "connection" to pin it to one).
struct PendingTransfer {
    filename: String,
    part_path: PathBuf,
    file: File,
}

pub struct Server {
    socket: UdpSocket,
    dir: PathBuf,
    delay: Duration,
    pending: HashMap<SocketAddr, PendingTransfer>,
}

impl Server {
    pub fn bind(addr: SocketAddr, dir: PathBuf, delay: Duration) -> Result<Self, TransferError> {
        std::fs::create_dir_all(&dir)?;
        let socket = UdpSocket::bind(addr)?;
        Ok(Self {
            socket,
            dir,
            delay,
            pending: HashMap::new(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Run forever, handling one datagram at a time. `original_source`'s
    /// `Server.run` is a blocking loop with no concurrency either.
    pub fn run(&mut self) -> Result<(), TransferError> {
        tracing::info!(dir = %self.dir.display(), "server started");
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            let (n, peer) = self.socket.recv_from(&mut buf)?;
            match self.handle_datagram(peer, &buf[..n]) {
                Ok(ack) => {
                    if !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                    self.socket.send_to(&ack.to_bytes(), peer)?;
                }
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "dropping malformed or failed request");
                }
            }
        }
    }

    fn handle_datagram(&mut self, peer: SocketAddr, data: &[u8]) -> Result<Ack, TransferError> {
        let request = Request::from_bytes(data)?;
        tracing::debug!(%peer, id = request.id, "received request");
        self.dispatch(peer, request.command)?;
        Ok(Ack { id: request.id })
    }

    fn dispatch(&mut self, peer: SocketAddr, command: Command) -> Result<(), TransferError> {
        match command {
            Command::InitFile { filename } => self.init_file(peer, filename),
            Command::PutData { offset, bytes } => self.put_data(peer, offset, &bytes),
            Command::Finalize { digest } => self.finalize(peer, digest),
        }
    }

    fn init_file(&mut self, peer: SocketAddr, filename: String) -> Result<(), TransferError> {
        tracing::info!(%peer, filename, "file transfer initiated");
        let part_path = self.dir.join(format!("{}.part", filename));
        let file = File::create(&part_path)?;
        self.pending.insert(
            peer,
            PendingTransfer {
                filename,
                part_path,
                file,
            },
        );
        Ok(())
    }

    fn put_data(&mut self, peer: SocketAddr, offset: u64, bytes: &[u8]) -> Result<(), TransferError> {
        let transfer = self
            .pending
            .get_mut(&peer)
            .ok_or(TransferError::NoTransferInProgress)?;
        transfer.file.seek(SeekFrom::Start(offset))?;
        transfer.file.write_all(bytes)?;
        Ok(())
    }

    fn finalize(&mut self, peer: SocketAddr, digest: [u8; 32]) -> Result<(), TransferError> {
        let mut transfer = self
            .pending
            .remove(&peer)
            .ok_or(TransferError::NoTransferInProgress)?;
        transfer.file.flush()?;
        let data = std::fs::read(&transfer.part_path)?;
        let computed: [u8; 32] = Sha256::digest(&data).into();
        if computed != digest {
            return Err(TransferError::ChecksumMismatch {
                expected: hex_encode(&digest),
                computed: hex_encode(&computed),
            });
        }
        let final_path = self.dir.join(&transfer.filename);
        std::fs::rename(&transfer.part_path, &final_path)?;
        tracing::info!(%peer, filename = %transfer.filename, "file received successfully");
        Ok(())
    }
}
