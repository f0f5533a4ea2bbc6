//! Drives a file transfer to completion: `example/client.py::Client.send_file`
//! generalized onto [`sliding_window::WindowEngine`].

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use sha2::{Digest, Sha256};
use sliding_window::{EngineConfig, WindowEngine};

use crate::error::TransferError;
use crate::net::UdpClientAdapter;
use crate::wire::Command;

/// Window size, retransmission budget, and per-attempt timeout used by
/// `example/client.py::Client.send` (`SlidingWindow(self.protocol, 5, 3, 5)`).
const WINDOW_SIZE: usize = 5;
const MAX_RETRANS: u32 = 3;
const TIMEOUT: Duration = Duration::from_secs(5);

/// Chunk size for `PutData` commands. The original uses 10 bytes to make
/// retransmission easy to observe by hand; kept here for the same reason.
const CHUNK_SIZE: usize = 512;

pub fn send_file(path: &Path, server: SocketAddr) -> anyhow::Result<()> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("path has no valid file name: {}", path.display()))?
        .to_string();
    let data = std::fs::read(path)?;

    tracing::info!(path = %path.display(), bytes = data.len(), "sending file");

    let commands = build_commands(filename, &data);

    let adapter = UdpClientAdapter::connect(server)?;
    let config = EngineConfig::new(WINDOW_SIZE, MAX_RETRANS, TIMEOUT)?;
    let mut engine: WindowEngine<UdpClientAdapter> =
        WindowEngine::with_system_clock(config, adapter)?;

    engine.run(commands).map_err(|e| {
        tracing::error!(error = %e, "transfer failed");
        anyhow::Error::new(e)
    })?;

    tracing::info!("file sent");
    Ok(())
}

fn build_commands(filename: String, data: &[u8]) -> Vec<Command> {
    let mut commands = Vec::with_capacity(2 + data.len() / CHUNK_SIZE);
    commands.push(Command::InitFile { filename });
    for (offset, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
        commands.push(Command::PutData {
            offset: (offset * CHUNK_SIZE) as u64,
            bytes: chunk.to_vec(),
        });
    }
    commands.push(Command::Finalize {
        digest: Sha256::digest(data).into(),
    });
    commands
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}
