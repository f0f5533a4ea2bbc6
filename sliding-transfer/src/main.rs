mod client;
mod error;
mod net;
mod server;
mod wire;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// sliding-transfer - toy reliable file transfer over UDP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Cmd,

    /// Verbosity level (up to -vvv)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Receive files and write them into a directory
    Serve {
        /// Address to bind (ip:port)
        #[arg(short, long, default_value = "0.0.0.0:5000")]
        bind: SocketAddr,

        /// Directory to write received files into
        #[arg(short, long, default_value = "./received")]
        dir: PathBuf,

        /// Artificial per-request delay before acking, in milliseconds.
        /// Reproduces `original_source`'s `Server(delay=...)`, useful for
        /// exercising the engine's retransmission path end to end.
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,
    },
    /// Send a file to a server
    Send {
        /// File to send
        path: PathBuf,

        /// Server address (ip:port)
        #[arg(short, long)]
        target: SocketAddr,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Cmd::Serve {
            bind,
            dir,
            delay_ms,
        } => {
            let mut server = server::Server::bind(bind, dir, Duration::from_millis(delay_ms))?;
            server.run()?;
            Ok(())
        }
        Cmd::Send { path, target } => client::send_file(&path, target),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "sliding_transfer=info,sliding_window=warn",
        1 => "sliding_transfer=debug,sliding_window=info",
        _ => "sliding_transfer=trace,sliding_window=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}
