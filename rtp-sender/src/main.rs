//! CLI front-end for the sender half of the reliable transport: reads a
//! byte stream from standard input and drives it across to a waiting
//! `rtp-receiver`, per §6's CLI surface.

use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use rtp_protocol::config::PACKET_SIZE;
use rtp_protocol::{RtpError, SenderSession};
use runtime::{Logger, Shutdown};

/// Reliably delivers standard input to a listening `rtp-receiver`.
#[derive(Parser)]
#[command(name = "rtp-sender")]
struct Args {
	/// Address the receiver is listening on.
	recv_ip: IpAddr,

	/// Port the receiver is listening on.
	recv_port: u16,

	/// Sender-side sliding window size, in chunks.
	window_size: usize,

	/// Repeatable: raises the log level (-v = debug, -vv = trace).
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn main() -> ExitCode {
	let args = Args::parse();
	Logger::init(level_for(args.verbose));

	match run(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn level_for(verbose: u8) -> LevelFilter {
	match verbose {
		0 => LevelFilter::Info,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	}
}

fn run(args: Args) -> Result<(), RtpError> {
	let peer = SocketAddr::new(args.recv_ip, args.recv_port);

	let local: SocketAddr = match peer {
		SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
		SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
	};
	let socket = UdpSocket::bind(local).map_err(RtpError::SocketBind)?;

	let mut input = Vec::new();
	std::io::stdin().lock().read_to_end(&mut input).map_err(RtpError::StdinRead)?;

	let shutdown = Shutdown::new();
	shutdown.stop_on_ctrlc();

	SenderSession::run(socket, peer, &input, PACKET_SIZE, args.window_size, shutdown)
}
