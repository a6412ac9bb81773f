//! CLI front-end for the receiver half of the reliable transport: binds a
//! UDP socket, reassembles whatever `rtp-sender` sends, and writes the
//! reconstructed byte stream to standard output, per §6's CLI surface.

use std::net::{SocketAddr, UdpSocket};
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use rtp_protocol::config::{ACK_INTAKE_READ_TIMEOUT, PACKET_SIZE};
use rtp_protocol::{ReceiverSession, RtpError};
use runtime::{Logger, Shutdown};

/// Listens for an `rtp-sender` byte stream and writes it to standard output.
#[derive(Parser)]
#[command(name = "rtp-receiver")]
struct Args {
	/// Local address to bind and listen on.
	recv_ip: std::net::IpAddr,

	/// Local port to bind and listen on.
	recv_port: u16,

	/// Receiver-side window bound for accepted out-of-window DATA.
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
	let addr = SocketAddr::new(args.recv_ip, args.recv_port);

	let socket = UdpSocket::bind(addr).map_err(RtpError::SocketBind)?;
	socket.set_read_timeout(Some(ACK_INTAKE_READ_TIMEOUT)).map_err(RtpError::SocketIo)?;

	let stdout = std::io::stdout();
	let mut session = ReceiverSession::new(socket, stdout.lock(), PACKET_SIZE, args.window_size);

	let shutdown = Shutdown::new();
	shutdown.stop_on_ctrlc();

	session.run(&shutdown)
}
