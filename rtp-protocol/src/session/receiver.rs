use std::io::Write;
use std::net::SocketAddr;

use log::{debug, info, warn};

use crate::endpoint::{is_timeout, Endpoint};
use crate::error::RtpError;
use crate::header::{decode, encode, MessageType, HEADER_LEN};
use crate::reassembly::Reassembly;
use runtime::Shutdown;

/// The receiver's reactive state machine (§4.2): every transition is
/// triggered by an arriving packet, never by a timer.
pub struct ReceiverSession<E: Endpoint, W: Write> {
	socket: E,
	sink: W,
	packet_size: usize,
	window_size: usize,
	expected_seq: u32,
	buffer: Reassembly,
	peer_addr: Option<SocketAddr>,
	running: bool,
}

impl<E: Endpoint, W: Write> ReceiverSession<E, W> {
	pub fn new(socket: E, sink: W, packet_size: usize, window_size: usize) -> Self {
		Self {
			socket,
			sink,
			packet_size,
			window_size,
			expected_seq: 0,
			buffer: Reassembly::new(),
			peer_addr: None,
			running: true,
		}
	}

	/// Runs the reassembly loop until a valid END is processed or
	/// `shutdown` is signalled externally.
	pub fn run(&mut self, shutdown: &Shutdown) -> Result<(), RtpError> {
		let mut buf = vec![0u8; HEADER_LEN + self.packet_size];

		while self.running && shutdown.is_running() {
			match self.socket.recv_from(&mut buf) {
				Ok((n, addr)) => {
					if let Ok((header, payload)) = decode(&buf[..n]) {
						self.handle(header.message_type().expect("decode validates type"), header.seq_num(), payload, addr)?;
					}
				}
				Err(err) if is_timeout(&err) => continue,
				Err(err) => return Err(RtpError::SocketIo(err)),
			}
		}

		Ok(())
	}

	fn handle(&mut self, ty: MessageType, seq_num: u32, payload: &[u8], addr: SocketAddr) -> Result<(), RtpError> {
		match ty {
			MessageType::Start => self.on_start(seq_num, addr),
			MessageType::Data => self.on_data(seq_num, payload)?,
			MessageType::End => self.on_end(seq_num)?,
			MessageType::Ack => {}
		}

		Ok(())
	}

	fn on_start(&mut self, seq_num: u32, addr: SocketAddr) {
		info!("Received START from {addr}, resetting session state");
		self.expected_seq = seq_num + 1;
		self.buffer.clear();
		self.peer_addr = Some(addr);
		self.ack(self.expected_seq);
	}

	fn on_data(&mut self, seq_num: u32, payload: &[u8]) -> Result<(), RtpError> {
		let expected = self.expected_seq;
		let window_size = self.window_size as u32;

		if seq_num >= expected + window_size {
			debug!("Dropping out-of-window DATA {seq_num} (expected {expected})");
			self.ack(expected);
			return Ok(());
		}

		if seq_num < expected {
			debug!("Dropping duplicate DATA {seq_num} (expected {expected})");
			self.ack(expected);
			return Ok(());
		}

		if seq_num == expected {
			self.deliver(payload)?;
			self.expected_seq += 1;
			self.ack(self.expected_seq);

			// Each step of the flush gets its own ACK rather than one ACK
			// for the whole run: the sender prunes a window entry only on
			// an ACK that names it directly (`advance_base`), so a single
			// ACK at the end of a multi-packet flush would leave every
			// entry below the last one stuck in the window forever.
			while let Some(buffered) = self.buffer.take(self.expected_seq) {
				self.deliver(&buffered)?;
				self.expected_seq += 1;
				self.ack(self.expected_seq);
			}

			return Ok(());
		}

		// expected < seq_num < expected + window_size: in-window, ahead.
		if !self.buffer.contains(seq_num) {
			self.buffer.insert(seq_num, payload.to_vec());
		}
		self.ack(seq_num + 1);

		Ok(())
	}

	fn on_end(&mut self, seq_num: u32) -> Result<(), RtpError> {
		info!("Received END, transfer complete");
		self.ack(seq_num + 1);
		self.buffer.clear();
		self.running = false;
		self.sink.flush().map_err(RtpError::StdoutWrite)
	}

	fn deliver(&mut self, payload: &[u8]) -> Result<(), RtpError> {
		self.sink.write_all(payload).map_err(RtpError::StdoutWrite)?;
		self.sink.flush().map_err(RtpError::StdoutWrite)
	}

	fn ack(&self, seq_num: u32) {
		let Some(addr) = self.peer_addr else { return };
		let frame = encode(MessageType::Ack, seq_num, &[]);
		if let Err(err) = self.socket.send_to(&frame, addr) {
			warn!("Failed to send ACK {seq_num}: {err}");
		}
	}
}
