use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};

use crate::config::{
	ACK_INTAKE_READ_TIMEOUT, HANDSHAKE_DEADLINE, HANDSHAKE_RETRY_INTERVAL, RETRANSMIT_TIMEOUT, TEARDOWN_TIMEOUT, TIMER_SCAN_PERIOD, TRANSMIT_YIELD,
};
use crate::endpoint::{is_timeout, Endpoint};
use crate::error::RtpError;
use crate::header::{decode, encode, MessageType};
use crate::window::Window;
use runtime::Shutdown;

/// Mutable state shared by the transmit engine, the ACK-intake task, and
/// the retransmission timer task. A single mutex is the "explicit mutex"
/// called for in §9: `window`, `base`, and `next_seq` live together on
/// [`Window`] and are always inspected under this one lock.
struct State {
	window: Window,
	num_chunks: u32,
	end_acked: bool,
}

/// Owns everything three sender tasks need: the shared socket, the peer
/// address ACKs are expected from, and the guarded window state. This is
/// the `SenderSession` value called for in §9, replacing ad hoc global
/// mutable state with a single handle the background tasks share.
pub struct SenderSession<E: Endpoint> {
	socket: E,
	peer: SocketAddr,
	state: Mutex<State>,
}

impl<E: Endpoint + 'static> SenderSession<E> {
	/// Runs a complete transfer: handshake, pipelined bulk transfer, and
	/// teardown. Blocks until the transfer either completes or the
	/// handshake deadline expires.
	pub fn run(socket: E, peer: SocketAddr, input: &[u8], packet_size: usize, window_size: usize, shutdown: Shutdown) -> Result<(), RtpError> {
		socket.set_read_timeout(Some(HANDSHAKE_RETRY_INTERVAL)).map_err(RtpError::SocketIo)?;
		Self::handshake(&socket, peer)?;

		socket.set_read_timeout(Some(ACK_INTAKE_READ_TIMEOUT)).map_err(RtpError::SocketIo)?;
		Self::drain_residual_acks(&socket);

		let chunks = crate::chunk::split(input, packet_size);
		let num_chunks = chunks.len() as u32;

		let session = Arc::new(Self {
			socket,
			peer,
			state: Mutex::new(State { window: Window::new(1), num_chunks, end_acked: false }),
		});

		let ack_shutdown = shutdown.clone();
		let ack_session = session.clone();
		let ack_intake = thread::spawn(move || ack_session.ack_intake(ack_shutdown));

		let timer_shutdown = shutdown.clone();
		let timer_session = session.clone();
		let timer = thread::spawn(move || timer_session.retransmit_timer(timer_shutdown));

		session.transmit(&chunks, window_size, &shutdown);
		session.teardown(&shutdown);

		shutdown.stop();
		let _ = ack_intake.join();
		let _ = timer.join();

		Ok(())
	}

	/// Phase 1: send START, retry on timeout, until an ACK for seq_num 1
	/// arrives or the overall deadline expires.
	fn handshake(socket: &E, peer: SocketAddr) -> Result<(), RtpError> {
		let deadline = Instant::now() + HANDSHAKE_DEADLINE;
		let mut buf = vec![0u8; 64];

		debug!(
			"Starting handshake with {peer}, retrying every {} up to a {} deadline",
			runtime::time::human(HANDSHAKE_RETRY_INTERVAL),
			runtime::time::human(HANDSHAKE_DEADLINE)
		);

		loop {
			if Instant::now() >= deadline {
				return Err(RtpError::HandshakeTimeout);
			}

			let frame = encode(MessageType::Start, 0, &[]);
			if let Err(err) = socket.send_to(&frame, peer) {
				warn!("Failed to send START: {err}");
			}

			match socket.recv_from(&mut buf) {
				Ok((n, _)) => {
					if let Ok((header, _)) = decode(&buf[..n]) {
						if header.message_type() == Some(MessageType::Ack) && header.seq_num() == 1 {
							debug!("Handshake acknowledged");
							return Ok(());
						}
					}
				}
				Err(err) if is_timeout(&err) => continue,
				Err(err) => warn!("Error while awaiting handshake ACK: {err}"),
			}
		}
	}

	/// Reads with a short timeout until an empty read occurs, so stray
	/// handshake ACKs still sitting in the kernel buffer don't corrupt
	/// Phase 2's window accounting.
	fn drain_residual_acks(socket: &E) {
		let mut buf = vec![0u8; 64];
		while socket.recv_from(&mut buf).is_ok() {}
	}

	/// Phase 2: fills the window with DATA packets as space frees up,
	/// yielding briefly between passes.
	fn transmit(self: &Arc<Self>, chunks: &[Vec<u8>], window_size: usize, shutdown: &Shutdown) {
		let num_chunks = chunks.len() as u32;

		loop {
			let base = {
				let mut state = self.state.lock().expect("sender state poisoned");

				while !state.window.is_full(window_size) && state.window.next_seq() <= num_chunks {
					let seq_num = state.window.next_seq();
					let payload = &chunks[(seq_num - 1) as usize];
					let frame = encode(MessageType::Data, seq_num, payload);

					if let Err(err) = self.socket.send_to(&frame, self.peer) {
						warn!("Failed to send DATA {seq_num}: {err}");
					}

					state.window.push(frame, Instant::now());
				}

				state.window.base()
			};

			if base > num_chunks || !shutdown.is_running() {
				break;
			}

			thread::sleep(TRANSMIT_YIELD);
		}
	}

	/// Phase 3: sends END, registers it for retransmission like any other
	/// outstanding packet, and waits (briefly) for its ACK.
	fn teardown(self: &Arc<Self>, shutdown: &Shutdown) {
		let seq_num = {
			let mut state = self.state.lock().expect("sender state poisoned");
			let seq_num = state.window.next_seq();
			let frame = encode(MessageType::End, seq_num, &[]);

			if let Err(err) = self.socket.send_to(&frame, self.peer) {
				warn!("Failed to send END: {err}");
			}

			state.window.push(frame, Instant::now());
			seq_num
		};

		debug!("Sent END with seq_num {seq_num}, awaiting its ACK");

		let deadline = Instant::now() + TEARDOWN_TIMEOUT;
		loop {
			let acked = self.state.lock().expect("sender state poisoned").end_acked;
			if acked {
				info!("Transfer complete");
				return;
			}
			if Instant::now() >= deadline || !shutdown.is_running() {
				warn!("END ACK not received within the teardown timeout, exiting anyway");
				return;
			}
			thread::sleep(TRANSMIT_YIELD);
		}
	}

	/// ACK-intake task (§4.4): removes the single entry each ACK actually
	/// acknowledges, lets `base` slide forward over any already-removed
	/// entries, and detects the END ACK. A stale ACK below the current
	/// `base` is dropped before reaching [`Window::advance_base`].
	fn ack_intake(self: Arc<Self>, shutdown: Shutdown) {
		self.socket.set_read_timeout(Some(ACK_INTAKE_READ_TIMEOUT)).ok();
		let mut buf = vec![0u8; 64];

		while shutdown.is_running() {
			match self.socket.recv_from(&mut buf) {
				Ok((n, _)) => {
					let Ok((header, _)) = decode(&buf[..n]) else { continue };
					if header.message_type() != Some(MessageType::Ack) {
						continue;
					}

					let ack = header.seq_num();
					let mut state = self.state.lock().expect("sender state poisoned");

					if ack < state.window.base() {
						continue;
					}

					state.window.advance_base(ack);

					if ack == state.num_chunks + 2 {
						state.end_acked = true;
						return;
					}
				}
				Err(err) if is_timeout(&err) => continue,
				Err(err) => {
					warn!("ACK-intake read failed: {err}");
					return;
				}
			}
		}
	}

	/// Retransmission timer task (§4.5): resends every currently
	/// outstanding packet whose last send is older than the per-packet
	/// timeout, independently of every other outstanding packet.
	fn retransmit_timer(self: Arc<Self>, shutdown: Shutdown) {
		while shutdown.is_running() {
			thread::sleep(TIMER_SCAN_PERIOD);

			let due = {
				let mut state = self.state.lock().expect("sender state poisoned");
				state.window.due_for_retransmit(Instant::now(), RETRANSMIT_TIMEOUT)
			};

			for (seq_num, frame) in due {
				debug!("Retransmitting seq_num {seq_num}");
				if let Err(err) = self.socket.send_to(&frame, self.peer) {
					warn!("Failed to retransmit {seq_num}: {err}");
				}
			}
		}
	}
}
