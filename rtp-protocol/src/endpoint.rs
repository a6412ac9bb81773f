use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// The datagram transport collaborator described in §6: an unreliable
/// send/receive primitive the core protocol is built against, without
/// caring whether it is backed by a real socket or, in tests, an
/// in-memory fault-injecting channel.
pub trait Endpoint: Send + Sync {
	fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<()>;

	/// Blocks for at most the endpoint's current read timeout. Returning
	/// `ErrorKind::WouldBlock` or `ErrorKind::TimedOut` signals "nothing
	/// arrived in time", not a fatal error.
	fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Endpoint for std::net::UdpSocket {
	fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<()> {
		std::net::UdpSocket::send_to(self, buf, addr).map(|_| ())
	}

	fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
		std::net::UdpSocket::recv_from(self, buf)
	}

	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		std::net::UdpSocket::set_read_timeout(self, timeout)
	}
}

/// Returns whether an I/O error represents a benign read timeout rather
/// than a fatal failure.
pub fn is_timeout(err: &io::Error) -> bool {
	matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
