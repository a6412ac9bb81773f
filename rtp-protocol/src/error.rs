use thiserror::Error;

/// The propagating error tier: conditions that abort a transfer and are
/// surfaced to the caller (and, at the binary layer, as a process exit
/// code), as opposed to the silent-drop tier used for malformed or
/// stale packets (§7).
#[derive(Debug, Error)]
pub enum RtpError {
	#[error("handshake did not complete within the deadline")]
	HandshakeTimeout,

	#[error("failed to bind socket: {0}")]
	SocketBind(#[source] std::io::Error),

	#[error("failed to read standard input: {0}")]
	StdinRead(#[source] std::io::Error),

	#[error("failed to write standard output: {0}")]
	StdoutWrite(#[source] std::io::Error),

	#[error("socket I/O failed: {0}")]
	SocketIo(#[source] std::io::Error),
}
