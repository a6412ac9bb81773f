use std::time::Duration;

/// Maximum payload byte count per datagram (the operator-configured cap
/// referred to throughout as `PACKET_SIZE`). Both peers of a transfer must
/// agree on this value; `window_size` may differ between them.
pub const PACKET_SIZE: usize = 1024;

/// Interval between retries of the START packet during the handshake.
pub const HANDSHAKE_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Total time budget for completing the handshake before the sender aborts.
pub const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(10);

/// Per-packet retransmission timeout during the bulk transfer.
pub const RETRANSMIT_TIMEOUT: Duration = Duration::from_millis(500);

/// How often the retransmission timer task scans the window.
pub const TIMER_SCAN_PERIOD: Duration = Duration::from_millis(50);

/// Read deadline used by the ACK-intake task, so it can observe shutdown
/// promptly even with no ACKs arriving.
pub const ACK_INTAKE_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// How long the sender waits for the END packet's ACK before giving up and
/// exiting anyway.
pub const TEARDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Cooperative yield used by the transmit engine to avoid busy-spinning
/// while the window is full.
pub const TRANSMIT_YIELD: Duration = Duration::from_millis(10);
