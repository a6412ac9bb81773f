#![feature(slice_as_chunks)]

//! The reliable, in-order, byte-stream delivery protocol this workspace's
//! `rtp-sender` and `rtp-receiver` binaries speak over a plain UDP socket.
//!
//! The wire format, window and reassembly bookkeeping, and the sender's
//! three concurrent tasks live here; argument parsing, logging, and
//! standard-I/O plumbing are the binaries' concern.

pub mod checksum;
pub mod chunk;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod header;
pub mod reassembly;
pub mod session;
pub mod window;

pub use endpoint::Endpoint;
pub use error::RtpError;
pub use header::{decode, encode, MessageType, PacketHeader};
pub use session::{ReceiverSession, SenderSession};
