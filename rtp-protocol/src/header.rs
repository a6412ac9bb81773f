use log::trace;
use utils::bytes::cast::{cast, cast_mut};
use utils::bytes::Cast;
use utils::endian::u32be;
use utils::error::*;

use crate::checksum;

/// Size in bytes of a [`PacketHeader`] on the wire.
pub const HEADER_LEN: usize = 16;

/// The four message kinds that appear in the `type` field of a header.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MessageType {
	Start,
	End,
	Data,
	Ack,
}

impl MessageType {
	fn from_u32(value: u32) -> Option<Self> {
		match value {
			0 => Some(Self::Start),
			1 => Some(Self::End),
			2 => Some(Self::Data),
			3 => Some(Self::Ack),
			_ => None,
		}
	}

	fn as_u32(self) -> u32 {
		match self {
			Self::Start => 0,
			Self::End => 1,
			Self::Data => 2,
			Self::Ack => 3,
		}
	}
}

/// The fixed 16-byte header transmitted in front of every datagram.
///
/// All four fields are 32-bit, big-endian (network byte order), which is
/// what `u32be` encodes as its wire representation.
#[derive(Clone, Copy, Cast)]
#[repr(C)]
pub struct PacketHeader {
	ty: u32be,
	seq_num: u32be,
	length: u32be,
	checksum: u32be,
}

impl PacketHeader {
	fn new(ty: MessageType, seq_num: u32, length: u32) -> Self {
		Self {
			ty: ty.as_u32().into(),
			seq_num: seq_num.into(),
			length: length.into(),
			checksum: 0u32.into(),
		}
	}

	pub fn message_type(&self) -> Option<MessageType> {
		MessageType::from_u32(self.ty.get())
	}

	pub fn seq_num(&self) -> u32 {
		self.seq_num.get()
	}

	pub fn length(&self) -> u32 {
		self.length.get()
	}
}

/// Serializes a header and optional payload into a single wire frame,
/// computing and embedding the checksum per §4.1: the checksum field is
/// zeroed, the checksum is computed over `header_bytes || payload_bytes`,
/// and the result is written back into the field.
pub fn encode(ty: MessageType, seq_num: u32, payload: &[u8]) -> Vec<u8> {
	let header = PacketHeader::new(ty, seq_num, payload.len() as u32);

	let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
	frame.extend_from_slice(cast::<[u8; HEADER_LEN], _>(&header));
	frame.extend_from_slice(payload);

	let csum = checksum::compute(&frame);
	cast_mut::<PacketHeader, _>(&mut frame[..HEADER_LEN]).checksum = u32::from_be_bytes(csum).into();

	frame
}

/// Parses a wire frame into a header and payload, validating its checksum.
///
/// Returns `Err(())` on a short read, an unrecognized type, or a checksum
/// mismatch -- every such packet is silently dropped by both endpoints. The
/// `()` error carries no information of its own; by the time it is
/// returned, a `trace!` at the call site below has already recorded why.
pub fn decode(bytes: &[u8]) -> Result<(PacketHeader, &[u8])> {
	if bytes.len() < HEADER_LEN {
		trace!("Dropping short datagram ({} bytes)", bytes.len());
		return Err(());
	}

	let header = *cast::<PacketHeader, _>(&bytes[..HEADER_LEN]);
	if header.message_type().is_none() {
		trace!("Dropping datagram with unrecognized type {}", header.ty.get());
		return Err(());
	}

	let length = header.length() as usize;
	if bytes.len() < HEADER_LEN + length {
		trace!("Dropping truncated datagram (header claims {length} bytes, got {})", bytes.len() - HEADER_LEN);
		return Err(());
	}

	let payload = &bytes[HEADER_LEN..HEADER_LEN + length];

	let mut check_frame = Vec::with_capacity(HEADER_LEN + length);
	check_frame.extend_from_slice(&bytes[..HEADER_LEN]);
	cast_mut::<PacketHeader, _>(&mut check_frame[..HEADER_LEN]).checksum = 0u32.into();
	check_frame.extend_from_slice(payload);

	let expected = u32::from_be_bytes(checksum::compute(&check_frame));
	if expected != header.checksum.get() {
		trace!("Dropping datagram with invalid checksum");
		return Err(());
	}

	Ok((header, payload))
}
