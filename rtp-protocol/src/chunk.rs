/// Splits an input byte sequence into chunks of at most `packet_size`
/// bytes each, in order. Chunk `i` (0-based) is assigned seq_num `i + 1`,
/// matching the reference numbering scheme (seq_num 0 is reserved for
/// START).
///
/// `packet_size` is a parameter here (rather than hard-wired to
/// [`crate::config::PACKET_SIZE`]) so that the two peers of a transfer --
/// which must agree on it -- can be exercised at whatever value a given
/// transfer negotiates, including the small values used in tests.
pub fn split(input: &[u8], packet_size: usize) -> Vec<Vec<u8>> {
	assert!(packet_size > 0, "packet_size must be positive");
	input.chunks(packet_size).map(<[u8]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_into_packet_size_chunks() {
		let input = vec![0u8; 10];
		let chunks = split(&input, 3);
		assert_eq!(chunks.len(), (10 + 3 - 1) / 3);
	}

	#[test]
	fn chunk_boundaries_preserve_bytes() {
		let input: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
		let chunks = split(&input, 1472);
		let rejoined: Vec<u8> = chunks.into_iter().flatten().collect();
		assert_eq!(rejoined, input);
	}

	#[test]
	fn empty_input_yields_no_chunks() {
		assert!(split(&[], 16).is_empty());
	}
}
