use std::collections::BTreeMap;

/// The receiver's out-of-order arrival buffer: a map from seq_num to
/// payload, holding only seq_nums strictly greater than `expected_seq`
/// (§3). The caller is responsible for enforcing the window bound before
/// inserting; this type only maintains the map itself.
#[derive(Default)]
pub struct Reassembly {
	buffer: BTreeMap<u32, Vec<u8>>,
}

impl Reassembly {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, seq_num: u32) -> bool {
		self.buffer.contains_key(&seq_num)
	}

	/// Records an out-of-order payload if it isn't already buffered.
	pub fn insert(&mut self, seq_num: u32, payload: Vec<u8>) {
		self.buffer.entry(seq_num).or_insert(payload);
	}

	/// Removes and returns the payload for `seq_num`, if buffered.
	pub fn take(&mut self, seq_num: u32) -> Option<Vec<u8>> {
		self.buffer.remove(&seq_num)
	}

	pub fn clear(&mut self) {
		self.buffer.clear();
	}
}
