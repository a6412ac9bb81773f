use std::collections::BTreeMap;
use std::time::{Duration, Instant};

struct Entry {
	frame: Vec<u8>,
	sent_at: Instant,
}

/// The sender's sliding window: a map from seq_num to the serialized
/// packet bytes last sent for it, plus the monotonic timestamp of that
/// send. Invariants (§3): every key lies in `[base, next_seq)`; `next_seq
/// - base <= window_size`; entries are inserted on first transmission and
/// removed only once individually acknowledged; `base` never decreases.
pub struct Window {
	base: u32,
	next_seq: u32,
	entries: BTreeMap<u32, Entry>,
}

impl Window {
	pub fn new(start: u32) -> Self {
		Self { base: start, next_seq: start, entries: BTreeMap::new() }
	}

	pub fn base(&self) -> u32 {
		self.base
	}

	pub fn next_seq(&self) -> u32 {
		self.next_seq
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_full(&self, window_size: usize) -> bool {
		(self.next_seq - self.base) as usize >= window_size
	}

	/// Records a freshly transmitted packet for `self.next_seq()`, then
	/// advances `next_seq`.
	pub fn push(&mut self, frame: Vec<u8>, now: Instant) -> u32 {
		let seq_num = self.next_seq;
		self.entries.insert(seq_num, Entry { frame, sent_at: now });
		self.next_seq += 1;
		seq_num
	}

	/// Applies an ACK with value `ack`: removes only the single entry it
	/// actually acknowledges (`ack - 1`), then slides `base` forward over
	/// whatever run of already-removed entries now sits at the front of
	/// the window. This is deliberately not a cumulative evict of every
	/// key below `ack` -- that would also discard entries `base` has not
	/// reached yet, which is exactly what the receiver's speculative
	/// per-packet ACK for an out-of-order DATA packet looks like: an
	/// ACK(s + 1) that says nothing about the still-outstanding gap below
	/// `s`. Evicting on it would permanently lose that gap packet on a
	/// lossy or reordering channel (§4.4, §9).
	pub fn advance_base(&mut self, ack: u32) {
		if let Some(acked) = ack.checked_sub(1) {
			self.entries.remove(&acked);
		}

		while self.base < self.next_seq && !self.entries.contains_key(&self.base) {
			self.base += 1;
		}
	}

	/// Returns the `(seq_num, frame)` pairs whose last send is older than
	/// `timeout`, marking each as sent `now` as a side effect.
	pub fn due_for_retransmit(&mut self, now: Instant, timeout: Duration) -> Vec<(u32, Vec<u8>)> {
		let mut due = Vec::new();

		for (&seq, entry) in self.entries.iter_mut() {
			if now.duration_since(entry.sent_at) >= timeout {
				entry.sent_at = now;
				due.push((seq, entry.frame.clone()));
			}
		}

		due
	}
}
