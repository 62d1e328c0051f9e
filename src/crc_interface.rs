// Shared types and capability traits for the sampling engine.

/// Element type of a message. Messages are sequences of 32-bit words.
pub type Word = u32;

pub const WORD_BITS: usize = Word::BITS as usize;
pub const WORD_BYTES: usize = std::mem::size_of::<Word>();

pub type SampleCount = u64;
pub type TaskCount = u32;

// ============================================================================
// Message
// ============================================================================

/// A fixed-length message of random words.
///
/// A worker owns its messages exclusively and reuses the buffers between
/// iterations, so the type exposes in-place operations rather than building
/// a new vector per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    words: Vec<Word>,
}

impl Message {
    /// Create a zeroed message of `len` words
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len],
        }
    }

    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of addressable bits
    pub fn bit_len(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Refill every word from the random source
    pub fn fill_random(&mut self, rng: &mut dyn RandomSource) {
        for word in self.words.iter_mut() {
            *word = rng.next_uniform_u32();
        }
    }

    /// Overwrite this message with the contents of `other` (same length).
    pub fn copy_from(&mut self, other: &Message) {
        self.words.clone_from(&other.words);
    }

    /// Flip a single bit. Bit `i` lives in word `i / 32` at offset `i % 32`.
    pub fn flip_bit(&mut self, bit_index: usize) {
        let word = bit_index / WORD_BITS;
        let offset = bit_index % WORD_BITS;
        self.words[word] ^= 1 << offset;
    }

    /// Serialize to the raw little-endian byte representation checksums run over.
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.words.len() * WORD_BYTES);
        for word in &self.words {
            out.extend_from_slice(&word.to_le_bytes());
        }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

/// Per-worker source of uniform random numbers.
///
/// Implementations are never shared between workers.
pub trait RandomSource {
    fn next_uniform_u32(&mut self) -> u32;

    /// Uniform float in `[0, 1)`
    fn next_uniform_f32(&mut self) -> f32;
}

/// A checksum or CRC algorithm under test.
///
/// Implementations are pure: the same bytes always give the same value.
/// Any lookup tables are built when the provider is constructed and shared
/// by every worker through an `Arc`.
pub trait ChecksumProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Width of the checksum in bits
    fn width(&self) -> u32;

    fn checksum(&self, bytes: &[u8]) -> u64;
}

// ============================================================================
// Results
// ============================================================================

/// Counts produced by one sampling task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerResult {
    pub samples: SampleCount,

    /// Corrupted message differed but the checksum matched
    pub collisions: SampleCount,

    /// Corruption left the message byte-identical
    pub unchanged: SampleCount,

    /// Total bits that differ between original and corrupted messages
    pub flipped_bits: u64,
}

/// Consistent view of the shared counters after a task completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed_tasks: TaskCount,
    pub task_count: TaskCount,
    pub samples: SampleCount,
    pub collisions: SampleCount,
    pub unchanged: SampleCount,
}

impl ProgressSnapshot {
    /// Empirical collision probability, 0 before any samples are counted
    pub fn collision_fraction(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.collisions as f64 / self.samples as f64
        }
    }
}

/// Consumer of progress updates, called once per completed task from
/// whichever worker thread completed it.
pub trait ProgressSink: Send + Sync {
    fn report(&self, algorithm: &str, snapshot: &ProgressSnapshot, bit_errors: u32);

    /// Called once the cycle has fully completed
    fn finish(&self) {}
}

/// Progress sink that discards everything
pub struct NoOpSink;

impl ProgressSink for NoOpSink {
    #[inline(always)]
    fn report(&self, _algorithm: &str, _snapshot: &ProgressSnapshot, _bit_errors: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_bit_addresses_word_and_offset() {
        let mut msg = Message::new(2);
        msg.flip_bit(0);
        msg.flip_bit(33);
        assert_eq!(msg.words(), &[1, 2]);

        msg.flip_bit(33);
        assert_eq!(msg.words(), &[1, 0]);
    }

    #[test]
    fn test_write_bytes_is_little_endian() {
        let msg = Message::from_words(vec![0x0403_0201, 0x0807_0605]);
        let mut bytes = vec![0xFF; 3];
        msg.write_bytes(&mut bytes);
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_collision_fraction_without_samples() {
        let snapshot = ProgressSnapshot::default();
        assert_eq!(snapshot.collision_fraction(), 0.0);

        let snapshot = ProgressSnapshot {
            samples: 8,
            collisions: 2,
            ..Default::default()
        };
        assert_eq!(snapshot.collision_fraction(), 0.25);
    }
}
