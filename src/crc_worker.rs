//! Sampling worker: generate, corrupt, checksum both, compare.

use std::sync::Arc;

use crate::crc_checksum::checksum_message;
use crate::crc_error_model::{hamming_distance, ErrorModel};
use crate::crc_interface::{ChecksumProvider, Message, RandomSource, SampleCount, WorkerResult};

/// Outcome of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The channel left the message byte-identical. Not an error at all.
    Unchanged,

    /// The message changed and the checksum changed with it
    Detected,

    /// The message changed but the checksum did not
    Collision,
}

/// Per-task unit of work.
///
/// Owns its message buffers and touches no shared state; the caller
/// publishes the returned [`WorkerResult`].
pub struct SamplingWorker {
    provider: Arc<dyn ChecksumProvider>,
    model: ErrorModel,
    original: Message,
    corrupted: Message,
    scratch: Vec<u8>,
    last_checksums: (u64, u64),
}

impl SamplingWorker {
    pub fn new(provider: Arc<dyn ChecksumProvider>, model: ErrorModel, message_length: usize) -> Self {
        Self {
            provider,
            model,
            original: Message::new(message_length),
            corrupted: Message::new(message_length),
            scratch: Vec::new(),
            last_checksums: (0, 0),
        }
    }

    /// Run one sample
    pub fn sample(&mut self, rng: &mut dyn RandomSource) -> SampleOutcome {
        self.original.fill_random(rng);
        self.model
            .inject_into(&self.original, &mut self.corrupted, rng);

        let provider = self.provider.as_ref();
        let original_crc = checksum_message(provider, &self.original, &mut self.scratch);
        let corrupted_crc = checksum_message(provider, &self.corrupted, &mut self.scratch);
        self.last_checksums = (original_crc, corrupted_crc);

        if self.original == self.corrupted {
            SampleOutcome::Unchanged
        } else if original_crc == corrupted_crc {
            SampleOutcome::Collision
        } else {
            SampleOutcome::Detected
        }
    }

    /// Run `samples` iterations and return the local counts
    pub fn run(&mut self, samples: SampleCount, rng: &mut dyn RandomSource) -> WorkerResult {
        let mut result = WorkerResult::default();

        for _ in 0..samples {
            match self.sample(rng) {
                SampleOutcome::Unchanged => result.unchanged += 1,
                SampleOutcome::Collision => result.collisions += 1,
                SampleOutcome::Detected => {}
            }
            result.flipped_bits += hamming_distance(&self.original, &self.corrupted) as u64;
            result.samples += 1;
        }

        result
    }

    /// Original message of the last sample
    pub fn original(&self) -> &Message {
        &self.original
    }

    /// Corrupted message of the last sample
    pub fn corrupted(&self) -> &Message {
        &self.corrupted
    }

    /// (original, corrupted) checksums of the last sample
    pub fn last_checksums(&self) -> (u64, u64) {
        self.last_checksums
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc_checksum::AlgorithmCatalog;
    use crate::crc_random::testing::ScriptedRandom;
    use crate::crc_random::SeededRandom;

    fn worker(name: &str, bit_errors: u32, probability: f32, len: usize) -> SamplingWorker {
        let provider = AlgorithmCatalog::standard().provider(name).unwrap();
        SamplingWorker::new(provider, ErrorModel::new(bit_errors, probability), len)
    }

    #[test]
    fn test_single_bit_xor8_scenario() {
        let mut w = worker("xor8", 1, 1.0, 1);
        let mut rng = SeededRandom::from_seed([11u8; 32]);
        let mut collisions = 0;

        for _ in 0..4 {
            let outcome = w.sample(&mut rng);
            assert_eq!(hamming_distance(w.original(), w.corrupted()), 1);

            let (a, b) = w.last_checksums();
            match outcome {
                SampleOutcome::Collision => {
                    assert_eq!(a, b);
                    collisions += 1;
                }
                SampleOutcome::Detected => assert_ne!(a, b),
                SampleOutcome::Unchanged => panic!("single flip cannot leave message unchanged"),
            }
        }
        assert!(collisions <= 4);

        let mut w = worker("xor8", 1, 1.0, 1);
        let result = w.run(4, &mut SeededRandom::from_seed([11u8; 32]));
        assert_eq!(result.samples, 4);
        assert_eq!(result.collisions, collisions);
        assert_eq!(result.flipped_bits, 4);
    }

    #[test]
    fn test_single_bit_never_escapes_xor8() {
        // A single flipped bit always changes the byte parity fold
        let mut w = worker("xor8", 1, 1.0, 4);
        let result = w.run(1000, &mut SeededRandom::from_seed([2u8; 32]));
        assert_eq!(result.samples, 1000);
        assert_eq!(result.collisions, 0);
        assert_eq!(result.unchanged, 0);
    }

    #[test]
    fn test_zero_bit_errors_never_collide() {
        for name in ["crc4_itu", "xor8_masked", "crc32"] {
            let mut w = worker(name, 0, 1.0, 2);
            let result = w.run(500, &mut SeededRandom::from_seed([4u8; 32]));
            assert_eq!(result.samples, 500);
            assert_eq!(result.collisions, 0, "{}", name);
            assert_eq!(result.unchanged, 500);
        }
    }

    #[test]
    fn test_masked_top_bit_is_a_collision() {
        // Message word 0, then flip bit 7: only the masked-out bit changes
        let mut rng = ScriptedRandom::new(vec![0, 7], vec![0.0]);
        let mut w = worker("xor8_masked", 1, 1.0, 1);

        assert_eq!(w.sample(&mut rng), SampleOutcome::Collision);
        assert_eq!(w.corrupted().words(), &[0x80]);
    }

    #[test]
    fn test_scripted_detection() {
        let mut rng = ScriptedRandom::new(vec![0, 0], vec![0.0]);
        let mut w = worker("xor8", 1, 1.0, 1);

        assert_eq!(w.sample(&mut rng), SampleOutcome::Detected);
        assert_eq!(w.last_checksums(), (0, 1));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let mut a = worker("crc5_usb", 3, 0.8, 2);
        let mut b = worker("crc5_usb", 3, 0.8, 2);

        let ra = a.run(2000, &mut SeededRandom::from_seed([8u8; 32]));
        let rb = b.run(2000, &mut SeededRandom::from_seed([8u8; 32]));
        assert_eq!(ra, rb);
        assert!(ra.collisions <= ra.samples);
        // A 5-bit CRC must miss some multi-bit errors in 2000 samples
        assert!(ra.collisions > 0);
    }
}
