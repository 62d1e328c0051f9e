//! Bit-flip channel model
//!
//! Each of `bit_errors` independent trials fires with `probability`. A trial
//! that fires flips one uniformly chosen bit of the message. The same bit can
//! be chosen twice, in which case the flips cancel: this models a noisy
//! channel, not a fixed Hamming distance.

use crate::crc_interface::{Message, RandomSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorModel {
    bit_errors: u32,
    probability: f32,
}

impl ErrorModel {
    pub fn new(bit_errors: u32, probability: f32) -> Self {
        Self {
            bit_errors,
            probability,
        }
    }

    pub fn bit_errors(&self) -> u32 {
        self.bit_errors
    }

    pub fn probability(&self) -> f32 {
        self.probability
    }

    /// Copy `original` into `corrupted` and apply the channel to the copy.
    ///
    /// Draw order per trial is fixed: one float for the gate, then one word
    /// for the bit index if the gate passed.
    pub fn inject_into(
        &self,
        original: &Message,
        corrupted: &mut Message,
        rng: &mut dyn RandomSource,
    ) {
        corrupted.copy_from(original);

        let bit_len = original.bit_len();
        if bit_len == 0 {
            return;
        }

        for _ in 0..self.bit_errors {
            if rng.next_uniform_f32() <= self.probability {
                let bit_index = rng.next_uniform_u32() as usize % bit_len;
                corrupted.flip_bit(bit_index);
            }
        }
    }

    /// Allocating form of [`ErrorModel::inject_into`]
    pub fn inject(&self, original: &Message, rng: &mut dyn RandomSource) -> Message {
        let mut corrupted = original.clone();
        self.inject_into(original, &mut corrupted, rng);
        corrupted
    }
}

/// XOR of the two messages: the bits the channel changed.
///
/// This is as far as correction goes; nothing ever uses the pattern to
/// repair a message.
pub fn error_pattern(original: &Message, corrupted: &Message) -> Message {
    let words = original
        .words()
        .iter()
        .zip(corrupted.words())
        .map(|(a, b)| a ^ b)
        .collect();
    Message::from_words(words)
}

/// Number of differing bits between two equal-length messages
pub fn hamming_distance(original: &Message, corrupted: &Message) -> u32 {
    original
        .words()
        .iter()
        .zip(corrupted.words())
        .map(|(a, b)| (a ^ b).count_ones())
        .sum()
}
