//! Random sources for sampling workers.
//!
//! Every task gets its own [`SeededRandom`]. Task seeds are drawn from a
//! master generator in task order, so a fixed master seed reproduces every
//! sample stream no matter how the pool interleaves the tasks.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::crc_interface::RandomSource;

pub type Seed = [u8; 32];

/// `StdRng`-backed random source owned by a single worker
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: Seed) -> Self {
        Self {
            rng: StdRng::from_seed(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    #[inline]
    fn next_uniform_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    #[inline]
    fn next_uniform_f32(&mut self) -> f32 {
        // Standard distribution for f32 is [0, 1)
        self.rng.gen::<f32>()
    }
}

/// Use the configured seed or generate one from entropy
pub fn resolve_seed(seed: Option<Seed>) -> Seed {
    seed.unwrap_or_else(|| {
        let mut temp_rng = StdRng::from_entropy();
        let mut seed = [0u8; 32];
        temp_rng.fill_bytes(&mut seed);
        seed
    })
}

/// Draw one seed per task from the master generator
pub fn derive_task_seeds(master: &mut StdRng, tasks: usize) -> Vec<Seed> {
    (0..tasks)
        .map(|_| {
            let mut seed = [0u8; 32];
            master.fill_bytes(&mut seed);
            seed
        })
        .collect()
}

/// Parse a hex seed (optionally `0x` prefixed). Short input is zero padded.
pub fn parse_seed_hex(hex: &str) -> Option<Seed> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.is_empty() || hex.len() > 64 || hex.len() % 2 != 0 {
        return None;
    }

    let mut seed = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let byte_str = std::str::from_utf8(chunk).ok()?;
        seed[i] = u8::from_str_radix(byte_str, 16).ok()?;
    }
    Some(seed)
}

pub fn format_seed_hex(seed: &Seed) -> String {
    let mut out = String::with_capacity(2 + seed.len() * 2);
    out.push_str("0x");
    for byte in seed {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
