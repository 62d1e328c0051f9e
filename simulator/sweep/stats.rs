//! Sweep results

use crc_analysis::{format_seed_hex, Seed};

/// One sweep point
#[derive(Debug, Clone)]
pub struct SweepRow {
    pub bit_errors: u32,
    pub samples: u64,
    pub collisions: u64,
    pub unchanged: u64,
    pub samples_per_second: f64,
}

impl SweepRow {
    pub fn collision_fraction(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.collisions as f64 / self.samples as f64
        }
    }
}

/// Result of a whole sweep file
#[derive(Debug, Clone)]
pub struct SweepResult {
    pub name: String,
    pub algorithm: String,
    pub seed_used: Seed,
    pub rows: Vec<SweepRow>,
}

impl SweepResult {
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║  {}  {}", self.name, " ".repeat(54_usize.saturating_sub(self.name.len())));
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("  Algorithm: {}", self.algorithm);
        println!("  Seed: {}\n", format_seed_hex(&self.seed_used));

        println!(
            "  {:>10}  {:>12}  {:>12}  {:>12}  {:>14}  {:>12}",
            "error bits", "samples", "collisions", "unchanged", "fraction", "samples/s"
        );
        for row in &self.rows {
            println!(
                "  {:>10}  {:>12}  {:>12}  {:>12}  {:>14.9}  {:>12.0}",
                row.bit_errors,
                row.samples,
                row.collisions,
                row.unchanged,
                row.collision_fraction(),
                row.samples_per_second
            );
        }
        println!();
    }
}
