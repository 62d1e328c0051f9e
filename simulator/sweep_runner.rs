// Sweep Runner - Load and execute bit-error sweep YAML files
//
// Usage:
//   cargo run --release --bin sweep_runner sweeps/crc16.yaml
//   cargo run --release --bin sweep_runner sweeps/  (runs all .yaml files in directory)
//   cargo run --release --bin sweep_runner sweeps/crc16.yaml --seed 0x1234...

mod sweep;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crc_analysis::{parse_seed_hex, Seed};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use sweep::{SweepFile, SweepRunner};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <sweep.yaml | directory/> [--seed SEED_HEX]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} sweeps/crc16.yaml", args[0]);
        eprintln!("  {} sweeps/", args[0]);
        eprintln!("  {} sweeps/crc16.yaml --seed 0x123456...", args[0]);
        std::process::exit(1);
    }

    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .init()
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialise logger: {}", e);
            std::process::exit(1);
        });

    let path = Path::new(&args[1]);

    // Parse optional seed
    let seed: Option<Seed> = if args.len() >= 4 && args[2] == "--seed" {
        Some(parse_seed_hex(&args[3]).unwrap_or_else(|| {
            eprintln!("Invalid hex seed: {}", args[3]);
            std::process::exit(1);
        }))
    } else {
        None
    };

    if path.is_file() {
        run_sweep_file(path, seed);
    } else if path.is_dir() {
        run_sweep_directory(path, seed);
    } else {
        eprintln!("Error: Path does not exist: {}", path.display());
        std::process::exit(1);
    }
}

fn run_sweep_directory(dir: &Path, seed: Option<Seed>) {
    let mut sweeps: Vec<PathBuf> = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|s| s.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                sweeps.push(path);
            }
        }
    }

    sweeps.sort();

    if sweeps.is_empty() {
        eprintln!("No .yaml files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("Found {} sweep(s) to run\n", sweeps.len());

    for (i, sweep_path) in sweeps.iter().enumerate() {
        println!("\n{}/{} Running: {}\n", i + 1, sweeps.len(), sweep_path.display());
        run_sweep_file(sweep_path, seed);
    }
}

fn run_sweep_file(path: &Path, seed: Option<Seed>) {
    println!("Loading sweep from: {}", path.display());

    let sweep = SweepFile::load(path).unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        std::process::exit(1);
    });

    if let Some(ref desc) = sweep.meta.description {
        println!("{}\n", desc);
    }

    let result = SweepRunner::new(sweep, seed).run().unwrap_or_else(|e| {
        eprintln!("Sweep failed: {:#}", e);
        std::process::exit(1);
    });

    result.print_summary();
}
