use crc_analysis::crc_checksum::checksum_message;
use crc_analysis::{
    AlgorithmCatalog, AnalysisRunner, Message, NoOpSink, RandomSource, RunConfig, SeededRandom,
};
use std::sync::Arc;
use std::time::Instant;

/// Benchmark checksum throughput per algorithm and one sampling cycle
fn main() {
    // Suppress info logs for cleaner output
    let _ = simple_logger::init_with_level(log::Level::Error);

    println!("\n=== Checksum Adapter Throughput ===\n");

    let catalog = AlgorithmCatalog::standard();
    let mut rng = SeededRandom::from_seed([0x5Eu8; 32]);
    let mut message = Message::new(4);
    let mut scratch = Vec::new();
    let iterations = 200_000;

    for name in catalog.names() {
        let provider = match catalog.provider(name) {
            Ok(provider) => provider,
            Err(e) => {
                println!("  {:<18} skipped: {}", name, e);
                continue;
            }
        };

        let start = Instant::now();
        let mut sink = 0u64;
        for _ in 0..iterations {
            message.fill_random(&mut rng);
            sink ^= checksum_message(provider.as_ref(), &message, &mut scratch);
        }
        let elapsed = start.elapsed().as_secs_f64();

        println!(
            "  {:<18} {:>2} bits  {:>8.1} ns/msg  (fold {:x})",
            name,
            provider.width(),
            elapsed * 1e9 / iterations as f64,
            sink
        );
    }

    // Random source cost alone, for reference
    let start = Instant::now();
    let mut acc = 0u32;
    for _ in 0..iterations * 4 {
        acc ^= rng.next_uniform_u32();
    }
    println!(
        "\n  rng word: {:.1} ns ({:x})",
        start.elapsed().as_secs_f64() * 1e9 / (iterations * 4) as f64,
        acc
    );

    println!("\n=== Sampling Cycle ===\n");

    for (name, bit_errors) in [("crc8", 3), ("crc16_arc", 3), ("crc32", 3), ("xor8", 2)] {
        let config = RunConfig {
            algorithm: name.to_string(),
            message_length: 4,
            total_samples: 2_000_000,
            task_count: 200,
            bit_error_count: bit_errors,
            seed: Some([1u8; 32]),
            ..Default::default()
        };

        let mut runner = match AnalysisRunner::with_sink(config, Arc::new(NoOpSink)) {
            Ok(runner) => runner,
            Err(e) => {
                println!("  {} skipped: {}", name, e);
                continue;
            }
        };

        match runner.run_cycle() {
            Ok(report) => println!(
                "  {:<10} {} error bits: {:>12.0} samples/s, fraction {:.9}",
                name,
                bit_errors,
                report.samples_per_second(),
                report.collision_fraction()
            ),
            Err(e) => println!("  {} failed: {}", name, e),
        }
    }
    println!();
}
