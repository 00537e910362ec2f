//! Standalone analytical benchmark runner.

use std::fs;
use std::path::PathBuf;

use ot_bench::{BenchOptions, default_benchmarks, run_suite};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional path for a JSON copy of the table.
    let json_out = std::env::args().nth(1).map(PathBuf::from);

    println!("Orbitherm Analytical Benchmarks");
    println!("===============================\n");

    let benchmarks = default_benchmarks();
    for case in &benchmarks {
        println!("  {:<28} {}", case.id, case.description);
    }
    println!();

    let table = run_suite(&benchmarks, &BenchOptions::default());
    print!("{table}");

    if let Some(path) = json_out {
        fs::write(&path, serde_json::to_string_pretty(&table)?)?;
        println!("\nResults written to {}", path.display());
    }

    if !table.all_pass() {
        return Err(format!("{} benchmark(s) failed", table.failures().count()).into());
    }
    Ok(())
}
