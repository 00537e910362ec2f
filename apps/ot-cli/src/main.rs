use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use ot_engine::{RetryPolicy, RunProgressEvent, RunStage, run_with_progress, run_with_retry};
use ot_network::{OrbitalConfig, SimulationKind, SurfaceType, load_case, save_case};
use ot_orbit::OrbitEnvironment;
use ot_results::{ResultSnapshot, summary_csv, summary_json};
use ot_viewfactor::{Geometry, RayPreset, ViewFactorJob, ViewFactorRequest, apply_view_factors};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "ot-cli")]
#[command(about = "Orbitherm CLI - spacecraft thermal network simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file (network and simulation settings)
    Validate {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
    },
    /// Run the simulation described by a case file
    Run {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
        /// Override the simulation kind from the case file
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// Retry once with smaller steps after a numerical instability
        #[arg(long)]
        retry: bool,
        /// Write the full result snapshot as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export a per-node summary of a saved result snapshot
    Export {
        /// Result snapshot JSON written by `run --output`
        result_path: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the analytical benchmark suite
    Bench {
        /// Rays for the view-factor benchmark
        #[arg(long)]
        rays: Option<usize>,
    },
    /// Print orbital environment samples over one orbit
    Orbit {
        /// Altitude in km
        #[arg(long)]
        altitude: f64,
        /// Inclination in degrees
        #[arg(long, default_value_t = 0.0)]
        inclination: f64,
        /// Right ascension of the ascending node in degrees
        #[arg(long, default_value_t = 0.0)]
        raan: f64,
        /// Epoch (RFC 3339); defaults to now
        #[arg(long)]
        epoch: Option<DateTime<Utc>>,
        /// Samples per orbit
        #[arg(long, default_value_t = 24)]
        samples: usize,
    },
    /// Estimate a view factor between two surfaces
    ViewFactor {
        /// Geometry YAML or JSON file
        geometry_path: PathBuf,
        /// Emitting surface id
        from: String,
        /// Receiving surface id
        to: String,
        #[arg(long, value_enum, default_value_t = PresetArg::Default)]
        preset: PresetArg,
        /// Explicit ray count (overrides the preset)
        #[arg(long)]
        rays: Option<usize>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Case file whose radiation conductors receive the estimate
        #[arg(long, requires = "write")]
        apply_to: Option<PathBuf>,
        /// Where to save the updated case
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Steady,
    Transient,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Fast,
    Default,
    High,
}

impl From<PresetArg> for RayPreset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Fast => RayPreset::Fast,
            PresetArg::Default => RayPreset::Default,
            PresetArg::High => RayPreset::High,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run {
            case_path,
            kind,
            retry,
            output,
        } => cmd_run(&case_path, kind, retry, output.as_deref()),
        Commands::Export {
            result_path,
            format,
            output,
        } => cmd_export(&result_path, format, output.as_deref()),
        Commands::Bench { rays } => cmd_bench(rays),
        Commands::Orbit {
            altitude,
            inclination,
            raan,
            epoch,
            samples,
        } => cmd_orbit(
            OrbitalConfig {
                altitude,
                inclination,
                raan,
                epoch: epoch.unwrap_or_else(Utc::now),
            },
            samples,
        ),
        Commands::ViewFactor {
            geometry_path,
            from,
            to,
            preset,
            rays,
            seed,
            apply_to,
            write,
        } => {
            let mut request = ViewFactorRequest::new(&from, &to)
                .with_preset(preset.into())
                .with_seed(seed);
            if let Some(n) = rays {
                request = request.with_rays(n);
            }
            cmd_view_factor(&geometry_path, request, apply_to.as_deref(), write.as_deref())
        }
    }
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_case(case_path)?;
    println!("✓ Case is valid");
    println!("  Nodes: {}", case.network.nodes.len());
    println!("  Conductors: {}", case.network.conductors.len());
    println!("  Heat loads: {}", case.network.heat_loads.len());
    if let Some(orbit) = &case.network.orbit {
        let regime = ot_orbit::validate_orbit(orbit)?;
        println!("  Orbit: {:.0} km ({regime:?})", orbit.altitude);
    }
    Ok(())
}

fn cmd_run(
    case_path: &Path,
    kind: Option<KindArg>,
    retry: bool,
    output: Option<&Path>,
) -> CliResult<()> {
    let mut case = load_case(case_path)?;
    if let Some(kind) = kind {
        case.simulation.kind = match kind {
            KindArg::Steady => SimulationKind::Steady,
            KindArg::Transient => SimulationKind::Transient,
        };
    }
    let config = &case.simulation;
    println!(
        "Running {:?} simulation: {}",
        config.kind,
        if case.name.is_empty() { "<unnamed>" } else { case.name.as_str() }
    );
    if config.kind == SimulationKind::Transient {
        println!(
            "  t = {:.1} → {:.1} s, dt = {:.3} s, output every {:.1} s",
            config.time_start, config.time_end, config.time_step, config.output_interval
        );
    }

    let result = if retry {
        run_with_retry(&case.network, config, RetryPolicy::default())
    } else {
        let mut last_emit = Instant::now();
        let outcome = run_with_progress(
            &case.network,
            config,
            Some(&mut |event: RunProgressEvent| {
                let terminal = matches!(event.stage, RunStage::Completed | RunStage::Failed);
                if terminal || last_emit.elapsed().as_millis() >= 100 {
                    render_cli_progress(&event);
                    last_emit = Instant::now();
                }
            }),
        );
        clear_progress_line();
        outcome.into_result()
    };

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Run failed ({}): {e}", e.kind());
            return Err(e.into());
        }
    };

    println!("✓ Simulation completed: {}", result.run_id);
    print_result_summary(&result);

    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(&result)?)?;
        println!("  Result written to {}", path.display());
    }
    Ok(())
}

fn print_result_summary(result: &ResultSnapshot) {
    let points = result.nodes.first().map_or(0, |n| n.times.len());
    println!("  Time points: {points}");
    println!("  Wall time: {:.3} s", result.stats.wall_time_s);
    if result.stats.iterations > 0 {
        println!("  Iterations/steps: {}", result.stats.iterations);
    }
    if result.stats.rejected_steps > 0 {
        println!("  Rejected steps: {}", result.stats.rejected_steps);
    }
    if let Some(err) = result.energy_balance_error {
        println!("  Energy balance error: {:.4} %", err * 100.0);
    }
    println!();
    println!("  {:<24} {:>12}", "node", "T_final [K]");
    for node in &result.nodes {
        if let Some(t) = node.temperatures.last() {
            println!("  {:<24} {:>12.3}", node.id, t);
        }
    }
}

fn cmd_export(result_path: &Path, format: ExportFormat, output: Option<&Path>) -> CliResult<()> {
    let content = fs::read_to_string(result_path)?;
    let result: ResultSnapshot = serde_json::from_str(&content)?;
    let text = match format {
        ExportFormat::Csv => summary_csv(&result)?,
        ExportFormat::Json => summary_json(&result)?,
    };

    match output {
        Some(path) => {
            fs::write(path, text)?;
            println!("✓ Summary exported to {}", path.display());
        }
        None => print!("{text}"),
    }
    info!(run_id = %result.run_id, "summary exported");
    Ok(())
}

fn cmd_bench(rays: Option<usize>) -> CliResult<()> {
    let mut options = ot_bench::BenchOptions::default();
    if let Some(n) = rays {
        options.view_factor_rays = n;
    }
    let table = ot_bench::run_suite(&ot_bench::default_benchmarks(), &options);
    print!("{table}");
    if table.all_pass() {
        println!("✓ All benchmarks within {} %", ot_results::PASS_THRESHOLD_PERCENT);
        Ok(())
    } else {
        Err(format!("{} benchmark(s) failed", table.failures().count()).into())
    }
}

fn cmd_orbit(config: OrbitalConfig, samples: usize) -> CliResult<()> {
    let env = OrbitEnvironment::new(&config)?;
    println!(
        "Orbit: {:.0} km, i = {:.1}°, Ω = {:.1}° ({:?})",
        config.altitude,
        config.inclination,
        config.raan,
        env.regime()
    );
    println!(
        "  Period: {:.1} min, eclipse fraction: {:.3}",
        env.period_s() / 60.0,
        env.eclipse_fraction(360)
    );
    println!();
    println!(
        "  {:>9}  {:>7}  {:>9}  {:>11}  {:>11}  {:>11}",
        "t [s]", "eclipse", "solar", "nadir alb", "nadir IR", "zenith sol"
    );
    for sample in env.one_orbit(0.0, samples) {
        let nadir = sample.flux(SurfaceType::Nadir);
        let zenith = sample.flux(SurfaceType::Zenith);
        println!(
            "  {:>9.1}  {:>7}  {:>9.1}  {:>11.2}  {:>11.2}  {:>11.2}",
            sample.time,
            if sample.eclipse { "yes" } else { "no" },
            sample.solar,
            nadir.albedo,
            nadir.earth_ir,
            zenith.solar
        );
    }
    Ok(())
}

fn cmd_view_factor(
    geometry_path: &Path,
    request: ViewFactorRequest,
    apply_to: Option<&Path>,
    write: Option<&Path>,
) -> CliResult<()> {
    let content = fs::read_to_string(geometry_path)?;
    let geometry: Geometry = match geometry_path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    println!(
        "Estimating F({} → {}) with {} rays",
        request.from, request.to, request.n_rays
    );

    let job = ViewFactorJob::spawn(geometry, vec![request]);
    let estimates = job.wait_with_progress(|percent, rays| {
        print!("\r  {percent:>6.2}%  rays={rays}");
        let _ = io::stdout().flush();
    });
    clear_progress_line();
    let estimates = estimates?;

    for e in &estimates {
        println!(
            "✓ F({} → {}) = {:.5} ± {:.5}  (reciprocal {:.5}, {} hits)",
            e.from,
            e.to,
            e.view_factor,
            e.standard_error,
            e.reciprocal(),
            e.hits
        );
    }

    if let (Some(case_path), Some(out)) = (apply_to, write) {
        let mut case = load_case(case_path)?;
        case.network = apply_view_factors(&case.network, &estimates)?;
        save_case(out, &case)?;
        println!("  Updated case written to {}", out.display());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.transient) {
        (RunStage::RunningTransient, Some(t)) => {
            let width = 28usize;
            let filled = ((t.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.1}/{:.1}s  steps={}  elapsed={:.1}s",
                bar,
                t.fraction_complete * 100.0,
                t.sim_time_s,
                t.t_end_s,
                t.accepted_steps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {msg}"));
            }
            print!("{line}");
        }
    }
    let _ = io::stdout().flush();
}
