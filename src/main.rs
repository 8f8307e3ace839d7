mod interlink;
mod web;

use chrono::Duration;
use clap::{Parser, Subcommand};
use std::fs;
use std::process::ExitCode;

use crate::interlink::{
    parse_utc_instant, scan_best_effort, InterlinkError, OrbitStateProvider, OrbitalElements,
    PropagationContext, ScanConfig, Sgp4Provider, WindowRecord, DEFAULT_MAX_RANGE_KM, DEFAULT_STEP,
};

#[derive(Parser)]
#[command(name = "sat-interlink")]
#[command(about = "Inter-satellite line-of-sight window finder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve { config: String },
    /// Scan two TLE files for interlink windows and print them as JSON
    Scan {
        #[arg(long)]
        tle_a: String,
        #[arg(long)]
        tle_b: String,
        /// ISO-8601 start; UTC when no offset is given
        #[arg(long)]
        start: String,
        /// ISO-8601 end, inclusive
        #[arg(long)]
        end: String,
        /// Sampling cadence, e.g. "5m" or "90s" [default: 5m]
        #[arg(long, value_parser = parse_step)]
        step: Option<Duration>,
        /// [default: 1000]
        #[arg(long)]
        max_range_km: Option<f64>,
        /// Report inertial positions only, without latitude/longitude
        #[arg(long)]
        inertial: bool,
        /// Print windows found before a propagation failure
        #[arg(long)]
        best_effort: bool,
    },
    /// Check that a TLE file parses and propagates
    ValidateTle { tle: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::Scan {
            tle_a,
            tle_b,
            start,
            end,
            step,
            max_range_km,
            inertial,
            best_effort,
        } => {
            let config = match build_config(&start, &end, step, max_range_km) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let context = if inertial {
                PropagationContext::inertial_only()
            } else {
                PropagationContext::default()
            };
            scan(&tle_a, &tle_b, &config, context, best_effort)
        }
        Commands::ValidateTle { tle } => validate_tle(&tle),
    }
}

fn parse_step(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

fn serve(path: &str) -> ExitCode {
    let config = match web::Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_elements(path: &str) -> Result<OrbitalElements, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    OrbitalElements::from_tle_text(&text).map_err(|e| format!("{}: {}", path, e))
}

fn scan(
    tle_a: &str,
    tle_b: &str,
    config: &ScanConfig,
    context: PropagationContext,
    best_effort: bool,
) -> ExitCode {
    let (elements_a, elements_b) = match (load_elements(tle_a), load_elements(tle_b)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let providers = Sgp4Provider::new(&elements_a, context)
        .and_then(|a| Sgp4Provider::new(&elements_b, context).map(|b| (a, b)));
    let (provider_a, provider_b) = match providers {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "Scanning {} / {}: {} samples",
        provider_a.name(),
        provider_b.name(),
        config.sample_count()
    );

    if !best_effort {
        return match interlink::scan(&provider_a, &provider_b, config) {
            Ok(records) => print_windows(&records, config.sample_count()),
            Err(e) => {
                eprintln!("Scan failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let outcome = scan_best_effort(&provider_a, &provider_b, config);
    let status = print_windows(&outcome.records, outcome.samples_evaluated);
    if outcome.is_complete() {
        return status;
    }
    if let Some(e) = outcome.failure {
        eprintln!(
            "Scan incomplete after {} samples: {}",
            outcome.samples_evaluated, e
        );
    }
    ExitCode::FAILURE
}

fn print_windows(records: &[WindowRecord], samples: u64) -> ExitCode {
    match serde_json::to_string_pretty(records) {
        Ok(json) => {
            println!("{}", json);
            eprintln!("{} windows in {} samples", records.len(), samples);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding windows: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(
    start: &str,
    end: &str,
    step: Option<Duration>,
    max_range_km: Option<f64>,
) -> Result<ScanConfig, InterlinkError> {
    let start = parse_utc_instant(start)?;
    let end = parse_utc_instant(end)?;
    match (step, max_range_km) {
        (None, None) => ScanConfig::with_defaults(start, end),
        _ => ScanConfig::new(
            start,
            end,
            step.unwrap_or(DEFAULT_STEP),
            max_range_km.unwrap_or(DEFAULT_MAX_RANGE_KM),
        ),
    }
}

fn validate_tle(path: &str) -> ExitCode {
    let elements = match load_elements(path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Invalid TLE: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let position = Sgp4Provider::new(&elements, PropagationContext::default())
        .and_then(|provider| provider.position_at(elements.epoch()));

    match position {
        Ok(position) => {
            println!(
                "TLE is valid: {} (NORAD {}), epoch {}",
                elements.name(),
                elements.norad_id(),
                elements.epoch().to_rfc3339()
            );
            println!(
                "  inclination {:.4} deg, eccentricity {:.7}, mean motion {:.8} rev/day",
                elements.inclination_deg(),
                elements.eccentricity(),
                elements.mean_motion_rev_per_day()
            );
            println!(
                "  position at epoch [{:.3}, {:.3}, {:.3}] km",
                position.x_km, position.y_km, position.z_km
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("TLE does not propagate: {}", e);
            ExitCode::FAILURE
        }
    }
}
