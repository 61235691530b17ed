//! Strider limb trajectory CLI.
//!
//! Provides three modes of operation:
//! - `sample`: Build a walk from a config, optionally load a parameter
//!   vector, and write sampled foot states as JSON
//! - `layout`: Print the optimization-parameter layout of each limb
//! - `info`: Print workspace crate versions

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use strider_core::prelude::*;
use strider_motion::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Polynomial limb trajectories for legged locomotion.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the trajectory over its horizon and write it as JSON.
    Sample {
        /// Planner config (TOML). Built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON array holding the optimization-parameter vector.
        #[arg(short, long)]
        params: Option<PathBuf>,

        /// Sample step in seconds; overrides `trajectory_dt`.
        #[arg(long)]
        dt: Option<f64>,

        /// Output file. Writes to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print where each limb's coefficients live in the parameter vector.
    Layout {
        /// Planner config (TOML). Built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dump every segment as JSON instead of a summary table.
        #[arg(long)]
        json: bool,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SampleReport {
    horizon: f64,
    dt: f64,
    n_opt_params: usize,
    samples: Vec<TrajectorySample>,
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    match path {
        Some(path) => PlannerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PlannerConfig::default()),
    }
}

fn build_motion(config: &PlannerConfig) -> Result<EndeffectorsMotion> {
    let motion = EndeffectorsMotion::from_config(config)?;
    info!(
        limbs = motion.n_endeffectors(),
        n_opt_params = motion.n_opt_params(),
        horizon = motion.total_time(),
        "motion ready"
    );
    Ok(motion)
}

fn load_params(path: &Path) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read parameters {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of numbers", path.display()))
}

fn sample_report(
    config: &PlannerConfig,
    params: Option<&[f64]>,
    dt: Option<f64>,
) -> Result<SampleReport> {
    let mut motion = build_motion(config)?;
    if let Some(values) = params {
        motion.set_optimization_parameters(values)?;
    }
    let dt = dt.unwrap_or(config.trajectory_dt);
    let samples = sample_trajectory(&motion, dt)?;
    Ok(SampleReport {
        horizon: motion.total_time(),
        dt,
        n_opt_params: motion.n_opt_params(),
        samples,
    })
}

fn run_sample(
    config: Option<&Path>,
    params: Option<&Path>,
    dt: Option<f64>,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let params = params.map(load_params).transpose()?;
    let report = sample_report(&config, params.as_deref(), dt)?;
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                samples = report.samples.len(),
                path = %path.display(),
                "trajectory written"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_layout(config: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let motion = build_motion(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&motion.snapshot())?);
        return Ok(());
    }

    println!(
        "horizon={:.3}s, limbs={}, n_opt_params={}",
        motion.total_time(),
        motion.n_endeffectors(),
        motion.n_opt_params()
    );
    for (limb, limb_motion) in motion.limbs().iter() {
        let range = motion.parameter_range(limb)?;
        let nodes: usize = limb_motion
            .segments()
            .iter()
            .map(|seg| seg.node_count(config.trajectory_dt))
            .sum();
        println!(
            "  {limb}: params {}..{} ({} segments, {nodes} nodes at dt={})",
            range.start,
            range.end,
            limb_motion.segments().len(),
            config.trajectory_dt
        );
        for seg in limb_motion.segments() {
            if seg.free_parameter_count() > 0 {
                println!("    {seg}");
            }
        }
    }
    Ok(())
}

fn run_info() {
    println!("strider v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  strider-core   {}", env!("CARGO_PKG_VERSION"));
    println!("  strider-motion {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("polynomial order: {}", COEFF_COUNT - 1);
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sample {
            config,
            params,
            dt,
            output,
        } => run_sample(
            config.as_deref(),
            params.as_deref(),
            dt,
            output.as_deref(),
        ),
        Commands::Layout { config, json } => run_layout(config.as_deref(), json),
        Commands::Info => {
            run_info();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_config_builds_walk() {
        let motion = build_motion(&PlannerConfig::default()).unwrap();
        assert_eq!(motion.n_endeffectors(), 4);
        // 4 swings, 4 free coefficients on each axis
        assert_eq!(motion.n_opt_params(), 32);
    }

    #[test]
    fn stand_has_no_parameters() {
        let mut config = PlannerConfig::default();
        config.gait.gait = GaitType::Stand;
        let motion = build_motion(&config).unwrap();
        assert_eq!(motion.n_opt_params(), 0);
    }

    #[test]
    fn layout_runs_on_defaults() {
        run_layout(None, false).unwrap();
        run_layout(None, true).unwrap();
    }

    #[test]
    fn report_rejects_tiny_dt() {
        let err = sample_report(&PlannerConfig::default(), None, Some(1e-300))
            .err()
            .unwrap();
        assert!(err.to_string().contains("exceeds"), "unexpected error: {err}");
    }

    #[test]
    fn invalid_default_override_is_reported() {
        let mut config = PlannerConfig::default();
        config.gait.swing_duration = -1.0;
        let err = build_motion(&config).unwrap_err();
        assert!(
            err.to_string().contains("gait.swing_duration"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn report_rejects_wrong_parameter_count() {
        let err = sample_report(&PlannerConfig::default(), Some(&[0.0; 3][..]), None)
            .err()
            .unwrap();
        assert!(
            err.to_string().contains("length mismatch"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn sample_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("walk.toml");
        let params_path = dir.path().join("params.json");
        let output_path = dir.path().join("out.json");

        fs::write(
            &config_path,
            r#"
trajectory_dt = 0.1
initial_positions = [[0.0, 0.1], [0.0, -0.1]]

[gait]
steps = 2
swing_free_coefficients = 2
"#,
        )
        .unwrap();
        // Two swings, two free coefficients per axis.
        let params: Vec<f64> = vec![0.0, 0.5, 0.1, 0.0, 0.0, 0.5, -0.1, 0.0];
        fs::write(&params_path, serde_json::to_string(&params).unwrap()).unwrap();

        run_sample(
            Some(config_path.as_path()),
            Some(params_path.as_path()),
            None,
            Some(output_path.as_path()),
        )
        .unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(report["n_opt_params"], 8);
        let samples = report["samples"].as_array().unwrap();
        assert_eq!(samples[0]["time"], 0.0);
        assert_eq!(samples[0]["limbs"].as_array().unwrap().len(), 2);
        let horizon = report["horizon"].as_f64().unwrap();
        let last = samples.last().unwrap()["time"].as_f64().unwrap();
        assert!((last - horizon).abs() < 1e-12);
    }

    #[test]
    fn missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }
}
