//! Command-line arguments and sweep configuration for evaporation
//! experiments.

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Lattice-spacing sweep over a Lennard-Jones cluster, recording mean
/// temperature and evaporation loss per experiment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML sweep configuration; flags below override it
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Lattice width in particles
    #[arg(long)]
    pub width: Option<usize>,

    /// Lattice height in particles
    #[arg(long)]
    pub height: Option<usize>,

    /// Number of sweep points over the spacing interval
    #[arg(long)]
    pub points: Option<usize>,

    /// Repetitions per sweep point
    #[arg(long)]
    pub experiments: Option<usize>,

    /// Initial velocity temperature in Kelvin
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Report file (default out{width}x{height}.txt)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Sweep parameters; defaults describe the standard 6x6 argon sweep.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SweepConfig {
    /// Lattice spacing interval swept, in units of the equilibrium distance
    #[serde(default = "default_interval")]
    pub interval: [f64; 2],
    /// Lattice width in particles
    #[serde(default = "default_side")]
    pub width: usize,
    /// Lattice height in particles
    #[serde(default = "default_side")]
    pub height: usize,
    /// Number of sweep points over the interval
    #[serde(default = "default_points")]
    pub points: usize,
    /// Repetitions per sweep point
    #[serde(default = "default_experiments")]
    pub experiments: usize,
    /// Initial velocity temperature in Kelvin
    #[serde(default)]
    pub temperature: f64,
    /// Total integration steps per experiment
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Steps in the energy-averaging tail of each experiment
    #[serde(default = "default_averaging")]
    pub averaging: usize,
    /// Dimensionless timestep tuning factor
    #[serde(default = "default_timestep_factor")]
    pub timestep_factor: f64,
    /// Report file; defaults to out{width}x{height}.txt
    #[serde(default)]
    pub output: Option<String>,
}

fn default_interval() -> [f64; 2] {
    [0.9, 1.5]
}
fn default_side() -> usize {
    6
}
fn default_points() -> usize {
    100
}
fn default_experiments() -> usize {
    10
}
fn default_iterations() -> usize {
    5000
}
fn default_averaging() -> usize {
    500
}
fn default_timestep_factor() -> f64 {
    0.01
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            interval: default_interval(),
            width: default_side(),
            height: default_side(),
            points: default_points(),
            experiments: default_experiments(),
            temperature: 0.0,
            iterations: default_iterations(),
            averaging: default_averaging(),
            timestep_factor: default_timestep_factor(),
            output: None,
        }
    }
}

impl SweepConfig {
    /// Load a sweep configuration from a YAML file; missing keys take the
    /// defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).wrap_err_with(|| {
            format!(
                "unable to read sweep configuration: {}",
                path.as_ref().display()
            )
        })?;
        serde_yml::from_str(&content).wrap_err("failed to parse sweep configuration")
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(points) = args.points {
            self.points = points;
        }
        if let Some(experiments) = args.experiments {
            self.experiments = experiments;
        }
        if let Some(temperature) = args.temperature {
            self.temperature = temperature;
        }
        if let Some(output) = &args.output {
            self.output = Some(output.clone());
        }
    }

    /// Report path; falls back to `out{width}x{height}.txt` when none was
    /// given.
    pub fn output_path(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("out{}x{}.txt", self.width, self.height))
    }
}
