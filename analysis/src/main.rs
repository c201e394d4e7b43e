//! Batch experiment driver for the evaporation engine.
//!
//! Sweeps the lattice spacing over an interval of the equilibrium distance
//! and, for every repetition, appends one `"<temperature> <loss>"` line to a
//! plain-text report: the mean temperature over the averaging tail and the
//! number of particles that escaped the box.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use evaporation::{Model, K_BOLTZMANN};
use tracing::info;

mod config;

use config::{Args, SweepConfig};

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = match &args.config_file {
        Some(path) => SweepConfig::from_file(path)?,
        None => SweepConfig::default(),
    };
    config.apply_overrides(&args);

    info!(
        "spacing interval [{}, {}), lattice {}x{}, {} points, {} experiments per point, {} K",
        config.interval[0],
        config.interval[1],
        config.width,
        config.height,
        config.points,
        config.experiments,
        config.temperature,
    );

    let out_path = config.output_path();
    let file = File::create(&out_path)
        .wrap_err_with(|| format!("unable to create report file: {out_path}"))?;
    let mut report = BufWriter::new(file);

    let mut model = Model::new();
    model.evaluate_time_step(config.timestep_factor);
    model.set_temperature(config.temperature);

    run_sweep(&mut model, &config, &mut report)
        .wrap_err_with(|| format!("failed to write report file: {out_path}"))?;

    Ok(())
}

/// One experiment at lattice spacing `period`: re-initialize, warm up,
/// average the kinetic energy over the tail and count escaped particles.
fn run_experiment(model: &mut Model, config: &SweepConfig, period: f64) -> (f64, usize) {
    model.set_initial_conditions(config.width, config.height, period);

    let warmup = config.iterations.saturating_sub(config.averaging);
    model.process(warmup);
    // discard the warm-up phase from the energy average
    model.take_kinetic_energy();
    model.process(config.averaging);

    let particle_count = (config.width * config.height) as f64;
    let temperature = model.take_kinetic_energy()
        / particle_count
        / K_BOLTZMANN
        / config.averaging as f64;
    (temperature, model.particles_lost())
}

/// Run the whole sweep, appending one `"<temperature> <loss>"` line per
/// experiment, in execution order.
fn run_sweep(model: &mut Model, config: &SweepConfig, report: &mut impl Write) -> io::Result<()> {
    let [left, right] = config.interval;
    let equilibrium_distance = model.equilibrium_distance();

    for point in 0..config.points {
        let b = left + (right - left) * point as f64 / config.points as f64;
        let period = b * equilibrium_distance;

        for _ in 0..config.experiments {
            let (temperature, loss) = run_experiment(model, config, period);
            writeln!(report, "{temperature} {loss}")?;
        }

        report.flush()?;
        info!("point {}/{}", point + 1, config.points);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    fn small_sweep() -> SweepConfig {
        SweepConfig {
            width: 2,
            height: 2,
            points: 2,
            experiments: 3,
            temperature: 20.0,
            iterations: 30,
            averaging: 10,
            ..SweepConfig::default()
        }
    }

    #[test]
    fn report_has_one_line_per_experiment_in_order() {
        let config = small_sweep();
        let file = NamedTempFile::new().unwrap();

        let mut model = Model::with_seed(17);
        model.set_temperature(config.temperature);
        let mut report = BufWriter::new(file.reopen().unwrap());
        run_sweep(&mut model, &config, &mut report).unwrap();
        drop(report);

        let content = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), config.points * config.experiments);

        for line in &lines {
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields.len(), 2);
            let temperature: f64 = fields[0].parse().unwrap();
            let loss: usize = fields[1].parse().unwrap();
            assert!(temperature.is_finite());
            assert!(loss <= config.width * config.height);
        }
    }

    #[test]
    fn experiment_reports_tail_energy_only() {
        let config = small_sweep();
        let mut model = Model::with_seed(23);
        model.set_temperature(config.temperature);

        let period = model.equilibrium_distance();
        let (temperature, loss) = run_experiment(&mut model, &config, period);

        assert!(temperature.is_finite());
        assert!(temperature >= 0.0);
        assert!(loss <= config.width * config.height);
        // the averaging tail was drained into the report value
        assert_eq!(model.take_kinetic_energy(), 0.0);
    }
}
