use std::sync::{Arc, Mutex};

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::lattice;
use crate::lj::{LennardJones, K_BOLTZMANN};
use crate::particle::Particle;
use crate::verlet;

/// Default dimensionless timestep tuning factor.
pub const DEFAULT_TIMESTEP_FACTOR: f64 = 0.01;

/// Box side length in units of the equilibrium pair distance.
const BOX_SIDE_IN_EQ_DISTANCES: f64 = 30.0;

/// Rectangular simulation box, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct BoxBounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl BoxBounds {
    pub fn contains(&self, p: &Vector2<f64>) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }

    pub fn center(&self) -> Vector2<f64> {
        Vector2::new(
            (self.left + self.right) / 2.0,
            (self.bottom + self.top) / 2.0,
        )
    }
}

/// Cloneable handle that lets reader threads snapshot particle positions
/// while the owning thread keeps stepping the [`Model`].
#[derive(Clone)]
pub struct PositionObserver {
    positions: Arc<Mutex<Vec<Vector2<f64>>>>,
}

impl PositionObserver {
    /// Copy of the positions, taken under the same lock the integrator's
    /// position-update phase holds. The snapshot is never torn mid-update,
    /// but it may be one step ahead of the velocities and energy
    /// accumulators.
    pub fn snapshot(&self) -> Vec<Vector2<f64>> {
        self.positions.lock().expect("position lock poisoned").clone()
    }
}

/// The simulation state: particle buffer, box geometry, derived timestep,
/// iteration counter and the energy accumulators.
///
/// Exactly one actor mutates the model through [`Model::process`]; readers
/// get position snapshots through [`Model::observer`]. The energy and
/// temperature accessors drain their accumulators on read.
pub struct Model {
    particles: Vec<Particle>,
    shared_positions: Arc<Mutex<Vec<Vector2<f64>>>>,
    potential: LennardJones,
    bounds: BoxBounds,
    timestep_factor: f64,
    timestep: f64,
    iteration: u64,
    kinetic_energy_sum: f64,
    potential_energy_sum: f64,
    target_temperature: f64,
    rng: StdRng,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// An empty model for argon with the default timestep factor.
    pub fn new() -> Self {
        Self::with_potential(LennardJones::default())
    }

    /// A model with a deterministic velocity generator, for reproducible
    /// runs.
    pub fn with_seed(seed: u64) -> Self {
        let mut model = Self::new();
        model.rng = StdRng::seed_from_u64(seed);
        model
    }

    pub fn with_potential(potential: LennardJones) -> Self {
        let side = BOX_SIDE_IN_EQ_DISTANCES * potential.equilibrium_distance();
        let mut model = Model {
            particles: Vec::new(),
            shared_positions: Arc::new(Mutex::new(Vec::new())),
            potential,
            bounds: BoxBounds {
                left: 0.0,
                right: side,
                bottom: 0.0,
                top: side,
            },
            timestep_factor: DEFAULT_TIMESTEP_FACTOR,
            timestep: 0.0,
            iteration: 0,
            kinetic_energy_sum: 0.0,
            potential_energy_sum: 0.0,
            target_temperature: 0.0,
            rng: StdRng::from_entropy(),
        };
        model.evaluate_time_step(DEFAULT_TIMESTEP_FACTOR);
        model
    }

    /// Target temperature in Kelvin used by the next initialization.
    /// Negative values are ignored.
    pub fn set_temperature(&mut self, kelvin: f64) {
        if kelvin >= 0.0 {
            self.target_temperature = kelvin;
        }
    }

    /// Recompute the integration timestep from a dimensionless tuning
    /// factor: `dt = factor * sqrt(m d_eq² / ε)`. Non-positive factors fall
    /// back to the default.
    pub fn evaluate_time_step(&mut self, factor: f64) -> f64 {
        self.timestep_factor = if factor > 0.0 {
            factor
        } else {
            DEFAULT_TIMESTEP_FACTOR
        };
        let d = self.potential.equilibrium_distance();
        self.timestep =
            self.timestep_factor * (Particle::MASS * d * d / self.potential.epsilon).sqrt();
        self.timestep
    }

    /// Rebuild the particle lattice centered in the box, assign thermal
    /// velocities with zero net momentum, reset the iteration counter and
    /// recompute the timestep.
    ///
    /// Degenerate configurations (`width <= 1`, `height <= 1` or a negative
    /// spacing) leave the model untouched.
    pub fn set_initial_conditions(&mut self, width: usize, height: usize, period: f64) {
        if width <= 1 || height <= 1 || period < 0.0 {
            return;
        }

        self.iteration = 0;
        self.particles = lattice::centered_grid(width, height, period, self.bounds.center());
        lattice::thermal_velocities(
            &mut self.particles,
            self.target_temperature,
            &mut self.rng,
        );
        self.evaluate_time_step(self.timestep_factor);

        let mut shared = self.shared_positions.lock().expect("position lock poisoned");
        shared.clear();
        shared.extend(self.particles.iter().map(|p| p.position));
    }

    /// Advance the simulation by `iterations` velocity-Verlet steps.
    pub fn process(&mut self, iterations: usize) {
        for _ in 0..iterations {
            self.step();
        }
    }

    /// A single velocity-Verlet step.
    pub fn step(&mut self) {
        let energies = verlet::velocity_verlet(
            &mut self.particles,
            &self.shared_positions,
            &self.potential,
            self.timestep,
        );
        self.kinetic_energy_sum += energies.kinetic;
        self.potential_energy_sum += energies.potential;
        self.iteration += 1;
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Separation at which the pair force is zero, for unit conversion by
    /// callers.
    pub fn equilibrium_distance(&self) -> f64 {
        self.potential.equilibrium_distance()
    }

    pub fn bounds(&self) -> BoxBounds {
        self.bounds
    }

    pub fn time_step(&self) -> f64 {
        self.timestep
    }

    /// Kinetic energy accumulated since the previous drain; resets to zero.
    pub fn take_kinetic_energy(&mut self) -> f64 {
        std::mem::take(&mut self.kinetic_energy_sum)
    }

    /// Potential energy accumulated since the previous drain; resets to zero.
    pub fn take_potential_energy(&mut self) -> f64 {
        std::mem::take(&mut self.potential_energy_sum)
    }

    /// Mean temperature over all particles, `T = m <v²> / (2 k_B)`, draining
    /// every particle's running mean-square velocity sample.
    pub fn mean_temperature(&mut self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        let v2 = self
            .particles
            .iter_mut()
            .map(|p| p.take_mean_square_velocity())
            .sum::<f64>()
            / self.particles.len() as f64;
        Particle::MASS * v2 / (2.0 * K_BOLTZMANN)
    }

    /// Number of particles currently outside the box. Escaped particles keep
    /// being integrated; evaporation is a predicate over position only,
    /// re-evaluated on every call.
    pub fn particles_lost(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| !self.bounds.contains(&p.position))
            .count()
    }

    /// Snapshot copy of the particle positions, taken under the integrator's
    /// position lock.
    pub fn positions(&self) -> Vec<Vector2<f64>> {
        self.shared_positions.lock().expect("position lock poisoned").clone()
    }

    /// Copy of the full particle state for same-thread inspection.
    pub fn particles(&self) -> Vec<Particle> {
        self.particles.clone()
    }

    /// Handle for reader threads; clones of it share the position buffer
    /// with this model.
    pub fn observer(&self) -> PositionObserver {
        PositionObserver {
            positions: Arc::clone(&self.shared_positions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lattice_has_requested_count_and_zero_momentum() {
        let mut model = Model::with_seed(7);
        model.set_temperature(85.0);
        let d = model.equilibrium_distance();
        model.set_initial_conditions(6, 6, d);

        assert_eq!(model.particle_count(), 36);

        let net = model
            .particles()
            .iter()
            .map(|p| p.velocity)
            .sum::<Vector2<f64>>();
        let typical = model.particles()[0].velocity.norm();
        assert!(net.norm() < 1e-9 * typical);
    }

    #[test]
    fn energy_drains_return_value_then_zero() {
        let mut model = Model::with_seed(3);
        model.set_temperature(120.0);
        model.set_initial_conditions(4, 4, model.equilibrium_distance());
        model.process(5);

        let kinetic = model.take_kinetic_energy();
        let potential = model.take_potential_energy();
        assert!(kinetic > 0.0);
        assert!(potential != 0.0);
        assert_eq!(model.take_kinetic_energy(), 0.0);
        assert_eq!(model.take_potential_energy(), 0.0);
    }

    #[test]
    fn iteration_counts_every_step() {
        let mut model = Model::with_seed(11);
        model.set_initial_conditions(2, 2, model.equilibrium_distance());
        assert_eq!(model.iteration(), 0);

        model.process(17);
        assert_eq!(model.iteration(), 17);
        model.process(0);
        assert_eq!(model.iteration(), 17);
        model.step();
        assert_eq!(model.iteration(), 18);

        // re-initialization resets the counter
        model.set_initial_conditions(2, 2, model.equilibrium_distance());
        assert_eq!(model.iteration(), 0);
    }

    #[test]
    fn degenerate_initialization_is_a_no_op() {
        let mut model = Model::with_seed(5);
        let d = model.equilibrium_distance();
        model.set_initial_conditions(3, 3, d);
        model.process(2);

        let before: Vec<Vector2<f64>> = model.positions();
        model.set_initial_conditions(1, 3, d);
        model.set_initial_conditions(3, 0, d);
        model.set_initial_conditions(3, 3, -d);

        assert_eq!(model.iteration(), 2);
        assert_eq!(model.particle_count(), 9);
        assert_eq!(model.positions(), before);
    }

    #[test]
    fn two_by_two_lattice_forms_a_square_with_no_loss() {
        let mut model = Model::with_seed(9);
        let d = model.equilibrium_distance();
        model.set_initial_conditions(2, 2, d);

        let positions = model.positions();
        assert_eq!(positions.len(), 4);

        let mut distances: Vec<f64> = Vec::new();
        for i in 0..4 {
            for j in (i + 1)..4 {
                distances.push((positions[j] - positions[i]).norm());
            }
        }
        distances.sort_by(|a, b| a.partial_cmp(b).expect("finite distances"));
        // four sides of length d, two diagonals of length d*sqrt(2)
        for side in &distances[..4] {
            assert_relative_eq!(*side, d, max_relative = 1e-12);
        }
        for diagonal in &distances[4..] {
            assert_relative_eq!(*diagonal, d * 2f64.sqrt(), max_relative = 1e-12);
        }

        model.process(1);
        assert_eq!(model.particles_lost(), 0);
    }

    #[test]
    fn cold_lattice_stays_bound() {
        let mut model = Model::with_seed(2);
        model.set_temperature(0.0);
        model.set_initial_conditions(4, 4, model.equilibrium_distance());
        model.process(100);

        assert_eq!(model.particles_lost(), 0);
        assert!(model.take_potential_energy() < 0.0);
    }

    #[test]
    fn mean_temperature_tracks_target_ordering() {
        let mut cold = Model::with_seed(42);
        cold.set_temperature(10.0);
        cold.set_initial_conditions(4, 4, cold.equilibrium_distance());
        cold.process(10);

        let mut hot = Model::with_seed(42);
        hot.set_temperature(1000.0);
        hot.set_initial_conditions(4, 4, hot.equilibrium_distance());
        hot.process(10);

        assert!(hot.mean_temperature() > cold.mean_temperature());
    }

    #[test]
    fn mean_temperature_drains_per_particle_samples() {
        let mut model = Model::with_seed(8);
        model.set_temperature(50.0);
        model.set_initial_conditions(3, 3, model.equilibrium_distance());
        model.process(4);

        assert!(model.mean_temperature() > 0.0);
        // no intervening steps: every per-particle sample was reset
        assert_eq!(model.mean_temperature(), 0.0);
    }

    #[test]
    fn coincident_lattice_propagates_nan() {
        // period zero stacks every particle on the box center; the unguarded
        // singularity is expected to poison the kinetic accumulator
        let mut model = Model::with_seed(1);
        model.set_initial_conditions(2, 2, 0.0);
        model.process(1);

        assert!(model.take_kinetic_energy().is_nan());
    }

    #[test]
    fn non_positive_timestep_factor_falls_back_to_default() {
        let mut model = Model::new();
        let default_dt = model.evaluate_time_step(DEFAULT_TIMESTEP_FACTOR);
        let dt = model.evaluate_time_step(-0.5);
        assert_eq!(dt, default_dt);

        let d = model.equilibrium_distance();
        let lj = LennardJones::default();
        let expected = 0.01 * (Particle::MASS * d * d / lj.epsilon).sqrt();
        assert_relative_eq!(dt, expected, max_relative = 1e-12);
    }

    #[test]
    fn observer_snapshots_are_never_torn() {
        let mut model = Model::with_seed(13);
        model.set_temperature(300.0);
        model.set_initial_conditions(4, 4, model.equilibrium_distance());
        let observer = model.observer();

        std::thread::scope(|scope| {
            let reader = scope.spawn(move || {
                for _ in 0..100 {
                    let snapshot = observer.snapshot();
                    assert_eq!(snapshot.len(), 16);
                    assert!(snapshot.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
                }
            });
            model.process(200);
            reader.join().expect("reader thread panicked");
        });
    }
}
