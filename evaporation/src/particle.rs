use nalgebra::Vector2;

/// A single point particle of the cluster.
///
/// Accelerations are kept for two consecutive steps: the position update of
/// velocity Verlet consumes `prev_acceleration` while the force loop rebuilds
/// `acceleration`, so the previous value is never overwritten before the
/// velocity update has used it.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub acceleration: Vector2<f64>,
    pub prev_acceleration: Vector2<f64>,
    v2_sum: f64,
    v2_samples: u64,
}

impl Default for Particle {
    fn default() -> Self {
        Particle {
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            acceleration: Vector2::zeros(),
            prev_acceleration: Vector2::zeros(),
            v2_sum: 0.0,
            v2_samples: 0,
        }
    }
}

impl Particle {
    /// Mass of an argon atom in kg, shared by every particle.
    pub const MASS: f64 = 39.948 * 1.66053906660e-27;

    /// A particle at rest at `position`.
    pub fn at(position: Vector2<f64>) -> Self {
        Particle {
            position,
            ..Default::default()
        }
    }

    /// Record the current squared speed into the running mean-square sample.
    pub fn sample_speed(&mut self) {
        self.v2_sum += self.velocity.norm_squared();
        self.v2_samples += 1;
    }

    /// Mean of the squared-speed samples recorded since the last call,
    /// resetting the running sum (drain semantics). Zero when no samples
    /// were taken.
    pub fn take_mean_square_velocity(&mut self) -> f64 {
        let mean = if self.v2_samples == 0 {
            0.0
        } else {
            self.v2_sum / self.v2_samples as f64
        };
        self.v2_sum = 0.0;
        self.v2_samples = 0;
        mean
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * Self::MASS * self.velocity.norm_squared()
    }
}
