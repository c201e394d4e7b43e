use nalgebra::Vector2;

/// Boltzmann constant, J/K.
pub const K_BOLTZMANN: f64 = 1.38e-23;

/// Lennard-Jones pair potential for a single particle species.
///
/// Evaluated for every unordered pair with no cutoff and no neighbor list;
/// the interaction diverges as the separation goes to zero, which is left
/// unguarded.
#[derive(Debug, Clone)]
pub struct LennardJones {
    /// Well depth ε, J.
    pub epsilon: f64,
    /// Characteristic length σ, m.
    pub sigma: f64,
}

impl Default for LennardJones {
    /// Argon parameters.
    fn default() -> Self {
        LennardJones {
            epsilon: 0.0103 * 1.602176634e-19,
            sigma: 0.382e-9,
        }
    }
}

impl LennardJones {
    pub fn new(epsilon: f64, sigma: f64) -> Self {
        LennardJones { epsilon, sigma }
    }

    /// Separation at which the pair force vanishes, σ·2^(1/6).
    pub fn equilibrium_distance(&self) -> f64 {
        self.sigma * 2f64.powf(1.0 / 6.0)
    }

    /// Pair potential energy and the force on the first particle, for a
    /// displacement `dr` pointing from the first particle to the second.
    ///
    /// The force on the second particle is the exact negation of the returned
    /// vector; callers negate it instead of evaluating the pair twice, so
    /// Newton's third law holds with no rounding asymmetry.
    pub fn evaluate(&self, dr: Vector2<f64>) -> (f64, Vector2<f64>) {
        let r2 = dr.norm_squared();
        let sr2 = self.sigma * self.sigma / r2;
        let sr6 = sr2 * sr2 * sr2;

        let potential = 4.0 * self.epsilon * sr6 * (sr6 - 1.0);
        let force = dr * (24.0 * self.epsilon * sr6 * (1.0 - 2.0 * sr6) / r2);
        (potential, force)
    }
}
