use itertools::iproduct;
use nalgebra::Vector2;
use rand::Rng;
use rand_distr::{Distribution, UnitCircle};

use crate::lj::K_BOLTZMANN;
use crate::particle::Particle;

/// Place `width * height` particles on a grid of spacing `period` around
/// `center`.
///
/// Grid index (i, j) maps to `center + (i, j) * period`, with i spanning a
/// centered range of `height` values and j of `width` values. When a side is
/// even the span ends up off-center by one row or column; the placement
/// accepts that asymmetry rather than shifting by half a period.
pub fn centered_grid(
    width: usize,
    height: usize,
    period: f64,
    center: Vector2<f64>,
) -> Vec<Particle> {
    let rows = (-(height as i64) / 2..).take(height);
    let cols = (-(width as i64) / 2..).take(width);
    iproduct!(rows, cols)
        .map(|(i, j)| Particle::at(center + Vector2::new(i as f64, j as f64) * period))
        .collect()
}

/// Assign every particle the speed `sqrt(N k_B T / m)` in a uniformly random
/// direction, then subtract the mean velocity from all of them so the net
/// momentum of the cluster is exactly zero.
pub fn thermal_velocities<R: Rng>(particles: &mut [Particle], temperature: f64, rng: &mut R) {
    let n = particles.len();
    if n == 0 {
        return;
    }

    let speed = (n as f64 * K_BOLTZMANN * temperature / Particle::MASS).sqrt();
    for p in particles.iter_mut() {
        let [dx, dy]: [f64; 2] = UnitCircle.sample(&mut *rng);
        p.velocity = Vector2::new(dx, dy) * speed;
    }

    // Remove center-of-mass motion
    let drift = particles
        .iter()
        .map(|p| p.velocity)
        .sum::<Vector2<f64>>()
        / n as f64;
    for p in particles.iter_mut() {
        p.velocity -= drift;
    }
}
