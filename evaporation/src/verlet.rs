use std::sync::Mutex;

use itertools::Itertools;
use nalgebra::Vector2;

use crate::lj::LennardJones;
use crate::particle::Particle;

/// Energy totals of a single step, handed back to the caller's persistent
/// accumulators.
#[derive(Debug, Clone, Copy)]
pub struct StepEnergies {
    pub kinetic: f64,
    pub potential: f64,
}

/// Advance every particle by one velocity-Verlet step of length `dt`.
///
/// The `snapshot` buffer is locked only while positions are written, never
/// across the O(N²) force loop. Readers holding the same lock therefore never
/// see a torn position array, but they may see positions that are one step
/// ahead of the velocities and energy totals.
pub fn velocity_verlet(
    particles: &mut [Particle],
    snapshot: &Mutex<Vec<Vector2<f64>>>,
    potential: &LennardJones,
    dt: f64,
) -> StepEnergies {
    // a_i becomes a_{i-1}; the force loop rebuilds a_i from zero
    for p in particles.iter_mut() {
        p.prev_acceleration = p.acceleration;
        p.acceleration = Vector2::zeros();
    }

    {
        let mut shared = snapshot.lock().expect("position lock poisoned");
        for (p, slot) in particles.iter_mut().zip(shared.iter_mut()) {
            p.position += p.velocity * dt + p.prev_acceleration * (dt * dt / 2.0);
            *slot = p.position;
        }
    }

    // all-pairs forces at the updated positions, one evaluation per pair
    let mut potential_energy = 0.0;
    for (i, j) in (0..particles.len()).tuple_combinations::<(_, _)>() {
        let dr = particles[j].position - particles[i].position;
        let (pair_potential, force) = potential.evaluate(dr);
        particles[i].acceleration += force;
        particles[j].acceleration -= force;
        potential_energy += pair_potential;
    }

    // force -> acceleration
    for p in particles.iter_mut() {
        p.acceleration /= Particle::MASS;
    }

    let mut kinetic_energy = 0.0;
    for p in particles.iter_mut() {
        p.velocity += (p.acceleration + p.prev_acceleration) * (dt / 2.0);
        p.sample_speed();
        kinetic_energy += p.kinetic_energy();
    }

    StepEnergies {
        kinetic: kinetic_energy,
        potential: potential_energy,
    }
}
