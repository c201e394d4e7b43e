//! 2D molecular dynamics of a finite Lennard-Jones cluster in a bounded box.
//!
//! A lattice of identical particles is integrated with velocity Verlet and
//! all-pairs force evaluation; particles that cross the box boundary count as
//! "evaporated" but keep being simulated. One thread advances the [`Model`],
//! any number of reader threads take position snapshots through a
//! [`PositionObserver`].

pub mod lattice;
pub mod lj;
pub mod model;
pub mod particle;
pub mod verlet;

pub use lj::{LennardJones, K_BOLTZMANN};
pub use model::{BoxBounds, Model, PositionObserver, DEFAULT_TIMESTEP_FACTOR};
pub use particle::Particle;
