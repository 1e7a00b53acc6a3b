//! Planar particle networks held together by damped springs, rods and
//! circular wires, advanced with explicit, Runge-Kutta and symplectic
//! integrators. Constraint forces come from a matrix-free conjugate
//! gradient solve over the constraint-space system `J M⁻¹ Jᵗ λ = b`.

pub mod config;
pub mod constraint;
pub mod controller_message;
pub mod error;
pub mod implicit_matrix;
pub mod integrator;
pub mod linear_solver;
pub mod particle;
pub mod particle_list;
pub mod physical_model;
pub mod pworld;
pub mod spring;
pub mod system;

pub type V2 = nalgebra::Vector2<f64>;

// returned instead of dividing by a zero distance
pub const INF: f64 = 1e5;

pub use config::SimConfig;
pub use constraint::rod::RodConstraint;
pub use constraint::wire::CircularWireConstraint;
pub use constraint::{Constraint, ConstraintRow, Role};
pub use controller_message::ControllerMessage;
pub use error::SimError;
pub use integrator::{Integrator, Stepper};
pub use particle::Particle;
pub use particle_list::ParticleList;
pub use physical_model::PhysicalModel;
pub use pworld::World;
pub use spring::SpringForce;
pub use system::{Derivative, System};
