use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
	#[error("constraint solve did not converge: squared residual {residual:e} after {iterations} iterations")]
	SolverDiverged { residual: f64, iterations: usize },

	#[error("no particle with id {0}")]
	UnknownParticle(usize),

	#[error("particle id {0} is used twice")]
	DuplicateParticle(usize),

	#[error("particle {id} has invalid mass {mass}")]
	InvalidMass { id: usize, mass: f64 },
}

pub type SimResult<T> = Result<T, SimError>;
