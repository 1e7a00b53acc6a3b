use crate::linear_solver::MAX_STEPS;

/// Parameters of a derivative evaluation.
///
/// ```
/// use tinkertoy::SimConfig;
///
/// let config = SimConfig::default()
/// 	.with_gravity(9.81)
/// 	.with_max_steps(200);
/// assert_eq!(config.max_steps, 200);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
	/// Downward force applied to every particle, independent of its mass.
	pub gravity: f64,
	/// Stabilization gain on the constraint residual.
	pub ks: f64,
	/// Stabilization gain on the residual's time derivative.
	pub kd: f64,
	/// Absolute tolerance on the squared residual of the multiplier solve.
	pub epsilon: f64,
	/// Iteration budget of the multiplier solve.
	pub max_steps: usize,
}

impl Default for SimConfig {
	fn default() -> Self {
		Self {
			gravity: 0.003,
			ks: 100.0,
			kd: 100.0,
			epsilon: 1e-20,
			max_steps: MAX_STEPS,
		}
	}
}

impl SimConfig {
	pub fn with_gravity(mut self, gravity: f64) -> Self {
		self.gravity = gravity;
		self
	}

	pub fn with_stabilization(mut self, ks: f64, kd: f64) -> Self {
		self.ks = ks;
		self.kd = kd;
		self
	}

	pub fn with_epsilon(mut self, epsilon: f64) -> Self {
		self.epsilon = epsilon;
		self
	}

	// 0 falls back to MAX_STEPS
	pub fn with_max_steps(mut self, max_steps: usize) -> Self {
		self.max_steps = if max_steps == 0 { MAX_STEPS } else { max_steps };
		self
	}
}
