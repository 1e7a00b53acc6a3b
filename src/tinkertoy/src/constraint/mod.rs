pub mod rod;
pub mod wire;

use crate::error::SimResult;
use crate::particle_list::ParticleList;
use crate::V2;

/// A particle's part in a constraint's Jacobian: the constraint gradient
/// with respect to this particle is `sign * J`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Role {
	pub id: usize,
	pub sign: f64,
	pub mass: f64,
}

/// Everything the multiplier solve needs from one constraint, sampled at
/// the current state.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintRow {
	pub c: f64,
	pub c_dot: f64,
	pub j: V2,
	pub j_dot: V2,
	// sum of sign * velocity over the roles
	pub qdot: V2,
	// sum of sign * accumulated force over the roles
	pub q_force: V2,
	pub roles: Vec<Role>,
}

pub trait Constraint {
	/// `(id, sign)` of every particle the constraint touches.
	fn signed_ids(&self) -> Vec<(usize, f64)>;

	fn c(&self, ps: &ParticleList) -> SimResult<f64>;

	fn c_dot(&self, ps: &ParticleList) -> SimResult<f64>;

	fn j(&self, ps: &ParticleList) -> SimResult<V2>;

	fn j_dot(&self, ps: &ParticleList) -> SimResult<V2>;

	fn roles(&self, ps: &ParticleList) -> SimResult<Vec<Role>> {
		self.signed_ids()
			.into_iter()
			.map(|(id, sign)| {
				Ok(Role {
					id,
					sign,
					mass: ps.get(id)?.get_mass(),
				})
			})
			.collect()
	}

	fn row(&self, ps: &ParticleList) -> SimResult<ConstraintRow> {
		let roles = self.roles(ps)?;
		let mut qdot = V2::zeros();
		let mut q_force = V2::zeros();
		for role in roles.iter() {
			let p = ps.get(role.id)?;
			qdot += role.sign * p.vel;
			q_force += role.sign * p.force;
		}
		Ok(ConstraintRow {
			c: self.c(ps)?,
			c_dot: self.c_dot(ps)?,
			j: self.j(ps)?,
			j_dot: self.j_dot(ps)?,
			qdot,
			q_force,
			roles,
		})
	}
}

impl ConstraintRow {
	/// Adds `sign * J * lambda` to every participating particle.
	pub fn apply(&self, ps: &mut ParticleList, lambda: f64) -> SimResult<()> {
		for role in self.roles.iter() {
			ps.get_mut(role.id)?.add_force(role.sign * self.j * lambda);
		}
		Ok(())
	}
}
