use crate::error::{SimError, SimResult};
use crate::V2;
use protocol::pr_model::PrParticle;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
	id: usize, // stable key for springs and constraints
	mass: f64, // positive and finite once stored in a ParticleList
	pub construct_pos: V2,
	pub pos: V2,
	pub vel: V2,
	pub force: V2,
}

fn check_mass(id: usize, mass: f64) -> SimResult<()> {
	if mass > 0.0 && mass.is_finite() {
		Ok(())
	} else {
		Err(SimError::InvalidMass { id, mass })
	}
}

impl Particle {
	pub fn new(id: usize, construct_pos: V2, mass: f64) -> Self {
		Self {
			id,
			mass,
			construct_pos,
			pos: construct_pos,
			vel: V2::zeros(),
			force: V2::zeros(),
		}
	}

	pub fn with_vel(mut self, vel: V2) -> Self {
		self.vel = vel;
		self
	}

	pub fn get_id(&self) -> usize {
		self.id
	}

	pub fn get_pos(&self) -> V2 {
		self.pos
	}

	pub fn get_vel(&self) -> V2 {
		self.vel
	}

	pub fn get_mass(&self) -> f64 {
		self.mass
	}

	pub fn set_mass(&mut self, mass: f64) -> SimResult<()> {
		check_mass(self.id, mass)?;
		self.mass = mass;
		Ok(())
	}

	pub(crate) fn check(&self) -> SimResult<()> {
		check_mass(self.id, self.mass)
	}

	pub fn get_imass(&self) -> f64 {
		1.0 / self.mass
	}

	pub fn add_force(&mut self, f: V2) {
		self.force += f;
	}

	pub fn reset(&mut self) {
		self.pos = self.construct_pos;
		self.vel = V2::zeros();
		self.force = V2::zeros();
	}

	pub fn kinetic_energy(&self) -> f64 {
		0.5 * self.mass * self.vel.norm_squared()
	}

	pub fn render(&self) -> PrParticle {
		PrParticle {
			id: self.id,
			pos: [self.pos[0], self.pos[1]],
		}
	}
}
