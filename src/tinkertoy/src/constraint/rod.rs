use crate::constraint::Constraint;
use crate::error::SimResult;
use crate::particle_list::ParticleList;
use crate::{INF, V2};
use protocol::pr_model::PrLink;

/// Keeps two particles at a fixed distance. `J` is the gradient with
/// respect to the first particle; the second particle's is `-J`.
#[derive(Clone, Debug, PartialEq)]
pub struct RodConstraint {
	p1: usize,
	p2: usize,
	dist: f64,
}

impl RodConstraint {
	pub fn new(p1: usize, p2: usize, dist: f64) -> Self {
		debug_assert_ne!(p1, p2, "rod needs two distinct particles");
		Self { p1, p2, dist }
	}

	pub fn get_id1(&self) -> usize {
		self.p1
	}

	pub fn get_id2(&self) -> usize {
		self.p2
	}

	pub fn get_mass1(&self, ps: &ParticleList) -> SimResult<f64> {
		Ok(ps.get(self.p1)?.get_mass())
	}

	pub fn get_mass2(&self, ps: &ParticleList) -> SimResult<f64> {
		Ok(ps.get(self.p2)?.get_mass())
	}

	pub fn rest_length(&self) -> f64 {
		self.dist
	}

	// position and velocity of p1 relative to p2
	fn relative(&self, ps: &ParticleList) -> SimResult<(V2, V2)> {
		let p1 = ps.get(self.p1)?;
		let p2 = ps.get(self.p2)?;
		Ok((p1.pos - p2.pos, p1.vel - p2.vel))
	}

	pub fn render(&self, ps: &ParticleList) -> SimResult<PrLink> {
		let a = ps.get(self.p1)?.pos;
		let b = ps.get(self.p2)?.pos;
		Ok(PrLink {
			particles: [self.p1, self.p2],
			ends: [[a[0], a[1]], [b[0], b[1]]],
		})
	}
}

impl Constraint for RodConstraint {
	fn signed_ids(&self) -> Vec<(usize, f64)> {
		vec![(self.p1, 1.0), (self.p2, -1.0)]
	}

	fn c(&self, ps: &ParticleList) -> SimResult<f64> {
		let (x, _) = self.relative(ps)?;
		Ok(x.norm() - self.dist)
	}

	fn c_dot(&self, ps: &ParticleList) -> SimResult<f64> {
		let (x, v) = self.relative(ps)?;
		let l = x.norm();
		if l == 0.0 {
			return Ok(INF);
		}
		Ok(v.dot(&x) / l)
	}

	fn j(&self, ps: &ParticleList) -> SimResult<V2> {
		let (x, _) = self.relative(ps)?;
		let l = x.norm();
		if l == 0.0 {
			return Ok(V2::repeat(INF));
		}
		Ok(x / l)
	}

	fn j_dot(&self, ps: &ParticleList) -> SimResult<V2> {
		let (x, v) = self.relative(ps)?;
		let l = x.norm();
		if l == 0.0 {
			return Ok(V2::repeat(INF));
		}
		Ok(v / l - x * x.dot(&v) / (l * x.norm_squared()))
	}
}
