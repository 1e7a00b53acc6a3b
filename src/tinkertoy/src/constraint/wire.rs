use crate::constraint::Constraint;
use crate::error::SimResult;
use crate::particle_list::ParticleList;
use crate::{INF, V2};
use protocol::pr_model::PrCircle;

/// Keeps one particle on a circle. The residual is in squared form,
/// `|x - center|² - r²`, while `J` is the unit radial direction.
#[derive(Clone, Debug, PartialEq)]
pub struct CircularWireConstraint {
	p: usize,
	center: V2,
	radius: f64,
}

impl CircularWireConstraint {
	pub fn new(p: usize, center: V2, radius: f64) -> Self {
		Self { p, center, radius }
	}

	pub fn get_id(&self) -> usize {
		self.p
	}

	pub fn get_mass(&self, ps: &ParticleList) -> SimResult<f64> {
		Ok(ps.get(self.p)?.get_mass())
	}

	pub fn center(&self) -> V2 {
		self.center
	}

	pub fn radius(&self) -> f64 {
		self.radius
	}

	fn relative(&self, ps: &ParticleList) -> SimResult<(V2, V2)> {
		let p = ps.get(self.p)?;
		Ok((p.pos - self.center, p.vel))
	}

	pub fn render(&self) -> PrCircle {
		PrCircle {
			particle: self.p,
			center: [self.center[0], self.center[1]],
			radius: self.radius,
		}
	}
}

impl Constraint for CircularWireConstraint {
	fn signed_ids(&self) -> Vec<(usize, f64)> {
		vec![(self.p, 1.0)]
	}

	fn c(&self, ps: &ParticleList) -> SimResult<f64> {
		let (x, _) = self.relative(ps)?;
		Ok(x.norm_squared() - self.radius.powi(2))
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
		Ok((v - x * v.dot(&x) / x.norm_squared()) / l)
	}
}
