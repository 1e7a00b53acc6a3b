use crate::error::SimResult;
use crate::particle_list::ParticleList;
use crate::{INF, V2};
use protocol::pr_model::PrLink;

/// Damped spring between two particles.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringForce {
	p1: usize,
	p2: usize,
	dist: f64,
	ks: f64,
	kd: f64,
}

impl SpringForce {
	pub fn new(p1: usize, p2: usize, dist: f64, ks: f64, kd: f64) -> Self {
		Self { p1, p2, dist, ks, kd }
	}

	pub fn ids(&self) -> [usize; 2] {
		[self.p1, self.p2]
	}

	pub fn rest_length(&self) -> f64 {
		self.dist
	}

	/// Force acting on the first particle; the second one receives its negation.
	pub fn force(&self, ps: &ParticleList) -> SimResult<V2> {
		let p1 = ps.get(self.p1)?;
		let p2 = ps.get(self.p2)?;
		let dx = p1.pos - p2.pos;
		let norm_dx = dx.norm();
		// coincident particles: large damping term, zero direction
		let (v_dx, dir) = if norm_dx == 0.0 {
			(INF, V2::zeros())
		} else {
			((p1.vel - p2.vel).dot(&dx) / norm_dx, dx / norm_dx)
		};
		Ok(-(self.ks * (norm_dx - self.dist) + self.kd * v_dx) * dir)
	}

	/// Accumulates into both particles' force; never clears it.
	pub fn add_force(&self, ps: &mut ParticleList) -> SimResult<()> {
		let f = self.force(ps)?;
		ps.get_mut(self.p1)?.add_force(f);
		ps.get_mut(self.p2)?.add_force(-f);
		Ok(())
	}

	pub fn potential_energy(&self, ps: &ParticleList) -> SimResult<f64> {
		let l = (ps.get(self.p1)?.pos - ps.get(self.p2)?.pos).norm();
		Ok(0.5 * self.ks * (l - self.dist).powi(2))
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

#[cfg(test)]
mod test {
	use super::*;
	use crate::particle::Particle;

	fn pair(x2: V2, v1: V2) -> ParticleList {
		ParticleList::new(vec![
			Particle::new(0, V2::zeros(), 1.).with_vel(v1),
			Particle::new(1, x2, 1.),
		])
		.unwrap()
	}

	#[test]
	fn test_stretched_spring_pulls_together() {
		let mut ps = pair(V2::new(2., 0.), V2::zeros());
		let s = SpringForce::new(0, 1, 1., 3., 0.);
		s.add_force(&mut ps).unwrap();
		assert_eq!(ps.get(0).unwrap().force, V2::new(3., 0.));
		assert_eq!(ps.get(1).unwrap().force, V2::new(-3., 0.));
		assert_eq!(s.potential_energy(&ps).unwrap(), 1.5);
	}

	#[test]
	fn test_damping_opposes_relative_velocity() {
		// at rest length, particle 0 moving away from particle 1
		let ps = pair(V2::new(1., 0.), V2::new(-2., 0.));
		let s = SpringForce::new(0, 1, 1., 3., 0.5);
		assert_eq!(s.force(&ps).unwrap(), V2::new(1., 0.));
	}

	#[test]
	fn test_coincident_particles_stay_finite() {
		let ps = pair(V2::zeros(), V2::new(1., 1.));
		let s = SpringForce::new(0, 1, 1., 3., 0.5);
		let f = s.force(&ps).unwrap();
		assert!(f.iter().all(|x| x.is_finite()));
	}

	#[test]
	fn test_forces_accumulate() {
		let mut ps = pair(V2::new(2., 0.), V2::zeros());
		ps.get_mut(0).unwrap().force = V2::new(0., -1.);
		SpringForce::new(0, 1, 1., 3., 0.).add_force(&mut ps).unwrap();
		assert_eq!(ps.get(0).unwrap().force, V2::new(3., -1.));
	}
}
