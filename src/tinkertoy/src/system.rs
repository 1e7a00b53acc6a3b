use ftlog::{debug, error, warn};
use nalgebra::DVector;

use crate::config::SimConfig;
use crate::constraint::rod::RodConstraint;
use crate::constraint::wire::CircularWireConstraint;
use crate::constraint::{Constraint, ConstraintRow};
use crate::error::{SimError, SimResult};
use crate::implicit_matrix::ConstraintMatrix;
use crate::linear_solver::{conj_grad, CgReport, CgStop};
use crate::particle::Particle;
use crate::particle_list::ParticleList;
use crate::spring::SpringForce;
use crate::V2;
use protocol::pr_model::PrModel;

/// Time derivative of one particle's phase state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Derivative {
	pub dpos: V2,
	pub dvel: V2,
}

/// Particles, the springs acting on them and the rods and wires holding
/// them together.
///
/// Constraints share one index space: wires first, then rods, each in
/// collection order. Multipliers, right-hand side and operator products
/// all use it.
pub struct System {
	particles: ParticleList,
	springs: Vec<SpringForce>,
	wires: Vec<CircularWireConstraint>,
	rods: Vec<RodConstraint>,
	config: SimConfig,
}

impl System {
	pub fn new(
		particles: Vec<Particle>,
		springs: Vec<SpringForce>,
		wires: Vec<CircularWireConstraint>,
		rods: Vec<RodConstraint>,
	) -> SimResult<Self> {
		Ok(Self {
			particles: ParticleList::new(particles)?,
			springs,
			wires,
			rods,
			config: SimConfig::default(),
		})
	}

	pub fn with_config(mut self, config: SimConfig) -> Self {
		self.config = config;
		self
	}

	pub fn config(&self) -> &SimConfig {
		&self.config
	}

	pub fn config_mut(&mut self) -> &mut SimConfig {
		&mut self.config
	}

	pub fn len(&self) -> usize {
		self.particles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	pub fn get_state(&self) -> &ParticleList {
		&self.particles
	}

	pub fn get_state_mut(&mut self) -> &mut ParticleList {
		&mut self.particles
	}

	/// Replaces the whole particle state. Ids must stay unique; springs
	/// and constraints keep pointing at the same ids.
	pub fn set_state(&mut self, particles: Vec<Particle>) -> SimResult<()> {
		self.particles = ParticleList::new(particles)?;
		Ok(())
	}

	pub fn take_state(&mut self) -> Vec<Particle> {
		std::mem::take(&mut self.particles).into_vec()
	}

	pub fn get_forces(&self) -> &[SpringForce] {
		&self.springs
	}

	pub fn get_rod_const(&self) -> &[RodConstraint] {
		&self.rods
	}

	pub fn get_wire_const(&self) -> &[CircularWireConstraint] {
		&self.wires
	}

	pub fn add_spring_force(&mut self, f: SpringForce) {
		self.springs.push(f);
	}

	pub fn pop_spring_force(&mut self) -> Option<SpringForce> {
		self.springs.pop()
	}

	/// Drops every spring for which `keep` returns false.
	pub fn retain_springs<F: FnMut(&SpringForce) -> bool>(&mut self, keep: F) {
		self.springs.retain(keep);
	}

	pub fn add_rod_const(&mut self, rod: RodConstraint) {
		self.rods.push(rod);
	}

	pub fn pop_rod_const(&mut self) -> Option<RodConstraint> {
		self.rods.pop()
	}

	pub fn add_wire_const(&mut self, wire: CircularWireConstraint) {
		self.wires.push(wire);
	}

	pub fn pop_wire_const(&mut self) -> Option<CircularWireConstraint> {
		self.wires.pop()
	}

	pub fn constraint_count(&self) -> usize {
		self.wires.len() + self.rods.len()
	}

	/// All constraints in index order.
	pub fn constraints(&self) -> impl Iterator<Item = &dyn Constraint> + '_ {
		self.wires
			.iter()
			.map(|w| w as &dyn Constraint)
			.chain(self.rods.iter().map(|r| r as &dyn Constraint))
	}

	pub fn reset(&mut self) {
		for p in self.particles.iter_mut() {
			p.reset();
		}
	}

	// back to the construction layout, velocities untouched
	pub fn remap(&mut self) {
		for p in self.particles.iter_mut() {
			p.pos = p.construct_pos;
		}
	}

	fn accumulate_forces(&mut self) -> SimResult<()> {
		let gravity = V2::new(0.0, -self.config.gravity);
		for p in self.particles.iter_mut() {
			p.force = gravity;
		}
		for f in self.springs.iter() {
			f.add_force(&mut self.particles)?;
		}
		Ok(())
	}

	fn constraint_rows(&self) -> SimResult<Vec<ConstraintRow>> {
		self.constraints().map(|c| c.row(&self.particles)).collect()
	}

	fn rhs(&self, rows: &[ConstraintRow]) -> DVector<f64> {
		let ks = self.config.ks;
		let kd = self.config.kd;
		DVector::from_iterator(
			rows.len(),
			rows.iter().map(|row| {
				let mut b = -row.j_dot.dot(&row.qdot);
				b -= row.j.dot(&row.q_force);
				b -= ks * row.c;
				b -= kd * row.c_dot;
				b
			}),
		)
	}

	/// Solves for the constraint multipliers and injects the constraint
	/// forces. Particle forces must already hold the applied forces.
	fn apply_constraint_forces(&mut self) -> SimResult<CgReport> {
		let rows = self.constraint_rows()?;
		let b = self.rhs(&rows);
		let mut lambda = DVector::zeros(rows.len());
		let report = {
			let a = ConstraintMatrix::new(&rows);
			conj_grad(&a, &mut lambda, &b, self.config.epsilon, self.config.max_steps)
		};
		debug!(
			"cg: {} constraints, {} iterations, residual {:e}",
			rows.len(),
			report.iterations,
			report.residual
		);
		if report.residual > self.config.epsilon {
			if report.stop == CgStop::DegenerateDirection {
				warn!(
					"cg stopped on a degenerate direction after {} iterations, residual {:e}",
					report.iterations, report.residual
				);
			} else {
				error!(
					"cg did not converge in {} iterations, residual {:e}",
					report.iterations, report.residual
				);
				return Err(SimError::SolverDiverged {
					residual: report.residual,
					iterations: report.iterations,
				});
			}
		}
		for (row, l) in rows.iter().zip(lambda.iter()) {
			row.apply(&mut self.particles, *l)?;
		}
		Ok(report)
	}

	/// Evaluates `(dx/dt, dv/dt)` for every particle, in state order, into
	/// `out`. Leaves the total force, constraint forces included, in each
	/// particle.
	pub fn deriv_eval(&mut self, out: &mut Vec<Derivative>) -> SimResult<CgReport> {
		self.accumulate_forces()?;
		let report = self.apply_constraint_forces()?;
		out.clear();
		out.extend(self.particles.iter().map(|p| Derivative {
			dpos: p.vel,
			dvel: p.force / p.get_mass(),
		}));
		Ok(report)
	}

	/// Kinetic and potential energy. Gravity does not scale with mass, so
	/// its potential is `gravity * y` per particle.
	pub fn energy(&self) -> SimResult<(f64, f64)> {
		let kinetic: f64 = self.particles.iter().map(Particle::kinetic_energy).sum();
		let mut potential: f64 = self
			.particles
			.iter()
			.map(|p| self.config.gravity * p.pos[1])
			.sum();
		for f in self.springs.iter() {
			potential += f.potential_energy(&self.particles)?;
		}
		Ok((kinetic, potential))
	}

	pub fn total_energy(&self) -> SimResult<f64> {
		let (k, u) = self.energy()?;
		Ok(k + u)
	}

	/// Largest `|C|` over all constraints.
	pub fn max_violation(&self) -> SimResult<f64> {
		let mut worst = 0.0f64;
		for c in self.constraints() {
			worst = worst.max(c.c(&self.particles)?.abs());
		}
		Ok(worst)
	}

	pub fn pr_model(&self) -> SimResult<PrModel> {
		Ok(PrModel {
			particles: self.particles.iter().map(Particle::render).collect(),
			springs: self
				.springs
				.iter()
				.map(|f| f.render(&self.particles))
				.collect::<SimResult<_>>()?,
			rods: self
				.rods
				.iter()
				.map(|r| r.render(&self.particles))
				.collect::<SimResult<_>>()?,
			wires: self.wires.iter().map(|w| w.render()).collect(),
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn p(id: usize, x: f64, y: f64) -> Particle {
		Particle::new(id, V2::new(x, y), 1.)
	}

	#[test]
	fn test_free_fall() {
		let mut sys = System::new(vec![p(0, 0., 0.), p(1, 1., 0.)], vec![], vec![], vec![])
			.unwrap()
			.with_config(SimConfig::default().with_gravity(2.));
		let mut out = vec![];
		let report = sys.deriv_eval(&mut out).unwrap();
		assert_eq!(report.iterations, 0);
		assert_eq!(out.len(), 2);
		assert_eq!(out[1].dvel, V2::new(0., -2.));
	}

	#[test]
	fn test_wire_cancels_radial_gravity() {
		// particle hanging straight below the wire center
		let mut sys = System::new(
			vec![p(0, 0., -1.)],
			vec![],
			vec![CircularWireConstraint::new(0, V2::zeros(), 1.)],
			vec![],
		)
		.unwrap()
		.with_config(SimConfig::default().with_gravity(9.81));
		let mut out = vec![];
		sys.deriv_eval(&mut out).unwrap();
		assert!(out[0].dvel.norm() < 1e-12, "{}", out[0].dvel);
	}

	#[test]
	fn test_rod_forces_are_opposite() {
		let mut sys = System::new(
			vec![p(0, 0., 0.), p(1, 1., 0.), p(2, 3., 0.)],
			vec![SpringForce::new(1, 2, 1., 2., 0.)],
			vec![],
			vec![RodConstraint::new(0, 1, 1.)],
		)
		.unwrap()
		.with_config(SimConfig::default().with_gravity(0.));
		let mut out = vec![];
		sys.deriv_eval(&mut out).unwrap();
		// the spring pulls particle 1 by 2, the rod drags particle 0 along
		assert!((out[0].dvel - V2::new(1., 0.)).norm() < 1e-12);
		assert!((out[1].dvel - V2::new(1., 0.)).norm() < 1e-12);
		assert!((out[2].dvel - V2::new(-2., 0.)).norm() < 1e-12);
	}

	#[test]
	fn test_dangling_reference() {
		let mut sys = System::new(vec![p(0, 0., 0.)], vec![], vec![], vec![]).unwrap();
		sys.add_rod_const(RodConstraint::new(0, 7, 1.));
		let mut out = vec![];
		assert_eq!(sys.deriv_eval(&mut out), Err(SimError::UnknownParticle(7)));
	}

	#[test]
	fn test_append_and_pop() {
		let mut sys = System::new(vec![p(0, 0., 0.), p(1, 1., 0.)], vec![], vec![], vec![]).unwrap();
		sys.add_spring_force(SpringForce::new(0, 1, 1., 1., 0.));
		sys.add_wire_const(CircularWireConstraint::new(0, V2::new(0., 1.), 1.));
		sys.add_rod_const(RodConstraint::new(0, 1, 1.));
		assert_eq!(sys.constraint_count(), 2);
		assert!(sys.pop_rod_const().is_some());
		assert!(sys.pop_wire_const().is_some());
		assert!(sys.pop_spring_force().is_some());
		assert!(sys.pop_spring_force().is_none());
		assert_eq!(sys.constraint_count(), 0);
	}

	#[test]
	fn test_state_replacement_keeps_ids() {
		let mut sys = System::new(
			vec![p(0, 0., 0.), p(1, 1., 0.)],
			vec![],
			vec![],
			vec![RodConstraint::new(0, 1, 1.)],
		)
		.unwrap();
		let mut state = sys.take_state();
		state.reverse();
		state.push(p(5, 2., 0.));
		sys.set_state(state).unwrap();
		assert_eq!(sys.get_state().ids(), vec![1, 0, 5]);
		assert_eq!(sys.max_violation().unwrap(), 0.);
		let mut dup = sys.take_state();
		dup.push(p(5, 0., 0.));
		assert_eq!(sys.set_state(dup), Err(SimError::DuplicateParticle(5)));
	}

	#[test]
	fn test_reset() {
		let mut sys = System::new(vec![p(0, 1., 1.)], vec![], vec![], vec![]).unwrap();
		let mut out = vec![];
		sys.deriv_eval(&mut out).unwrap();
		sys.get_state_mut().get_mut(0).unwrap().pos = V2::new(4., 4.);
		sys.reset();
		let p0 = sys.get_state().get(0).unwrap();
		assert_eq!(p0.pos, V2::new(1., 1.));
		assert_eq!(p0.force, V2::zeros());
	}

	#[test]
	fn test_pr_model() {
		let sys = System::new(
			vec![p(0, 0., 0.), p(1, 1., 0.)],
			vec![SpringForce::new(0, 1, 1., 1., 0.)],
			vec![CircularWireConstraint::new(1, V2::new(1., 1.), 1.)],
			vec![RodConstraint::new(0, 1, 1.)],
		)
		.unwrap();
		let model = sys.pr_model().unwrap();
		assert_eq!(model.particles.len(), 2);
		assert_eq!(model.springs[0].ends, [[0., 0.], [1., 0.]]);
		assert_eq!(model.rods[0].particles, [0, 1]);
		assert_eq!(model.wires[0].radius, 1.);
	}
}
