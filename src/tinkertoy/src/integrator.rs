use crate::error::SimResult;
use crate::system::{Derivative, System};
use crate::V2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Integrator {
	/// `x += x' dt`
	Euler,
	/// Midpoint RK2.
	Midpoint,
	/// Velocity first, then position with the updated velocity.
	SymplecticEuler,
	/// Classical fourth order Runge-Kutta.
	#[default]
	Rk4,
}

impl Integrator {
	/// `1` Euler, `2` midpoint, `3` symplectic Euler, `4` or anything
	/// else RK4.
	pub fn from_code(code: &str) -> Self {
		match code.trim().chars().next() {
			Some('1') => Self::Euler,
			Some('2') => Self::Midpoint,
			Some('3') => Self::SymplecticEuler,
			_ => Self::Rk4,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Euler => "euler",
			Self::Midpoint => "rk2",
			Self::SymplecticEuler => "symplectic euler",
			Self::Rk4 => "rk4",
		}
	}

	/// Derivative evaluations per step.
	pub fn evaluations(self) -> usize {
		match self {
			Self::Euler | Self::SymplecticEuler => 1,
			Self::Midpoint => 2,
			Self::Rk4 => 4,
		}
	}
}

// working buffers, reused between steps
#[derive(Default)]
struct Scratch {
	origin: Vec<(V2, V2)>,
	k: [Vec<Derivative>; 4],
}

/// An integrator together with its scratch space.
pub struct Stepper {
	method: Integrator,
	scratch: Scratch,
}

fn save(sys: &System, origin: &mut Vec<(V2, V2)>) {
	origin.clear();
	origin.extend(sys.get_state().iter().map(|p| (p.pos, p.vel)));
}

fn restore(sys: &mut System, origin: &[(V2, V2)]) {
	for (p, (pos, vel)) in sys.get_state_mut().iter_mut().zip(origin.iter()) {
		p.pos = *pos;
		p.vel = *vel;
	}
}

// state = origin + k * h
fn offset(sys: &mut System, origin: &[(V2, V2)], k: &[Derivative], h: f64) {
	for ((p, (pos, vel)), d) in sys
		.get_state_mut()
		.iter_mut()
		.zip(origin.iter())
		.zip(k.iter())
	{
		p.pos = pos + d.dpos * h;
		p.vel = vel + d.dvel * h;
	}
}

impl Stepper {
	pub fn new(method: Integrator) -> Self {
		Self {
			method,
			scratch: Scratch::default(),
		}
	}

	pub fn method(&self) -> Integrator {
		self.method
	}

	/// Advances `sys` by `dt`. On error the state is left as it was
	/// before the call.
	pub fn step(&mut self, sys: &mut System, dt: f64) -> SimResult<()> {
		if sys.is_empty() {
			return Ok(());
		}
		save(sys, &mut self.scratch.origin);
		let result = self.advance(sys, dt);
		if result.is_err() {
			restore(sys, &self.scratch.origin);
		}
		result
	}

	fn advance(&mut self, sys: &mut System, dt: f64) -> SimResult<()> {
		let origin = &self.scratch.origin;
		let [k1, k2, k3, k4] = &mut self.scratch.k;
		match self.method {
			Integrator::Euler => {
				sys.deriv_eval(k1)?;
				offset(sys, origin, k1, dt);
			}
			Integrator::Midpoint => {
				sys.deriv_eval(k1)?;
				offset(sys, origin, k1, dt / 2.0);
				sys.deriv_eval(k2)?;
				offset(sys, origin, k2, dt);
			}
			Integrator::SymplecticEuler => {
				sys.deriv_eval(k1)?;
				for (p, d) in sys.get_state_mut().iter_mut().zip(k1.iter()) {
					p.vel += d.dvel * dt;
				}
				for p in sys.get_state_mut().iter_mut() {
					p.pos += p.vel * dt;
				}
			}
			Integrator::Rk4 => {
				sys.deriv_eval(k1)?;
				offset(sys, origin, k1, dt / 2.0);
				sys.deriv_eval(k2)?;
				offset(sys, origin, k2, dt / 2.0);
				sys.deriv_eval(k3)?;
				offset(sys, origin, k3, dt);
				sys.deriv_eval(k4)?;
				let parts = k1.iter().zip(k2.iter()).zip(k3.iter()).zip(k4.iter());
				for ((p, (pos, vel)), (((a, b), c), d)) in
					sys.get_state_mut().iter_mut().zip(origin.iter()).zip(parts)
				{
					p.pos = pos + (a.dpos + b.dpos * 2.0 + c.dpos * 2.0 + d.dpos) * (dt / 6.0);
					p.vel = vel + (a.dvel + b.dvel * 2.0 + c.dvel * 2.0 + d.dvel) * (dt / 6.0);
				}
			}
		}
		Ok(())
	}
}
