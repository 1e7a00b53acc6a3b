//! Conjugate gradient for symmetric positive (semi-)definite systems whose
//! matrix is only available through matrix-vector products.

use nalgebra::DVector;

pub const MAX_STEPS: usize = 100;

// recompute the residual from scratch every this many iterations
const RESIDUAL_REFRESH: usize = 64;

/// A matrix the solver can use: `r = A x`.
pub trait ImplicitMatrix {
	fn mat_vec_mult(&self, x: &DVector<f64>, r: &mut DVector<f64>);
}

impl<F> ImplicitMatrix for F
where
	F: Fn(&DVector<f64>, &mut DVector<f64>),
{
	fn mat_vec_mult(&self, x: &DVector<f64>, r: &mut DVector<f64>) {
		self(x, r)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CgStop {
	Converged,
	BudgetExhausted,
	// dᵗAd == 0, x is the best estimate so far
	DegenerateDirection,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CgReport {
	/// Squared norm of the final residual.
	pub residual: f64,
	pub iterations: usize,
	pub stop: CgStop,
}

/// Solves `A x = b`, starting from the `x` passed in.
///
/// Stops when the squared residual is at most `epsilon`, after `max_steps`
/// iterations (`0` means [`MAX_STEPS`]), or when a search direction has
/// `dᵗAd == 0`.
pub fn conj_grad<A: ImplicitMatrix + ?Sized>(
	a: &A,
	x: &mut DVector<f64>,
	b: &DVector<f64>,
	epsilon: f64,
	max_steps: usize,
) -> CgReport {
	let n = b.len();
	debug_assert_eq!(x.len(), n);
	let i_max = if max_steps == 0 { MAX_STEPS } else { max_steps };

	let mut t = DVector::zeros(n);
	a.mat_vec_mult(x, &mut t);
	let mut r = b - &t;
	let mut r_sqr_len = r.norm_squared();
	let mut d = r.clone();

	let mut i = 0;
	if r_sqr_len <= epsilon {
		return CgReport {
			residual: r_sqr_len,
			iterations: i,
			stop: CgStop::Converged,
		};
	}
	while i < i_max {
		i += 1;
		a.mat_vec_mult(&d, &mut t);
		let u = d.dot(&t);
		if u == 0.0 {
			return CgReport {
				residual: r_sqr_len,
				iterations: i,
				stop: CgStop::DegenerateDirection,
			};
		}

		let alpha = r_sqr_len / u;
		x.axpy(alpha, &d, 1.0);

		if i % RESIDUAL_REFRESH != 0 {
			r.axpy(-alpha, &t, 1.0);
		} else {
			a.mat_vec_mult(x, &mut t);
			r.copy_from(b);
			r -= &t;
		}

		let r_sqr_len_old = r_sqr_len;
		r_sqr_len = r.norm_squared();
		if r_sqr_len <= epsilon {
			return CgReport {
				residual: r_sqr_len,
				iterations: i,
				stop: CgStop::Converged,
			};
		}

		// d = r + beta * d
		let beta = r_sqr_len / r_sqr_len_old;
		d.axpy(1.0, &r, beta);
	}
	CgReport {
		residual: r_sqr_len,
		iterations: i,
		stop: CgStop::BudgetExhausted,
	}
}
