//! `A = J M⁻¹ Jᵗ` over the constraint index space, applied without
//! forming `A`.
//!
//! Two constraints only couple through particles they share. Rows are
//! indexed by particle id once per evaluation, so a product costs time
//! proportional to the number of shared-particle pairs rather than the
//! square of the constraint count.

use fnv::FnvHashMap;
use nalgebra::DVector;

use crate::constraint::ConstraintRow;
use crate::linear_solver::ImplicitMatrix;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Coupling {
	k: usize,
	// s_i * s_k / m over the shared particle
	weight: f64,
}

pub struct ConstraintMatrix<'a> {
	rows: &'a [ConstraintRow],
	// sum over a row's particles of (summed sign)² / m
	diag: Vec<f64>,
	couplings: Vec<Vec<Coupling>>,
}

impl<'a> ConstraintMatrix<'a> {
	pub fn new(rows: &'a [ConstraintRow]) -> Self {
		// particle id -> (row, summed sign, mass)
		let mut touching: FnvHashMap<usize, Vec<(usize, f64, f64)>> = FnvHashMap::default();
		for (i, row) in rows.iter().enumerate() {
			for role in row.roles.iter() {
				let e = touching.entry(role.id).or_default();
				match e.iter_mut().find(|(k, _, _)| *k == i) {
					Some(entry) => entry.1 += role.sign,
					None => e.push((i, role.sign, role.mass)),
				}
			}
		}

		let mut diag = vec![0.0; rows.len()];
		let mut couplings = vec![Vec::new(); rows.len()];
		for entries in touching.values() {
			for &(i, s_i, m) in entries.iter() {
				diag[i] += s_i * s_i / m;
				for &(k, s_k, _) in entries.iter() {
					if k != i {
						couplings[i].push(Coupling {
							k,
							weight: s_i * s_k / m,
						});
					}
				}
			}
		}
		Self {
			rows,
			diag,
			couplings,
		}
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Number of (ordered) constraint pairs coupled through a shared particle.
	pub fn coupling_count(&self) -> usize {
		self.couplings.iter().map(Vec::len).sum()
	}
}

impl ImplicitMatrix for ConstraintMatrix<'_> {
	fn mat_vec_mult(&self, x: &DVector<f64>, r: &mut DVector<f64>) {
		for (i, row) in self.rows.iter().enumerate() {
			let mut acc = row.j.dot(&row.j) * self.diag[i] * x[i];
			for c in self.couplings[i].iter() {
				acc += row.j.dot(&self.rows[c.k].j) * c.weight * x[c.k];
			}
			r[i] = acc;
		}
	}
}
