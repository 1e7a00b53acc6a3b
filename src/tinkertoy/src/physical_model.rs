use crate::config::SimConfig;
use crate::constraint::rod::RodConstraint;
use crate::constraint::wire::CircularWireConstraint;
use crate::error::SimResult;
use crate::particle::Particle;
use crate::spring::SpringForce;
use crate::system::System;
use crate::V2;

const CLOTH_KS: f64 = 4.0;
const CLOTH_KD: f64 = 1.0;
const ANCHOR_MASS: f64 = 3.0;
const ANCHOR_KS: f64 = 10.0;
const ANCHOR_KD: f64 = 1.0;

/// Loose collections for a scene, before they are checked and owned by a
/// [`System`].
#[derive(Clone, Debug)]
pub struct PhysicalModel {
	pub particles: Vec<Particle>,
	pub springs: Vec<SpringForce>,
	pub wires: Vec<CircularWireConstraint>,
	pub rods: Vec<RodConstraint>,
}

impl PhysicalModel {
	/// A `rows` x `cols` sheet hanging from two heavy anchors that slide
	/// on circular wires left and right of the top row.
	///
	/// Particle `i * cols + k` sits at row `i`, column `k`. The anchors
	/// take the two ids after the sheet. The top row alternates rods and
	/// springs; every other row is held by weft, warp and shear springs.
	pub fn new_cloth(rows: usize, cols: usize, dist: f64, center: V2) -> Self {
		assert!(rows > 0 && cols > 0);
		let x_off = V2::new(dist, 0.0);
		let y_off = V2::new(0.0, -dist);
		let id = |i: usize, k: usize| i * cols + k;

		let mut particles = Vec::with_capacity(rows * cols + 2);
		for i in 0..rows {
			for k in 0..cols {
				let pos = center + x_off * k as f64 + y_off * i as f64;
				particles.push(Particle::new(id(i, k), pos, 1.0));
			}
		}

		let left = rows * cols;
		let right = left + 1;
		let span = cols as f64;
		particles.push(Particle::new(left, center - x_off * 2.0 - y_off, ANCHOR_MASS));
		particles.push(Particle::new(
			right,
			center + x_off * (span + 1.0) - y_off,
			ANCHOR_MASS,
		));
		let wires = vec![
			CircularWireConstraint::new(left, center - x_off * 3.0 - y_off, dist),
			CircularWireConstraint::new(right, center + x_off * (span + 2.0) - y_off, dist),
		];

		let mut springs = vec![
			SpringForce::new(left, id(0, 0), 2.0 * dist, ANCHOR_KS, ANCHOR_KD),
			SpringForce::new(right, id(0, cols - 1), 2.0 * dist, ANCHOR_KS, ANCHOR_KD),
		];
		let mut rods = Vec::new();
		let cloth = |p1, p2, l| SpringForce::new(p1, p2, l, CLOTH_KS, CLOTH_KD);

		for k in 0..cols - 1 {
			if k % 2 == 0 {
				rods.push(RodConstraint::new(id(0, k), id(0, k + 1), dist));
			} else {
				springs.push(cloth(id(0, k), id(0, k + 1), dist));
			}
		}

		let diagonal = std::f64::consts::SQRT_2 * dist;
		for i in 1..rows {
			for k in 0..cols {
				if k + 1 != cols {
					// weft
					springs.push(cloth(id(i, k), id(i, k + 1), dist));
					springs.push(cloth(id(i, k), id(i - 1, k + 1), diagonal));
				}
				if k != 0 {
					springs.push(cloth(id(i, k), id(i - 1, k - 1), diagonal));
				}
				// warp
				springs.push(cloth(id(i, k), id(i - 1, k), dist));
			}
		}

		Self {
			particles,
			springs,
			wires,
			rods,
		}
	}

	/// Ids of the two wire-bound anchors of a cloth built with `rows` x
	/// `cols`.
	pub fn cloth_anchors(rows: usize, cols: usize) -> [usize; 2] {
		[rows * cols, rows * cols + 1]
	}

	pub fn into_system(self, config: SimConfig) -> SimResult<System> {
		Ok(System::new(self.particles, self.springs, self.wires, self.rods)?
			.with_config(config))
	}
}

impl Default for PhysicalModel {
	fn default() -> Self {
		Self::new_cloth(10, 10, 0.1, V2::new(-0.5, 0.5))
	}
}
