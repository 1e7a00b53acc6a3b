// pr_model: Physical model for rendering

#[derive(Clone, Debug, PartialEq)]
pub struct PrParticle {
	pub id: usize,
	pub pos: [f64; 2],
}

// spring or rod, drawn as a line between two particles
#[derive(Clone, Debug, PartialEq)]
pub struct PrLink {
	pub particles: [usize; 2],
	pub ends: [[f64; 2]; 2],
}

// circular wire
#[derive(Clone, Debug, PartialEq)]
pub struct PrCircle {
	pub particle: usize,
	pub center: [f64; 2],
	pub radius: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrModel {
	pub particles: Vec<PrParticle>,
	pub springs: Vec<PrLink>,
	pub rods: Vec<PrLink>,
	pub wires: Vec<PrCircle>,
}

impl PrModel {
	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	// axis aligned bounds of all particles, (min, max)
	pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
		let first = self.particles.first()?.pos;
		let mut min = first;
		let mut max = first;
		for p in self.particles.iter() {
			for k in 0..2 {
				min[k] = min[k].min(p.pos[k]);
				max[k] = max[k].max(p.pos[k]);
			}
		}
		Some((min, max))
	}
}
