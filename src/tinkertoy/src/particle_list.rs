use fnv::FnvHashMap;

use crate::error::{SimError, SimResult};
use crate::particle::Particle;

/// Ordered particle store with lookup by particle id.
///
/// Position in the list is not the id: after particles are appended or
/// removed the two can differ, so springs and constraints always resolve
/// their particles through [`ParticleList::get`].
#[derive(Clone, Debug, Default)]
pub struct ParticleList {
	particles: Vec<Particle>,
	slots: FnvHashMap<usize, usize>,
}

impl ParticleList {
	pub fn new(particles: Vec<Particle>) -> SimResult<Self> {
		let mut slots = FnvHashMap::default();
		for (slot, p) in particles.iter().enumerate() {
			p.check()?;
			if slots.insert(p.get_id(), slot).is_some() {
				return Err(SimError::DuplicateParticle(p.get_id()));
			}
		}
		Ok(Self { particles, slots })
	}

	pub fn len(&self) -> usize {
		self.particles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	pub fn contains(&self, id: usize) -> bool {
		self.slots.contains_key(&id)
	}

	pub fn get(&self, id: usize) -> SimResult<&Particle> {
		self.slots
			.get(&id)
			.map(|&slot| &self.particles[slot])
			.ok_or(SimError::UnknownParticle(id))
	}

	pub fn get_mut(&mut self, id: usize) -> SimResult<&mut Particle> {
		match self.slots.get(&id) {
			Some(&slot) => Ok(&mut self.particles[slot]),
			None => Err(SimError::UnknownParticle(id)),
		}
	}

	pub fn push(&mut self, p: Particle) -> SimResult<()> {
		p.check()?;
		if self.slots.contains_key(&p.get_id()) {
			return Err(SimError::DuplicateParticle(p.get_id()));
		}
		self.slots.insert(p.get_id(), self.particles.len());
		self.particles.push(p);
		Ok(())
	}

	pub fn pop(&mut self) -> Option<Particle> {
		let p = self.particles.pop()?;
		self.slots.remove(&p.get_id());
		Some(p)
	}

	/// Removes the particle with this id, keeping the order of the rest.
	pub fn remove(&mut self, id: usize) -> SimResult<Particle> {
		let slot = self.slots.remove(&id).ok_or(SimError::UnknownParticle(id))?;
		let p = self.particles.remove(slot);
		for s in self.slots.values_mut() {
			if *s > slot {
				*s -= 1;
			}
		}
		Ok(p)
	}

	// one past the largest id in use
	pub fn next_id(&self) -> usize {
		self.slots.keys().max().map_or(0, |id| id + 1)
	}

	pub fn ids(&self) -> Vec<usize> {
		self.particles.iter().map(|p| p.get_id()).collect()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
		self.particles.iter()
	}

	// ids and masses are private to Particle, so slots stay valid and
	// masses stay positive
	pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
		self.particles.iter_mut()
	}

	pub fn as_slice(&self) -> &[Particle] {
		&self.particles
	}

	pub fn into_vec(self) -> Vec<Particle> {
		self.particles
	}
}

impl std::ops::Index<usize> for ParticleList {
	type Output = Particle;
	fn index(&self, slot: usize) -> &Self::Output {
		&self.particles[slot]
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::V2;

	fn p(id: usize) -> Particle {
		Particle::new(id, V2::new(id as f64, 0.), 1.)
	}

	#[test]
	fn test_lookup_by_id() {
		let list = ParticleList::new(vec![p(7), p(2), p(5)]).unwrap();
		assert_eq!(list.get(2).unwrap().get_pos(), V2::new(2., 0.));
		assert_eq!(list[0].get_id(), 7);
		assert_eq!(list.next_id(), 8);
		assert_eq!(list.get(3), Err(SimError::UnknownParticle(3)));
	}

	#[test]
	fn test_duplicate_and_mass() {
		assert_eq!(
			ParticleList::new(vec![p(1), p(1)]).unwrap_err(),
			SimError::DuplicateParticle(1)
		);
		let bad = Particle::new(4, V2::zeros(), 0.);
		assert!(matches!(
			ParticleList::new(vec![bad]),
			Err(SimError::InvalidMass { id: 4, .. })
		));
	}

	#[test]
	fn test_push_pop() {
		let mut list = ParticleList::new(vec![p(0), p(1)]).unwrap();
		list.push(p(9)).unwrap();
		assert!(list.push(p(9)).is_err());
		assert_eq!(list.pop().map(|p| p.get_id()), Some(9));
		assert!(!list.contains(9));
		assert_eq!(list.ids(), vec![0, 1]);
	}

	#[test]
	fn test_remove_keeps_lookup() {
		let mut list = ParticleList::new(vec![p(4), p(8), p(6), p(1)]).unwrap();
		assert_eq!(list.remove(8).map(|p| p.get_id()), Ok(8));
		assert_eq!(list.ids(), vec![4, 6, 1]);
		assert_eq!(list.get(1).unwrap().get_pos(), V2::new(1., 0.));
		assert_eq!(list.get(6).unwrap().get_pos(), V2::new(6., 0.));
		assert_eq!(list.remove(8), Err(SimError::UnknownParticle(8)));
	}

	#[test]
	fn test_mass_cannot_be_zeroed_in_place() {
		let mut list = ParticleList::new(vec![p(0)]).unwrap();
		assert!(list.get_mut(0).unwrap().set_mass(0.).is_err());
		assert!(list.iter_mut().all(|p| p.set_mass(-1.).is_err()));
		assert_eq!(list.get(0).unwrap().get_mass(), 1.);
	}
}
