use ftlog::{debug, info};

use crate::config::SimConfig;
use crate::controller_message::ControllerMessage;
use crate::error::{SimError, SimResult};
use crate::integrator::{Integrator, Stepper};
use crate::particle::Particle;
use crate::physical_model::PhysicalModel;
use crate::spring::SpringForce;
use crate::system::System;
use crate::V2;
use protocol::pr_model::PrModel;

const TETHER_REST: f64 = 0.2;
const TETHER_KS: f64 = 0.1;
const TETHER_KD: f64 = 0.05;

/// A system, an integrator and the interaction state around them.
pub struct World {
	pub dt: f64,
	system: System,
	stepper: Stepper,
	paused: bool,
	// id of the grabbed particle, if any
	tether: Option<usize>,
	anchors: [usize; 2],
}

impl World {
	/// The default cloth scene.
	pub fn cloth(method: Integrator, config: SimConfig) -> SimResult<Self> {
		Ok(Self::new(PhysicalModel::default().into_system(config)?, method))
	}

	/// Starts paused. Grabs are tethered to particles 4 and 5.
	pub fn new(system: System, method: Integrator) -> Self {
		Self {
			dt: 0.01,
			system,
			stepper: Stepper::new(method),
			paused: true,
			tether: None,
			anchors: [4, 5],
		}
	}

	pub fn with_dt(mut self, dt: f64) -> Self {
		self.dt = dt;
		self
	}

	pub fn with_anchors(mut self, anchors: [usize; 2]) -> Self {
		self.anchors = anchors;
		self
	}

	pub fn with_running(mut self) -> Self {
		self.paused = false;
		self
	}

	pub fn is_paused(&self) -> bool {
		self.paused
	}

	pub fn grabbed(&self) -> Option<usize> {
		self.tether
	}

	pub fn system(&self) -> &System {
		&self.system
	}

	pub fn system_mut(&mut self) -> &mut System {
		&mut self.system
	}

	pub fn handle(&mut self, msg: ControllerMessage) -> SimResult<()> {
		match msg {
			ControllerMessage::TogglePause => {
				self.paused = !self.paused;
				info!("paused: {}", self.paused);
			}
			ControllerMessage::Reset => {
				self.system.reset();
				info!("reset {} particles", self.system.len());
			}
			ControllerMessage::Grab(pos) => self.grab(pos)?,
			ControllerMessage::Release => self.release()?,
		}
		Ok(())
	}

	fn grab(&mut self, pos: V2) -> SimResult<()> {
		// grabs only act on a running simulation
		if self.paused {
			debug!("grab ignored while paused");
			return Ok(());
		}
		if let Some(id) = self.tether {
			self.system.get_state_mut().get_mut(id)?.pos = pos;
			return Ok(());
		}
		for anchor in self.anchors {
			if !self.system.get_state().contains(anchor) {
				return Err(SimError::UnknownParticle(anchor));
			}
		}
		let id = self.system.get_state().next_id();
		self.system.get_state_mut().push(Particle::new(id, pos, 1.0))?;
		for anchor in self.anchors {
			self.system.add_spring_force(SpringForce::new(
				anchor, id, TETHER_REST, TETHER_KS, TETHER_KD,
			));
		}
		self.tether = Some(id);
		info!("grab particle {} at ({:.3}, {:.3})", id, pos.x, pos.y);
		Ok(())
	}

	fn release(&mut self) -> SimResult<()> {
		let Some(id) = self.tether.take() else {
			return Ok(());
		};
		self.system.retain_springs(|f| !f.ids().contains(&id));
		self.system.get_state_mut().remove(id)?;
		info!("release particle {}", id);
		Ok(())
	}

	/// One step when running. While paused, positions follow the
	/// construction layout.
	pub fn tick(&mut self) -> SimResult<()> {
		if self.paused {
			self.system.remap();
			return Ok(());
		}
		self.stepper.step(&mut self.system, self.dt)
	}

	pub fn pr_model(&self) -> SimResult<PrModel> {
		self.system.pr_model()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_grab_and_release() {
		let mut world = World::cloth(Integrator::Rk4, SimConfig::default()).unwrap().with_running();
		let springs = world.system().get_forces().len();
		world.handle(ControllerMessage::Grab(V2::new(0.1, 0.2))).unwrap();
		assert_eq!(world.grabbed(), Some(102));
		assert_eq!(world.system().len(), 103);
		assert_eq!(world.system().get_forces().len(), springs + 2);
		assert_eq!(world.system().get_forces()[springs].ids(), [4, 102]);

		world.handle(ControllerMessage::Grab(V2::new(0.3, 0.2))).unwrap();
		assert_eq!(world.system().len(), 103);
		let grabbed = world.system().get_state().get(102).unwrap();
		assert_eq!(grabbed.get_pos(), V2::new(0.3, 0.2));

		world.handle(ControllerMessage::Release).unwrap();
		assert_eq!(world.grabbed(), None);
		assert_eq!(world.system().len(), 102);
		assert_eq!(world.system().get_forces().len(), springs);
		// release without a grab is ignored
		world.handle(ControllerMessage::Release).unwrap();
		assert_eq!(world.system().len(), 102);
	}

	#[test]
	fn test_grab_needs_anchors() {
		let system =
			System::new(vec![Particle::new(0, V2::zeros(), 1.)], vec![], vec![], vec![]).unwrap();
		let mut world = World::new(system, Integrator::Euler).with_running();
		assert_eq!(
			world.handle(ControllerMessage::Grab(V2::zeros())),
			Err(SimError::UnknownParticle(4))
		);
		assert_eq!(world.system().len(), 1);
	}

	#[test]
	fn test_grab_ignored_while_paused() {
		let mut world = World::cloth(Integrator::Rk4, SimConfig::default()).unwrap();
		world.handle(ControllerMessage::Grab(V2::new(0.1, 0.2))).unwrap();
		assert_eq!(world.grabbed(), None);
		assert_eq!(world.system().len(), 102);
	}

	#[test]
	fn test_release_after_reorder_removes_grabbed_particle() {
		let mut world = World::cloth(Integrator::Rk4, SimConfig::default()).unwrap().with_running();
		let springs = world.system().get_forces().len();
		world.handle(ControllerMessage::Grab(V2::new(0.1, 0.2))).unwrap();
		let mut reversed = world.system_mut().take_state();
		reversed.reverse();
		world.system_mut().set_state(reversed).unwrap();

		world.handle(ControllerMessage::Release).unwrap();
		let state = world.system().get_state();
		assert_eq!(state.len(), 102);
		assert!(!state.contains(102));
		assert!(state.contains(0));
		assert_eq!(world.system().get_forces().len(), springs);
		world.tick().unwrap();
	}

	#[test]
	fn test_paused_tick_remaps() {
		let mut world = World::cloth(Integrator::Rk4, SimConfig::default()).unwrap();
		assert!(world.is_paused());
		world.handle(ControllerMessage::TogglePause).unwrap();
		for _ in 0..5 {
			world.tick().unwrap();
		}
		let p = world.system().get_state().get(55).unwrap();
		assert_ne!(p.get_pos(), p.construct_pos);

		world.handle(ControllerMessage::TogglePause).unwrap();
		world.tick().unwrap();
		let p = world.system().get_state().get(55).unwrap();
		assert_eq!(p.get_pos(), p.construct_pos);
		assert_ne!(p.get_vel(), V2::zeros());

		world.handle(ControllerMessage::Reset).unwrap();
		let p = world.system().get_state().get(55).unwrap();
		assert_eq!(p.get_vel(), V2::zeros());
	}

	#[test]
	fn test_tethered_world_steps() {
		let mut world = World::cloth(Integrator::Rk4, SimConfig::default()).unwrap().with_running();
		world.handle(ControllerMessage::Grab(V2::new(0.0, 0.9))).unwrap();
		for _ in 0..10 {
			world.tick().unwrap();
		}
		let model = world.pr_model().unwrap();
		assert_eq!(model.particles.len(), 103);
	}
}
