use crate::V2;

/// Input from whatever drives a [`World`](crate::pworld::World).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerMessage {
	TogglePause,
	/// Every particle back to its construction state.
	Reset,
	/// Grab at a position: the first grab creates a tethered particle,
	/// later ones move it.
	Grab(V2),
	Release,
}
