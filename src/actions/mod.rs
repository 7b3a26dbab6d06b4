pub mod commands;
pub mod controller;
pub mod state;

pub use controller::{ActionBar, ActionError, ActionTiming};
pub use state::{ActionKind, ActionState, ActionStates};
