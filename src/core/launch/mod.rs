pub mod args;
pub mod sequencer;

pub use args::{LaunchArgs, ProcessRole};
pub use sequencer::Launcher;
