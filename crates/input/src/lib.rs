//! Desktop input mapped to demo actions.
//!
//! # Invariants
//! - Window events never touch the camera directly; they only update
//!   [`InputState`], which is polled once per frame.
//! - Mouse-look is off unless explicitly enabled.

pub mod action;
pub mod state;

pub use action::Action;
pub use state::{Binding, InputState, KeyBindings};
