//! scope-viewer library crate.
//!
//! Live single-window camera viewer: capture, aspect-preserving fit, a fixed
//! cadence render loop and a guarded shutdown control. The binary in
//! `main.rs` wires these to nokhwa and minifb; tests drive them with fakes.

pub mod camera;
pub mod cli;
pub mod config;
pub mod control;
pub mod convert;
pub mod display;
pub mod draw;
pub mod error;
pub mod layout;
pub mod render;
pub mod scaler;
pub mod scheduler;
pub mod session;
pub mod shutdown;
pub mod types;
