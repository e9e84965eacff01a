//! Horae engine crate.
//!
//! Platform + GPU runtime pieces: window loop, device/surface, input,
//! frame timing, logging, and a small lit-mesh renderer.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
