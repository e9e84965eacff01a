//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer.
//! The app is told about resizes after the surface is reconfigured, and gets
//! `on_exit` while the GPU context is still alive.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
