use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for raw window events, before the runtime handles them.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called after the surface was reconfigured for a new drawable size
    /// (physical pixels). Never called with a zero dimension.
    fn on_resize(&mut self, window_id: WindowId, width: u32, height: u32) {
        let _ = (window_id, width, height);
    }

    /// Called once per display refresh per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once before the window (and its GPU context) is destroyed.
    ///
    /// GPU objects owned by the app must be released here; the device is
    /// still alive for the duration of the call.
    fn on_exit(&mut self, window_id: WindowId) {
        let _ = window_id;
    }
}
