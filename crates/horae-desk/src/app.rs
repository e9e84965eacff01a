use std::path::PathBuf;

use winit::window::WindowId;

use horae_clock::camera::CameraInput;
use horae_clock::style::StyleTarget;
use horae_clock::{
    ClockConfig, ClockScene, Command, ImageSource, ThreadedLoader, TimeSample, WgpuHost,
};
use horae_engine::core::{App, AppControl, FrameCtx};
use horae_engine::input::{Key, MouseButton};

use crate::controls::{ControlAction, Controls};

/// Radians per logical pixel of drag.
const ORBIT_SPEED: f32 = 0.005;
/// Distance factor per wheel line.
const ZOOM_BASE: f32 = 0.9;

pub struct DeskApp {
    scene: ClockScene<WgpuHost, ThreadedLoader>,
    /// Created on the first frame, once a device exists.
    host: Option<WgpuHost>,
    host_failed: bool,
    controls: Controls,
    startup_images: Vec<(StyleTarget, PathBuf)>,
    title: String,
}

impl DeskApp {
    pub fn new(
        config: ClockConfig,
        loader: ThreadedLoader,
        startup_images: Vec<(StyleTarget, PathBuf)>,
    ) -> Self {
        Self {
            controls: Controls::new(&config),
            scene: ClockScene::new(config, loader),
            host: None,
            host_failed: false,
            startup_images,
            title: String::new(),
        }
    }

    fn ensure_host(&mut self, ctx: &FrameCtx<'_, '_>) {
        if self.host.is_some() || self.host_failed {
            return;
        }
        let gpu = &*ctx.gpu;
        match WgpuHost::new(gpu.device(), gpu.queue(), gpu.surface_format()) {
            Ok(mut host) => {
                let size = gpu.size();
                self.scene.resize(size.width, size.height);
                for (target, path) in std::mem::take(&mut self.startup_images) {
                    self.scene.request_texture(target, ImageSource::Path(path));
                    self.scene.set_use_texture(&mut host, target, true);
                }
                self.host = Some(host);
            }
            Err(err) => {
                log::error!("failed to create scene renderer: {err}");
                self.host_failed = true;
            }
        }
    }
}

fn status_title(scene: &ClockScene<WgpuHost, ThreadedLoader>, controls: &Controls) -> String {
    if !scene.ui_visible() {
        return "Horae".to_string();
    }
    format!(
        "Horae | {} | editing {}",
        scene.status_summary(),
        controls.selected()
    )
}

impl App for DeskApp {
    fn on_resize(&mut self, _window_id: WindowId, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.ensure_host(ctx);
        let Some(host) = self.host.as_mut() else {
            return AppControl::Exit;
        };

        let mut exit = false;
        let keys: Vec<Key> = ctx.input_frame.keys_pressed.iter().copied().collect();
        for key in keys {
            match self.controls.on_key(key, self.scene.style()) {
                Some(ControlAction::Command(command)) => self.scene.dispatch(host, command),
                Some(ControlAction::Selected(target)) => log::info!("editing {target}"),
                Some(ControlAction::Exit) => exit = true,
                None => {}
            }
        }
        if exit {
            return AppControl::Exit;
        }

        let (dx, dy) = ctx.input_frame.pointer_delta;
        if dx != 0.0 || dy != 0.0 {
            let input = if ctx.input.button_down(MouseButton::Left) {
                Some(CameraInput::Orbit {
                    dx: dx * ORBIT_SPEED,
                    dy: dy * ORBIT_SPEED,
                })
            } else if ctx.input.button_down(MouseButton::Right) {
                Some(CameraInput::Pan { dx, dy })
            } else {
                None
            };
            if let Some(input) = input {
                self.scene.dispatch(host, Command::Camera(input));
            }
        }
        if ctx.input_frame.wheel_lines != 0.0 {
            let factor = ZOOM_BASE.powf(ctx.input_frame.wheel_lines);
            self.scene
                .dispatch(host, Command::Camera(CameraInput::Zoom(factor)));
        }
        for path in &ctx.input_frame.dropped_files {
            self.scene.dispatch(
                host,
                Command::FileSelected {
                    target: self.controls.selected(),
                    source: ImageSource::Path(path.clone()),
                },
            );
        }

        let frame = self.scene.frame(host, &TimeSample::now(), ctx.time.elapsed);

        let title = status_title(&self.scene, &self.controls);
        if title != self.title {
            ctx.window.set_title(&title);
            self.title = title;
        }

        let scene = &self.scene;
        ctx.render(frame.clear, |rctx, target| {
            host.draw(rctx, target, scene.resources(), &frame);
        })
    }

    fn on_exit(&mut self, _window_id: WindowId) {
        if let Some(mut host) = self.host.take() {
            self.scene.teardown(&mut host);
            host.destroy();
        }
    }
}
