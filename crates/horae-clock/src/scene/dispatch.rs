use super::ClockScene;
use crate::assets::AssetProvider;
use crate::command::{Command, Toggle};
use crate::resources::ResourceHost;
use crate::style::{BackgroundMode, StyleTarget};

impl<H: ResourceHost, A: AssetProvider> ClockScene<H, A> {
    /// Applies one command from a control surface.
    pub fn dispatch(&mut self, host: &mut H, command: Command) {
        log::trace!("command {command:?}");
        match command {
            Command::ColorChanged { target, color } => self.set_color(host, target, color),
            Command::FileSelected { target, source } => self.request_texture(target, source),
            Command::ToggleChanged { toggle, value } => match toggle {
                Toggle::TimeTexture => self.set_use_texture(host, StyleTarget::Time, value),
                Toggle::DateTexture => self.set_use_texture(host, StyleTarget::Date, value),
                Toggle::BackgroundImage => {
                    let mode = if value {
                        BackgroundMode::Image
                    } else {
                        BackgroundMode::Color
                    };
                    self.set_background_mode(host, mode);
                }
                Toggle::Shadows => self.set_shadows(value),
            },
            Command::FontSelected(key) => self.select_font(key),
            Command::BackgroundOpacityChanged(opacity) => {
                self.set_background_opacity(host, opacity)
            }
            Command::LabelSizeChanged { kind, size } => self.set_label_size(kind, size),
            Command::RotateToggled => {
                let on = self.idle.toggle();
                log::info!("idle rotation {}", if on { "on" } else { "off" });
            }
            Command::UiVisibilityToggled => self.ui_visible = !self.ui_visible,
            Command::Camera(input) => self.camera.apply(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use horae_engine::paint::Color;

    use super::super::tests::{at, ready_scene};
    use crate::assets::ImageSource;
    use crate::camera::CameraInput;
    use crate::command::{Command, Toggle};
    use crate::config::ClockConfig;
    use crate::style::{BackgroundMode, StyleTarget};
    use crate::text::FontKey;

    #[test]
    fn toggles_reach_style_state() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.dispatch(
            &mut host,
            Command::ToggleChanged {
                toggle: Toggle::DateTexture,
                value: true,
            },
        );
        assert!(scene.style().slot(StyleTarget::Date).use_texture);

        scene.dispatch(
            &mut host,
            Command::ToggleChanged {
                toggle: Toggle::BackgroundImage,
                value: true,
            },
        );
        assert_eq!(scene.style().background_mode(), BackgroundMode::Image);

        scene.dispatch(
            &mut host,
            Command::ToggleChanged {
                toggle: Toggle::Shadows,
                value: false,
            },
        );
        assert!(!scene.style().shadows);
    }

    #[test]
    fn file_and_font_commands_go_to_the_loader() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.dispatch(
            &mut host,
            Command::FileSelected {
                target: StyleTarget::Background,
                source: ImageSource::Bytes(vec![0xff]),
            },
        );
        scene.dispatch(&mut host, Command::FontSelected(FontKey::Alt1));

        let loader = scene.assets_mut();
        assert_eq!(loader.images.len(), 1);
        assert_eq!(loader.images[0].0, StyleTarget::Background);
        assert_eq!(loader.fonts.last().map(|f| f.0), Some(FontKey::Alt1));
    }

    #[test]
    fn color_command_sets_slot_color() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        let color = Color::from_rgb_hex(0x00ff88);
        scene.dispatch(
            &mut host,
            Command::ColorChanged {
                target: StyleTarget::Time,
                color,
            },
        );
        assert_eq!(scene.style().slot(StyleTarget::Time).color, color);
    }

    #[test]
    fn rotate_and_ui_visibility_flip() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        assert!(scene.rotating());
        assert!(scene.ui_visible());
        scene.dispatch(&mut host, Command::RotateToggled);
        scene.dispatch(&mut host, Command::UiVisibilityToggled);
        assert!(!scene.rotating());
        assert!(!scene.ui_visible());
    }

    #[test]
    fn rotate_off_freezes_the_overlay() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.dispatch(&mut host, Command::RotateToggled);
        let a = scene.frame(&mut host, &at(1, 0, 0), 2.0);
        let b = scene.frame(&mut host, &at(1, 0, 0), 9.0);
        assert_eq!(a.group, b.group);
        assert_eq!(a.eye, b.eye);
    }

    #[test]
    fn camera_commands_move_the_eye() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.dispatch(&mut host, Command::RotateToggled);
        let before = scene.frame(&mut host, &at(1, 0, 0), 0.0).eye;
        scene.dispatch(&mut host, Command::Camera(CameraInput::Orbit { dx: 0.5, dy: 0.0 }));
        let after = scene.frame(&mut host, &at(1, 0, 0), 0.0).eye;
        assert!((after - before).length() > 0.0);
        assert!((after.length() - Vec3::new(0.0, 0.0, 8.0).length()).abs() < 1e-3);
    }
}
