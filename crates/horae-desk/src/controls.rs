//! Keyboard bindings: the desk's stand-in for a control panel.

use horae_clock::style::{BackgroundMode, LabelKind, StyleState, StyleTarget};
use horae_clock::{ClockConfig, Command, FontKey, Toggle};
use horae_engine::input::Key;
use horae_engine::paint::Color;

const PALETTE: [u32; 8] = [
    0xe5f6ff, 0xcfeeff, 0xffb347, 0xff6b6b, 0x7cf29a, 0xc58cff, 0x0f1724, 0x080808,
];

const OPACITY_STEP: f32 = 0.1;
const SIZE_STEP: f32 = 0.1;
const SIZE_RANGE: (f32, f32) = (0.2, 3.0);

#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    Command(Command),
    /// The slot that colors, textures and dropped files apply to.
    Selected(StyleTarget),
    Exit,
}

#[derive(Debug)]
pub struct Controls {
    selected: StyleTarget,
    palette_pos: [usize; 3],
    time_size: f32,
}

impl Controls {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            selected: StyleTarget::Time,
            palette_pos: [0; 3],
            time_size: config.time_label.extrude.size,
        }
    }

    pub fn selected(&self) -> StyleTarget {
        self.selected
    }

    /// Maps one key press to an action. `style` supplies current toggle values.
    pub fn on_key(&mut self, key: Key, style: &StyleState) -> Option<ControlAction> {
        let command = match key {
            Key::Escape => return Some(ControlAction::Exit),
            Key::Tab => {
                let all = StyleTarget::ALL;
                let next = all
                    .iter()
                    .position(|t| *t == self.selected)
                    .map_or(0, |i| (i + 1) % all.len());
                self.selected = all[next];
                return Some(ControlAction::Selected(self.selected));
            }
            Key::R => Command::RotateToggled,
            Key::H => Command::UiVisibilityToggled,
            Key::S => Command::ToggleChanged {
                toggle: Toggle::Shadows,
                value: !style.shadows,
            },
            Key::Digit1 => Command::FontSelected(FontKey::Default),
            Key::Digit2 => Command::FontSelected(FontKey::Alt1),
            Key::Digit3 => Command::FontSelected(FontKey::Alt2),
            Key::Digit4 => Command::FontSelected(FontKey::Alt3),
            Key::C => {
                let pos = &mut self.palette_pos[self.selected as usize];
                *pos = (*pos + 1) % PALETTE.len();
                Command::ColorChanged {
                    target: self.selected,
                    color: Color::from_rgb_hex(PALETTE[*pos]),
                }
            }
            Key::T => {
                let current = style.slot(self.selected).use_texture;
                Command::ToggleChanged {
                    toggle: Toggle::use_texture(self.selected),
                    value: !current,
                }
            }
            Key::B => Command::ToggleChanged {
                toggle: Toggle::BackgroundImage,
                value: style.background_mode() != BackgroundMode::Image,
            },
            Key::BracketLeft => {
                Command::BackgroundOpacityChanged(style.background_opacity - OPACITY_STEP)
            }
            Key::BracketRight => {
                Command::BackgroundOpacityChanged(style.background_opacity + OPACITY_STEP)
            }
            Key::Equal | Key::Minus => {
                let step = if key == Key::Equal { SIZE_STEP } else { -SIZE_STEP };
                self.time_size = (self.time_size + step).clamp(SIZE_RANGE.0, SIZE_RANGE.1);
                Command::LabelSizeChanged {
                    kind: LabelKind::Time,
                    size: self.time_size,
                }
            }
            _ => return None,
        };
        Some(ControlAction::Command(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Controls, StyleState) {
        let config = ClockConfig::default();
        (Controls::new(&config), StyleState::new(&config))
    }

    #[test]
    fn tab_cycles_through_all_slots() {
        let (mut controls, style) = setup();
        let mut seen = Vec::new();
        for _ in 0..3 {
            match controls.on_key(Key::Tab, &style) {
                Some(ControlAction::Selected(t)) => seen.push(t),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(seen, [StyleTarget::Date, StyleTarget::Background, StyleTarget::Time]);
    }

    #[test]
    fn color_key_targets_the_selected_slot() {
        let (mut controls, style) = setup();
        controls.on_key(Key::Tab, &style);
        match controls.on_key(Key::C, &style) {
            Some(ControlAction::Command(Command::ColorChanged { target, color })) => {
                assert_eq!(target, StyleTarget::Date);
                assert_eq!(color, Color::from_rgb_hex(PALETTE[1]));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn toggles_invert_current_state() {
        let (mut controls, style) = setup();
        assert_eq!(
            controls.on_key(Key::S, &style),
            Some(ControlAction::Command(Command::ToggleChanged {
                toggle: Toggle::Shadows,
                value: false,
            }))
        );
        assert_eq!(
            controls.on_key(Key::T, &style),
            Some(ControlAction::Command(Command::ToggleChanged {
                toggle: Toggle::TimeTexture,
                value: true,
            }))
        );
        assert_eq!(
            controls.on_key(Key::B, &style),
            Some(ControlAction::Command(Command::ToggleChanged {
                toggle: Toggle::BackgroundImage,
                value: true,
            }))
        );
    }

    #[test]
    fn label_size_stays_in_range() {
        let (mut controls, style) = setup();
        let mut last = 0.0;
        for _ in 0..50 {
            if let Some(ControlAction::Command(Command::LabelSizeChanged { size, .. })) =
                controls.on_key(Key::Equal, &style)
            {
                last = size;
            }
        }
        assert_eq!(last, SIZE_RANGE.1);
    }

    #[test]
    fn digits_select_fonts_and_escape_exits() {
        let (mut controls, style) = setup();
        assert_eq!(
            controls.on_key(Key::Digit3, &style),
            Some(ControlAction::Command(Command::FontSelected(FontKey::Alt2)))
        );
        assert_eq!(controls.on_key(Key::Escape, &style), Some(ControlAction::Exit));
        assert_eq!(controls.on_key(Key::Q, &style), None);
    }
}
