//! The closed set of customization and camera commands.

use horae_engine::paint::Color;

use crate::assets::ImageSource;
use crate::camera::CameraInput;
use crate::style::{LabelKind, StyleTarget};
use crate::text::FontKey;

/// Named boolean controls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Toggle {
    TimeTexture,
    DateTexture,
    BackgroundImage,
    Shadows,
}

impl Toggle {
    pub fn name(self) -> &'static str {
        match self {
            Toggle::TimeTexture => "time-texture",
            Toggle::DateTexture => "date-texture",
            Toggle::BackgroundImage => "background-image",
            Toggle::Shadows => "shadows",
        }
    }

    /// The texture toggle for a style slot.
    pub fn use_texture(target: StyleTarget) -> Self {
        match target {
            StyleTarget::Time => Toggle::TimeTexture,
            StyleTarget::Date => Toggle::DateTexture,
            StyleTarget::Background => Toggle::BackgroundImage,
        }
    }
}

/// Everything a control surface can ask of the scene.
///
/// Values are assumed valid; malformed input is rejected by whoever builds
/// the command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ColorChanged { target: StyleTarget, color: Color },
    FileSelected { target: StyleTarget, source: ImageSource },
    ToggleChanged { toggle: Toggle, value: bool },
    FontSelected(FontKey),
    BackgroundOpacityChanged(f32),
    LabelSizeChanged { kind: LabelKind, size: f32 },
    RotateToggled,
    UiVisibilityToggled,
    Camera(CameraInput),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_target_has_a_texture_toggle() {
        let toggles: Vec<_> = StyleTarget::ALL.iter().map(|t| Toggle::use_texture(*t)).collect();
        assert_eq!(
            toggles,
            [Toggle::TimeTexture, Toggle::DateTexture, Toggle::BackgroundImage]
        );
        assert_eq!(Toggle::Shadows.name(), "shadows");
    }
}
