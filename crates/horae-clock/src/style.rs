//! Customization state for the two labels and the background.

use std::fmt;

use horae_engine::paint::Color;
use horae_engine::render::MaterialParams;

use crate::config::{ClockConfig, LabelLook};
use crate::resources::ResourceId;
use crate::text::FontKey;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LabelKind {
    Time,
    Date,
}

impl LabelKind {
    pub const ALL: [LabelKind; 2] = [LabelKind::Time, LabelKind::Date];

    #[inline]
    pub fn target(self) -> StyleTarget {
        match self {
            LabelKind::Time => StyleTarget::Time,
            LabelKind::Date => StyleTarget::Date,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A customizable slot: one per label plus the background.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StyleTarget {
    Time,
    Date,
    Background,
}

impl StyleTarget {
    pub const ALL: [StyleTarget; 3] = [StyleTarget::Time, StyleTarget::Date, StyleTarget::Background];

    #[inline]
    pub fn label(self) -> Option<LabelKind> {
        match self {
            StyleTarget::Time => Some(LabelKind::Time),
            StyleTarget::Date => Some(LabelKind::Date),
            StyleTarget::Background => None,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            StyleTarget::Time => "time",
            StyleTarget::Date => "date",
            StyleTarget::Background => "background",
        }
    }
}

impl fmt::Display for StyleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BackgroundMode {
    #[default]
    Color,
    Image,
}

/// Color + optional texture for one target.
///
/// `texture` is a non-owning id; the object itself lives in `SceneResources`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StyleSlot {
    pub color: Color,
    pub texture: Option<ResourceId>,
    pub use_texture: bool,
}

impl StyleSlot {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            texture: None,
            use_texture: false,
        }
    }

    /// The texture is shown only when it exists and is selected.
    #[inline]
    pub fn shows_texture(&self) -> bool {
        self.use_texture && self.texture.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    slots: [StyleSlot; 3],
    pub background_opacity: f32,
    pub shadows: bool,
    pub font: FontKey,
    look: LabelLook,
}

impl StyleState {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            slots: [
                StyleSlot::new(config.look.time_color),
                StyleSlot::new(config.look.date_color),
                StyleSlot::new(config.background_color),
            ],
            background_opacity: config.background_opacity.clamp(0.0, 1.0),
            shadows: config.shadows,
            font: FontKey::Default,
            look: config.look,
        }
    }

    #[inline]
    pub fn slot(&self, target: StyleTarget) -> &StyleSlot {
        &self.slots[target.index()]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, target: StyleTarget) -> &mut StyleSlot {
        &mut self.slots[target.index()]
    }

    /// Image mode is the background slot's `use_texture` flag.
    pub fn background_mode(&self) -> BackgroundMode {
        if self.slot(StyleTarget::Background).use_texture {
            BackgroundMode::Image
        } else {
            BackgroundMode::Color
        }
    }

    /// Whether the image backdrop is drawn this frame.
    pub fn shows_backdrop(&self) -> bool {
        self.slot(StyleTarget::Background).shows_texture()
    }

    /// Flat clear color; the backdrop image, when shown, is drawn over it.
    pub fn clear_color(&self) -> Color {
        self.slot(StyleTarget::Background).color
    }

    /// Material parameters implied by the current state of `target`.
    pub fn material_params(&self, target: StyleTarget) -> MaterialParams {
        let slot = self.slot(target);
        match target {
            StyleTarget::Time | StyleTarget::Date => MaterialParams {
                color: slot.color,
                use_texture: slot.shows_texture(),
                metalness: self.look.metalness,
                roughness: self.look.roughness,
                opacity: 1.0,
                uv_scale: self.look.texture_scale,
            },
            StyleTarget::Background => MaterialParams {
                color: slot.color,
                use_texture: self.shows_backdrop(),
                metalness: 0.0,
                roughness: 1.0,
                opacity: self.background_opacity,
                uv_scale: [1.0, 1.0],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_shows_only_when_present_and_selected() {
        let mut slot = StyleSlot::new(Color::WHITE);
        slot.use_texture = true;
        assert!(!slot.shows_texture());
        slot.texture = Some(ResourceId::from_raw(3));
        assert!(slot.shows_texture());
        slot.use_texture = false;
        assert!(!slot.shows_texture());
    }

    #[test]
    fn backdrop_needs_image_mode_and_texture() {
        let mut style = StyleState::new(&ClockConfig::default());
        assert!(!style.shows_backdrop());
        style.slot_mut(StyleTarget::Background).use_texture = true;
        assert_eq!(style.background_mode(), BackgroundMode::Image);
        assert!(!style.shows_backdrop());
        style.slot_mut(StyleTarget::Background).texture = Some(ResourceId::from_raw(1));
        assert!(style.shows_backdrop());
        assert!(style.material_params(StyleTarget::Background).use_texture);
    }

    #[test]
    fn background_opacity_flows_into_params() {
        let mut style = StyleState::new(&ClockConfig::default());
        style.background_opacity = 0.4;
        assert_eq!(style.material_params(StyleTarget::Background).opacity, 0.4);
        assert_eq!(style.material_params(StyleTarget::Time).opacity, 1.0);
    }

    #[test]
    fn label_targets_map_back_to_kinds() {
        for kind in LabelKind::ALL {
            assert_eq!(kind.target().label(), Some(kind));
        }
        assert_eq!(StyleTarget::Background.label(), None);
    }
}
