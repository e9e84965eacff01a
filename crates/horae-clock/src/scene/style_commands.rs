//! Customization commands. Each one touches resources only through
//! `SceneResources`, so a slot never holds more than one live texture.

use horae_engine::paint::Color;

use super::ClockScene;
use crate::assets::{AssetProvider, DecodedImage, ImageSource, RequestSlot};
use crate::error::ResourceError;
use crate::resources::{ResourceHost, ResourceId};
use crate::style::{BackgroundMode, LabelKind, StyleTarget};
use crate::text::FontKey;

impl<H: ResourceHost, A: AssetProvider> ClockScene<H, A> {
    fn refresh_material(&mut self, host: &mut H, target: StyleTarget) {
        let params = self.style.material_params(target);
        self.resources.write_material(host, target, &params);
    }

    /// Switches `target` to a flat color, dropping its texture.
    ///
    /// Also discards any image load still in flight for `target`.
    pub fn set_color(&mut self, host: &mut H, target: StyleTarget, color: Color) {
        self.tokens.invalidate(RequestSlot::Texture(target));
        self.resources.dispose_texture(host, target);

        let slot = self.style.slot_mut(target);
        slot.texture = None;
        slot.use_texture = false;
        slot.color = color;
        self.refresh_material(host, target);
    }

    /// Installs `image` as the texture of `target`, disposing the previous one.
    ///
    /// The material shows it right away only if the slot already uses its
    /// texture. On error the slot is left as it was.
    pub fn set_texture(
        &mut self,
        host: &mut H,
        target: StyleTarget,
        image: &DecodedImage,
    ) -> Result<ResourceId, ResourceError> {
        let id = self.resources.replace_texture(host, target, image)?;
        // A direct assignment beats any older load still running.
        self.tokens.invalidate(RequestSlot::Texture(target));

        log::debug!("{target} texture {id}: {}x{}", image.width, image.height);
        self.style.slot_mut(target).texture = Some(id);
        self.refresh_material(host, target);
        Ok(id)
    }

    /// Chooses between the stored texture and the stored color. Never
    /// allocates or disposes.
    pub fn set_use_texture(&mut self, host: &mut H, target: StyleTarget, use_texture: bool) {
        self.style.slot_mut(target).use_texture = use_texture;
        self.refresh_material(host, target);
    }

    /// Image mode is `use_texture` on the background slot.
    pub fn set_background_mode(&mut self, host: &mut H, mode: BackgroundMode) {
        self.set_use_texture(host, StyleTarget::Background, mode == BackgroundMode::Image);
    }

    /// Clamped to `[0, 1]`. Only visible in image mode.
    pub fn set_background_opacity(&mut self, host: &mut H, opacity: f32) {
        if !opacity.is_finite() {
            return;
        }
        self.style.background_opacity = opacity.clamp(0.0, 1.0);
        self.refresh_material(host, StyleTarget::Background);
    }

    pub fn set_shadows(&mut self, enabled: bool) {
        self.style.shadows = enabled;
    }

    /// Changes the em size of one label; it is rebuilt on the next frame.
    pub fn set_label_size(&mut self, kind: LabelKind, size: f32) {
        if !(size.is_finite() && size > 0.0) {
            log::warn!("ignoring label size {size}");
            return;
        }
        let config = match kind {
            LabelKind::Time => &mut self.config.time_label,
            LabelKind::Date => &mut self.config.date_label,
        };
        if config.extrude.size == size {
            return;
        }
        config.extrude.size = size;
        self.labels[kind.index()].dirty = true;
    }

    /// Starts loading an image for `target`. Supersedes earlier requests.
    pub fn request_texture(&mut self, target: StyleTarget, source: ImageSource) {
        let token = self.tokens.issue(RequestSlot::Texture(target));
        log::debug!("requesting {target} image {source:?}");
        self.assets.request_image(target, source, token);
    }

    /// Starts loading `key`. The current font stays until it arrives.
    pub fn select_font(&mut self, key: FontKey) {
        let token = self.tokens.issue(RequestSlot::Font);
        log::debug!("requesting font {key}");
        self.assets.request_font(key, token);
    }
}

#[cfg(test)]
mod tests {
    use horae_engine::paint::Color;

    use super::super::tests::{at, ready_scene, TestScene};
    use crate::assets::DecodedImage;
    use crate::config::ClockConfig;
    use crate::resources::testing::{HostEvent, RecordingHost};
    use crate::style::{BackgroundMode, StyleTarget};

    fn image(tag: u8) -> DecodedImage {
        DecodedImage::solid(2, 2, [tag, tag, tag, 255])
    }

    fn started() -> (TestScene, RecordingHost) {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(12, 0, 0), 0.0);
        (scene, host)
    }

    fn texture_handle(scene: &TestScene, target: StyleTarget) -> Option<u32> {
        scene.resources().texture(target).map(|(_, t)| t.handle)
    }

    #[test]
    fn at_most_one_texture_per_slot() {
        let (mut scene, mut host) = started();
        let target = StyleTarget::Time;
        for i in 0..12u8 {
            if i % 3 == 2 {
                scene.set_color(&mut host, target, Color::from_rgb_hex(0x102030 * i as u32));
            } else {
                scene.set_texture(&mut host, target, &image(i)).unwrap();
            }
            assert!(scene.resources().live().textures <= 1);
            let created = host.created_textures();
            let disposed = host.disposed_textures().len();
            assert!(created - disposed <= 1);
        }
    }

    #[test]
    fn set_color_drops_texture_and_selects_color() {
        let (mut scene, mut host) = started();
        scene.set_texture(&mut host, StyleTarget::Date, &image(1)).unwrap();
        scene.set_use_texture(&mut host, StyleTarget::Date, true);

        let red = Color::from_rgb_hex(0xff0000);
        scene.set_color(&mut host, StyleTarget::Date, red);

        let slot = scene.style().slot(StyleTarget::Date);
        assert_eq!(slot.texture, None);
        assert!(!slot.use_texture);
        assert_eq!(slot.color, red);
        assert_eq!(host.disposed_textures().len(), 1);

        let (_, material) = scene.resources().material(StyleTarget::Date).unwrap();
        assert_eq!(material.params.color, red);
        assert!(!material.params.use_texture);
        assert_eq!(material.texture, None);
    }

    #[test]
    fn texture_is_stored_but_hidden_until_selected() {
        let (mut scene, mut host) = started();
        scene.set_texture(&mut host, StyleTarget::Time, &image(5)).unwrap();
        let (_, material) = scene.resources().material(StyleTarget::Time).unwrap();
        assert!(!material.params.use_texture);
        assert!(material.texture.is_some());

        scene.set_use_texture(&mut host, StyleTarget::Time, true);
        let (_, material) = scene.resources().material(StyleTarget::Time).unwrap();
        assert!(material.params.use_texture);
    }

    #[test]
    fn use_texture_round_trip_allocates_nothing() {
        let (mut scene, mut host) = started();
        scene.set_texture(&mut host, StyleTarget::Time, &image(7)).unwrap();
        scene.set_use_texture(&mut host, StyleTarget::Time, true);
        let allocations = host.allocations();
        let live = scene.resources().live();
        let bound = texture_handle(&scene, StyleTarget::Time);

        scene.set_use_texture(&mut host, StyleTarget::Time, false);
        scene.set_use_texture(&mut host, StyleTarget::Time, true);

        assert_eq!(host.allocations(), allocations);
        assert_eq!(scene.resources().live(), live);
        assert!(host.disposed_textures().is_empty());
        let (_, material) = scene.resources().material(StyleTarget::Time).unwrap();
        assert!(material.params.use_texture);
        assert_eq!(material.texture, bound);
    }

    #[test]
    fn background_image_swap_disposes_the_first_once() {
        let (mut scene, mut host) = started();
        scene.set_texture(&mut host, StyleTarget::Background, &image(1)).unwrap();
        let a = texture_handle(&scene, StyleTarget::Background).unwrap();
        scene.set_background_mode(&mut host, BackgroundMode::Image);
        scene.set_texture(&mut host, StyleTarget::Background, &image(2)).unwrap();
        let b = texture_handle(&scene, StyleTarget::Background).unwrap();

        assert_eq!(host.disposed_textures(), vec![a]);
        let created_b = host
            .events
            .iter()
            .position(|e| *e == HostEvent::CreateTexture(b))
            .unwrap();
        let disposed_a = host
            .events
            .iter()
            .position(|e| *e == HostEvent::DisposeTexture(a))
            .unwrap();
        assert!(created_b < disposed_a);

        let frame = scene.frame(&mut host, &at(12, 0, 0), 0.1);
        assert!(frame.backdrop.is_some());
        let (_, material) = scene.resources().material(StyleTarget::Background).unwrap();
        assert_eq!(material.texture, Some(b));
    }

    #[test]
    fn background_image_after_set_color_waits_for_use_texture() {
        let (mut scene, mut host) = started();
        scene.set_background_mode(&mut host, BackgroundMode::Image);
        scene.set_color(&mut host, StyleTarget::Background, Color::from_rgb_hex(0x112233));
        assert_eq!(scene.style().background_mode(), BackgroundMode::Color);

        scene.set_texture(&mut host, StyleTarget::Background, &image(4)).unwrap();
        let frame = scene.frame(&mut host, &at(12, 0, 0), 0.1);
        assert!(!scene.style().slot(StyleTarget::Background).use_texture);
        assert!(frame.backdrop.is_none());
        let (_, material) = scene.resources().material(StyleTarget::Background).unwrap();
        assert!(!material.params.use_texture);

        scene.set_use_texture(&mut host, StyleTarget::Background, true);
        let frame = scene.frame(&mut host, &at(12, 0, 0), 0.2);
        assert!(frame.backdrop.is_some());
        assert_eq!(scene.style().background_mode(), BackgroundMode::Image);
    }

    #[test]
    fn background_mode_needs_an_image() {
        let (mut scene, mut host) = started();
        scene.set_background_mode(&mut host, BackgroundMode::Image);
        assert!(scene.frame(&mut host, &at(12, 0, 0), 0.0).backdrop.is_none());
    }

    #[test]
    fn opacity_is_clamped_and_written() {
        let (mut scene, mut host) = started();
        scene.set_background_opacity(&mut host, 1.7);
        assert_eq!(scene.style().background_opacity, 1.0);
        scene.set_background_opacity(&mut host, -0.2);
        assert_eq!(scene.style().background_opacity, 0.0);
        scene.set_background_opacity(&mut host, f32::NAN);
        assert_eq!(scene.style().background_opacity, 0.0);
        let (_, material) = scene.resources().material(StyleTarget::Background).unwrap();
        assert_eq!(material.params.opacity, 0.0);
    }

    #[test]
    fn rejected_texture_leaves_slot_unchanged() {
        let (mut scene, mut host) = started();
        scene.set_texture(&mut host, StyleTarget::Time, &image(1)).unwrap();
        let before = *scene.style().slot(StyleTarget::Time);
        host.reject_textures = true;
        assert!(scene.set_texture(&mut host, StyleTarget::Time, &image(2)).is_err());
        assert_eq!(*scene.style().slot(StyleTarget::Time), before);
        assert!(host.disposed_textures().is_empty());
    }

    #[test]
    fn texture_set_before_first_frame_is_bound_on_creation() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.set_texture(&mut host, StyleTarget::Time, &image(3)).unwrap();
        scene.set_use_texture(&mut host, StyleTarget::Time, true);
        scene.frame(&mut host, &at(12, 0, 0), 0.0);
        let (_, material) = scene.resources().material(StyleTarget::Time).unwrap();
        assert!(material.params.use_texture);
        assert_eq!(material.texture, texture_handle(&scene, StyleTarget::Time));
    }
}
