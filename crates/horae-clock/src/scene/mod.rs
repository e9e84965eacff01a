//! The owning scene context and its per-frame loop.
//!
//! `ClockScene` holds every piece of mutable state: tick driver, style,
//! resource registry, asset tokens, current font, camera and idle motion.
//! The host application calls `frame` once per display refresh and draws the
//! returned `SceneFrame` against `resources()`.

mod dispatch;
mod style_commands;

use std::sync::Arc;

use glam::{Mat4, Vec3};
use horae_engine::paint::Color;
use horae_engine::render::{Lights, ShadowPass};

use crate::assets::{AssetCompletion, AssetPayload, AssetProvider, RequestSlot, RequestTokens};
use crate::camera::{CameraController, IdleMotion};
use crate::config::{ClockConfig, LabelConfig, MaterialPolicy};
use crate::resources::{ResourceHost, ResourceId, SceneResources};
use crate::style::{LabelKind, StyleState, StyleTarget};
use crate::text::{FontKey, LabelFont};
use crate::time::{ClockTickDriver, LocaleFormatter, TimeFormatter, TimeSample};

#[derive(Debug, Default)]
struct LabelState {
    /// Text the label should show, from the last tick.
    desired: Option<String>,
    /// Text of the live geometry.
    built: Option<String>,
    /// Text whose build failed; retried only once the label changes again.
    failed: Option<String>,
    /// Font or size changed since the last build.
    dirty: bool,
    builds: u64,
}

impl LabelState {
    fn needs_build(&self) -> bool {
        match &self.desired {
            Some(desired) => {
                self.dirty
                    || (self.built.as_ref() != Some(desired)
                        && self.failed.as_ref() != Some(desired))
            }
            None => false,
        }
    }
}

/// A label ready to draw: both its geometry and material are live.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LabelDraw {
    pub kind: LabelKind,
    pub geometry: ResourceId,
    pub material: ResourceId,
}

/// Everything needed to draw one frame. Objects are referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    pub clear: Color,
    pub view_proj: Mat4,
    pub eye: Vec3,
    /// Model transform shared by both labels.
    pub group: Mat4,
    pub labels: [Option<LabelDraw>; 2],
    /// Background material to draw as a fullscreen image.
    pub backdrop: Option<ResourceId>,
    pub shadow: Option<ShadowPass>,
    pub lights: Lights,
}

pub struct ClockScene<H: ResourceHost, A: AssetProvider> {
    config: ClockConfig,
    formatter: Box<dyn TimeFormatter>,
    tick: ClockTickDriver,
    style: StyleState,
    resources: SceneResources<H>,
    assets: A,
    tokens: RequestTokens,
    font: Option<Arc<dyn LabelFont>>,
    labels: [LabelState; 2],
    camera: CameraController,
    idle: IdleMotion,
    ui_visible: bool,
    regenerations: u64,
}

impl<H: ResourceHost, A: AssetProvider> ClockScene<H, A> {
    /// Builds the scene and requests the default font.
    pub fn new(config: ClockConfig, mut assets: A) -> Self {
        let mut tokens = RequestTokens::default();
        assets.request_font(FontKey::Default, tokens.issue(RequestSlot::Font));

        Self {
            formatter: Box::new(LocaleFormatter::new(config.hour_cycle)),
            tick: ClockTickDriver::new(),
            style: StyleState::new(&config),
            resources: SceneResources::new(),
            assets,
            tokens,
            font: None,
            labels: Default::default(),
            camera: CameraController::new(config.camera),
            idle: IdleMotion::new(config.idle, config.rotate),
            ui_visible: true,
            regenerations: 0,
            config,
        }
    }

    pub fn with_formatter(mut self, formatter: impl TimeFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// One loop iteration.
    ///
    /// Order: apply finished loads, tick and rebuild labels, advance idle
    /// motion, step the camera, compose. `elapsed` is monotonic seconds since
    /// start.
    pub fn frame(&mut self, host: &mut H, now: &TimeSample, elapsed: f32) -> SceneFrame {
        for completion in self.assets.poll() {
            self.apply_completion(host, completion);
        }

        if self.tick.on_frame(now) {
            self.labels[LabelKind::Time.index()].desired = Some(self.formatter.time_string(now));
            self.labels[LabelKind::Date.index()].desired = Some(self.formatter.date_string(now));
        }
        self.regenerate(host);

        self.idle.advance(elapsed);
        self.camera.step();

        self.compose(host)
    }

    fn apply_completion(&mut self, host: &mut H, completion: AssetCompletion) {
        let AssetCompletion {
            slot,
            token,
            result,
        } = completion;

        if !self.tokens.is_current(slot, token) {
            log::debug!("discarding superseded {slot:?} load");
            return;
        }

        match (slot, result) {
            (_, Err(err)) => log::warn!("{slot:?} load failed, keeping current state: {err}"),
            (RequestSlot::Font, Ok(AssetPayload::Font(font))) => {
                log::info!("font {} ready", font.key());
                self.style.font = font.key();
                self.font = Some(font);
                for label in &mut self.labels {
                    label.dirty = true;
                }
            }
            (RequestSlot::Texture(target), Ok(AssetPayload::Image(image))) => {
                if let Err(err) = self.set_texture(host, target, &image) {
                    log::warn!("{target} texture rejected: {err}");
                }
            }
            (slot, Ok(_)) => log::warn!("{slot:?} load produced the wrong kind of asset"),
        }
    }

    fn label_config(&self, kind: LabelKind) -> LabelConfig {
        match kind {
            LabelKind::Time => self.config.time_label,
            LabelKind::Date => self.config.date_label,
        }
    }

    fn regenerate(&mut self, host: &mut H) {
        let Some(font) = self.font.clone() else {
            return;
        };

        let mut rebuilt = false;
        for kind in LabelKind::ALL {
            if !self.labels[kind.index()].needs_build() {
                continue;
            }
            let config = self.label_config(kind);
            let label = &mut self.labels[kind.index()];
            let text = label.desired.clone().unwrap_or_default();
            label.dirty = false;

            match font.build(&text, &config) {
                Ok(mesh) => {
                    self.resources.replace_geometry(host, kind, &mesh);
                    let params = self.style.material_params(kind.target());
                    match self.config.material_policy {
                        MaterialPolicy::Persistent => {
                            self.resources.ensure_material(host, kind.target(), &params);
                        }
                        MaterialPolicy::Ephemeral => {
                            self.resources.replace_material(host, kind.target(), &params);
                        }
                    }
                    label.builds += 1;
                    label.built = Some(text);
                    label.failed = None;
                    rebuilt = true;
                }
                Err(err) => {
                    log::warn!("{kind:?} label {text:?} not rebuilt: {err}");
                    label.failed = Some(text);
                }
            }
        }

        if rebuilt {
            self.regenerations += 1;
        }
    }

    fn compose(&mut self, host: &mut H) -> SceneFrame {
        let background = self.style.material_params(StyleTarget::Background);
        let background = self
            .resources
            .ensure_material(host, StyleTarget::Background, &background);

        let pose = self.idle.pose();
        let (view_proj, eye) = self.camera.view_proj(pose.camera_offset);
        let lights = self.config.lights.to_lights();
        let shadow = if self.style.shadows {
            ShadowPass::directional(
                self.config.shadow.plane_y,
                lights.sun_direction,
                self.config.shadow.opacity,
            )
        } else {
            None
        };

        let labels = LabelKind::ALL.map(|kind| {
            let (geometry, _) = self.resources.geometry(kind)?;
            let (material, _) = self.resources.material(kind.target())?;
            Some(LabelDraw {
                kind,
                geometry,
                material,
            })
        });

        SceneFrame {
            clear: self.style.clear_color(),
            view_proj,
            eye,
            group: pose.group,
            labels,
            backdrop: self.style.shows_backdrop().then_some(background),
            shadow,
            lights,
        }
    }

    /// Updates the projection for a new drawable size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Disposes every GPU object. A later `frame` rebuilds from scratch.
    pub fn teardown(&mut self, host: &mut H) {
        self.resources.teardown_all(host);
        for label in &mut self.labels {
            label.built = None;
            label.failed = None;
        }
    }

    pub fn resources(&self) -> &SceneResources<H> {
        &self.resources
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    /// `None` until the first font finishes loading.
    pub fn font_key(&self) -> Option<FontKey> {
        self.font.as_ref().map(|f| f.key())
    }

    pub fn rotating(&self) -> bool {
        self.idle.enabled()
    }

    pub fn ui_visible(&self) -> bool {
        self.ui_visible
    }

    /// Frames in which at least one label was rebuilt.
    pub fn regeneration_count(&self) -> u64 {
        self.regenerations
    }

    pub fn label_builds(&self, kind: LabelKind) -> u64 {
        self.labels[kind.index()].builds
    }

    /// Text of the live label geometry.
    pub fn label_text(&self, kind: LabelKind) -> Option<&str> {
        let label = &self.labels[kind.index()];
        self.resources.geometry(kind)?;
        label.built.as_deref()
    }

    /// One-line summary for a status bar.
    pub fn status_summary(&self) -> String {
        let font = match self.font_key() {
            Some(key) => key.name(),
            None => "loading",
        };
        let on_off = |b: bool| if b { "on" } else { "off" };
        let live = self.resources.live();
        format!(
            "font {font} | rotate {} | shadows {} | background {:?} {:.0}% | {} objects",
            on_off(self.idle.enabled()),
            on_off(self.style.shadows),
            self.style.background_mode(),
            self.style.background_opacity * 100.0,
            live.total(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use chrono::Weekday;

    use super::*;
    use crate::assets::testing::ManualLoader;
    use crate::assets::{AssetCompletion, AssetPayload, DecodedImage, ImageSource};
    use crate::camera::CameraInput;
    use crate::command::Command;
    use crate::config::LabelConfig;
    use crate::error::{AssetLoadError, TextMeshError};
    use crate::mesh::MeshData;
    use crate::resources::testing::{HostEvent, RecordingHost};
    use crate::text::testing::BoxFont;
    use crate::time::TimeFormatter;

    pub(crate) type TestScene = ClockScene<RecordingHost, ManualLoader>;

    pub(crate) fn at(hour: u32, minute: u32, second: u32) -> TimeSample {
        TimeSample {
            hour,
            minute,
            second,
            weekday: Weekday::Tue,
            year: 2025,
            month: 3,
            day: 4,
        }
    }

    pub(crate) fn deliver_font(scene: &mut TestScene, key: FontKey) {
        let token = scene.assets_mut().last_font_token().unwrap();
        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Font,
            token,
            result: Ok(AssetPayload::Font(Arc::new(BoxFont(key)))),
        });
    }

    /// A scene whose default font has already been delivered.
    pub(crate) fn ready_scene(config: ClockConfig) -> (TestScene, RecordingHost) {
        let mut scene = TestScene::new(config, ManualLoader::default());
        let host = RecordingHost::default();
        deliver_font(&mut scene, FontKey::Default);
        (scene, host)
    }

    #[test]
    fn requests_default_font_on_start() {
        let mut scene = TestScene::new(ClockConfig::default(), ManualLoader::default());
        assert_eq!(scene.assets_mut().fonts.len(), 1);
        assert_eq!(scene.assets_mut().fonts[0].0, FontKey::Default);
        assert_eq!(scene.font_key(), None);
    }

    #[test]
    fn regenerations_track_second_transitions() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        let seconds = [9, 9, 9, 10, 10, 10, 9, 9, 11, 12, 12];
        for (i, s) in seconds.iter().enumerate() {
            scene.frame(&mut host, &at(14, 5, *s), i as f32 / 60.0);
        }
        // 9, 10, back to 9, 11, 12.
        assert_eq!(scene.regeneration_count(), 5);
        assert_eq!(scene.label_builds(LabelKind::Time), 5);
        // The date string never changed.
        assert_eq!(scene.label_builds(LabelKind::Date), 1);
    }

    #[test]
    fn labels_wait_for_the_font() {
        let mut scene = TestScene::new(ClockConfig::default(), ManualLoader::default());
        let mut host = RecordingHost::default();

        let frame = scene.frame(&mut host, &at(14, 5, 8), 0.0);
        assert_eq!(frame.labels, [None, None]);
        assert_eq!(host.created_geometries(), 0);

        deliver_font(&mut scene, FontKey::Default);
        // Same second: the font alone triggers the build.
        let frame = scene.frame(&mut host, &at(14, 5, 8), 0.1);
        assert!(frame.labels.iter().all(Option::is_some));
        assert_eq!(host.created_geometries(), 2);
        assert_eq!(scene.regeneration_count(), 1);
    }

    #[test]
    fn second_boundary_swaps_the_time_geometry_in_one_frame() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(14, 5, 8), 0.0);
        let (old_id, old) = scene.resources().geometry(LabelKind::Time).unwrap();
        let old_handle = old.handle;
        let before = scene.regeneration_count();
        host.events.clear();

        let frame = scene.frame(&mut host, &at(14, 5, 9), 0.016);
        assert_eq!(scene.regeneration_count(), before + 1);
        assert_eq!(scene.label_text(LabelKind::Time), Some("02:05:09 PM"));

        let created = host
            .events
            .iter()
            .position(|e| matches!(e, HostEvent::CreateGeometry(_)))
            .unwrap();
        let disposed = host
            .events
            .iter()
            .position(|e| *e == HostEvent::DisposeGeometry(old_handle))
            .unwrap();
        assert!(created < disposed);

        let (new_id, geometry) = scene.resources().geometry(LabelKind::Time).unwrap();
        assert_ne!(new_id, old_id);
        assert_eq!(frame.labels[0].map(|l| l.geometry), Some(new_id));
        let center = geometry.mesh.aabb().unwrap().center().x;
        assert!(center.abs() < 1e-4);
    }

    #[test]
    fn persistent_materials_survive_regeneration() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        for s in 0..10 {
            scene.frame(&mut host, &at(9, 0, s), 0.0);
        }
        // Two labels + background, created once.
        assert_eq!(host.created_materials(), 3);
        assert_eq!(scene.resources().live().geometries, 2);
    }

    #[test]
    fn ephemeral_materials_are_replaced_with_geometry() {
        let config = ClockConfig {
            material_policy: MaterialPolicy::Ephemeral,
            ..ClockConfig::default()
        };
        let (mut scene, mut host) = ready_scene(config);
        for s in 0..5 {
            scene.frame(&mut host, &at(9, 0, s), 0.0);
        }
        // First frame: time + date + background; then one per time rebuild.
        assert_eq!(host.created_materials(), 3 + 4);
        assert_eq!(scene.resources().live().materials, 3);
    }

    #[test]
    fn label_size_change_rebuilds_without_a_tick() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);
        let width = |scene: &TestScene| {
            let (_, g) = scene.resources().geometry(LabelKind::Time).unwrap();
            g.mesh.aabb().unwrap().size().x
        };
        let before = width(&scene);

        scene.dispatch(
            &mut host,
            Command::LabelSizeChanged {
                kind: LabelKind::Time,
                size: 1.8,
            },
        );
        scene.frame(&mut host, &at(9, 0, 0), 0.1);
        assert_eq!(scene.label_builds(LabelKind::Time), 2);
        assert_eq!(scene.label_builds(LabelKind::Date), 1);
        assert!(width(&scene) > before * 1.5);
    }

    #[test]
    fn superseded_font_load_is_discarded() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);

        scene.select_font(FontKey::Alt1);
        let stale = scene.assets_mut().last_font_token().unwrap();
        scene.select_font(FontKey::Alt2);

        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Font,
            token: stale,
            result: Ok(AssetPayload::Font(Arc::new(BoxFont(FontKey::Alt1)))),
        });
        scene.frame(&mut host, &at(9, 0, 0), 0.1);
        assert_eq!(scene.font_key(), Some(FontKey::Default));
        assert_eq!(scene.label_builds(LabelKind::Time), 1);

        deliver_font(&mut scene, FontKey::Alt2);
        scene.frame(&mut host, &at(9, 0, 0), 0.2);
        assert_eq!(scene.font_key(), Some(FontKey::Alt2));
        assert_eq!(scene.label_builds(LabelKind::Time), 2);
        assert_eq!(scene.label_builds(LabelKind::Date), 2);
    }

    #[test]
    fn failed_font_load_keeps_the_current_font() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);
        scene.select_font(FontKey::Alt3);
        let token = scene.assets_mut().last_font_token().unwrap();
        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Font,
            token,
            result: Err(AssetLoadError::UnknownFont(FontKey::Alt3)),
        });
        scene.frame(&mut host, &at(9, 0, 0), 0.1);
        assert_eq!(scene.font_key(), Some(FontKey::Default));
        assert_eq!(scene.label_builds(LabelKind::Time), 1);
    }

    #[test]
    fn image_load_is_discarded_after_set_color() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);

        scene.request_texture(StyleTarget::Time, ImageSource::Bytes(vec![1, 2, 3]));
        let token = scene.assets_mut().last_image_token(StyleTarget::Time).unwrap();
        scene.set_color(&mut host, StyleTarget::Time, Color::from_rgb_hex(0xff0000));

        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Texture(StyleTarget::Time),
            token,
            result: Ok(AssetPayload::Image(DecodedImage::solid(2, 2, [0, 0, 255, 255]))),
        });
        scene.frame(&mut host, &at(9, 0, 0), 0.1);
        assert_eq!(host.created_textures(), 0);
        assert_eq!(scene.style().slot(StyleTarget::Time).texture, None);
    }

    #[test]
    fn completed_image_load_installs_the_texture() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);
        scene.request_texture(StyleTarget::Date, ImageSource::Bytes(vec![1]));
        let token = scene.assets_mut().last_image_token(StyleTarget::Date).unwrap();
        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Texture(StyleTarget::Date),
            token,
            result: Ok(AssetPayload::Image(DecodedImage::solid(4, 4, [9, 9, 9, 255]))),
        });
        scene.frame(&mut host, &at(9, 0, 0), 0.1);
        assert_eq!(host.created_textures(), 1);
        assert!(scene.style().slot(StyleTarget::Date).texture.is_some());
    }

    #[test]
    fn failed_image_load_changes_nothing() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);
        scene
            .set_texture(&mut host, StyleTarget::Time, &DecodedImage::solid(2, 2, [1, 1, 1, 255]))
            .unwrap();
        scene.set_use_texture(&mut host, StyleTarget::Time, true);
        let slot_before = *scene.style().slot(StyleTarget::Time);
        let (_, material) = scene.resources().material(StyleTarget::Time).unwrap();
        let material_before = (material.handle, material.params, material.texture);
        let events_before = host.events.len();

        scene.request_texture(StyleTarget::Time, ImageSource::Path("/missing.png".into()));
        let token = scene.assets_mut().last_image_token(StyleTarget::Time).unwrap();
        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Texture(StyleTarget::Time),
            token,
            result: Err(AssetLoadError::Io {
                path: "/missing.png".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        });
        scene.frame(&mut host, &at(9, 0, 0), 0.1);

        assert_eq!(*scene.style().slot(StyleTarget::Time), slot_before);
        let (_, material) = scene.resources().material(StyleTarget::Time).unwrap();
        assert_eq!((material.handle, material.params, material.texture), material_before);
        assert_eq!(host.events.len(), events_before);
    }

    #[test]
    fn teardown_releases_everything() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        scene.frame(&mut host, &at(9, 0, 0), 0.0);
        scene
            .set_texture(&mut host, StyleTarget::Background, &DecodedImage::solid(1, 1, [0; 4]))
            .unwrap();
        assert!(host.outstanding() > 0);

        scene.teardown(&mut host);
        assert_eq!(host.outstanding(), 0);
        assert_eq!(scene.resources().live().total(), 0);
    }

    #[test]
    fn zoom_stays_in_bounds_every_frame() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        let cfg = ClockConfig::default().camera;
        for (i, factor) in [0.2, 0.2, 0.2, 5.0, 5.0, 5.0, 5.0, 0.5].iter().cycle().take(60).enumerate() {
            scene.dispatch(&mut host, Command::Camera(CameraInput::Zoom(*factor)));
            scene.frame(&mut host, &at(9, 0, (i / 30) as u32), i as f32);
            let d = scene.camera().distance();
            assert!(d >= cfg.min_distance && d <= cfg.max_distance);
        }
    }

    #[test]
    fn shadows_follow_the_style_flag() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        assert!(scene.frame(&mut host, &at(9, 0, 0), 0.0).shadow.is_some());
        scene.set_shadows(false);
        assert!(scene.frame(&mut host, &at(9, 0, 0), 0.0).shadow.is_none());
    }

    #[test]
    fn status_mentions_font_and_toggles() {
        let (mut scene, mut host) = ready_scene(ClockConfig::default());
        assert!(scene.status_summary().contains("font loading"));
        scene.frame(&mut host, &at(9, 0, 0), 0.0);
        let status = scene.status_summary();
        assert!(status.contains("font default"));
        assert!(status.contains("rotate on"));
    }

    /// Box glyphs that refuse to build one particular string.
    #[derive(Debug)]
    struct RejectingFont {
        inner: BoxFont,
        reject: &'static str,
    }

    impl LabelFont for RejectingFont {
        fn key(&self) -> FontKey {
            self.inner.key()
        }

        fn build(&self, text: &str, config: &LabelConfig) -> Result<MeshData, TextMeshError> {
            if text == self.reject {
                return Err(TextMeshError::Tessellation("degenerate outline".into()));
            }
            self.inner.build(text, config)
        }
    }

    fn deliver(scene: &mut TestScene, font: impl LabelFont + 'static) {
        let token = scene.assets_mut().last_font_token().unwrap();
        scene.assets_mut().complete(AssetCompletion {
            slot: RequestSlot::Font,
            token,
            result: Ok(AssetPayload::Font(Arc::new(font))),
        });
    }

    #[test]
    fn failed_rebuild_keeps_the_previous_geometry_live() {
        let mut scene = TestScene::new(ClockConfig::default(), ManualLoader::default());
        let mut host = RecordingHost::default();
        deliver(
            &mut scene,
            RejectingFont {
                inner: BoxFont(FontKey::Default),
                reject: "02:05:09 PM",
            },
        );
        scene.frame(&mut host, &at(14, 5, 8), 0.0);
        let (old_id, old) = scene.resources().geometry(LabelKind::Time).unwrap();
        let old_handle = old.handle;
        host.events.clear();

        let frame = scene.frame(&mut host, &at(14, 5, 9), 0.1);
        assert_eq!(frame.labels[0].map(|l| l.geometry), Some(old_id));
        let (id, geometry) = scene.resources().geometry(LabelKind::Time).unwrap();
        assert_eq!((id, geometry.handle), (old_id, old_handle));
        assert!(!host
            .events
            .iter()
            .any(|e| matches!(e, HostEvent::DisposeGeometry(_))));
        assert_eq!(scene.label_text(LabelKind::Time), Some("02:05:08 PM"));
        assert_eq!(scene.label_builds(LabelKind::Time), 1);

        // Same second again: the failed text is not retried.
        scene.frame(&mut host, &at(14, 5, 9), 0.2);
        assert_eq!(host.created_geometries(), 0);

        scene.frame(&mut host, &at(14, 5, 10), 0.3);
        assert_eq!(scene.label_builds(LabelKind::Time), 2);
        assert_eq!(scene.label_text(LabelKind::Time), Some("02:05:10 PM"));
        assert!(host.events.contains(&HostEvent::DisposeGeometry(old_handle)));
    }

    struct FixedFormatter;

    impl TimeFormatter for FixedFormatter {
        fn time_string(&self, sample: &TimeSample) -> String {
            format!("T{}", sample.second)
        }

        fn date_string(&self, _: &TimeSample) -> String {
            "today".to_string()
        }
    }

    #[test]
    fn custom_formatter_supplies_label_text() {
        let scene = TestScene::new(ClockConfig::default(), ManualLoader::default());
        let mut scene = scene.with_formatter(FixedFormatter);
        let mut host = RecordingHost::default();
        deliver_font(&mut scene, FontKey::Default);
        scene.frame(&mut host, &at(9, 0, 7), 0.0);
        assert_eq!(scene.label_text(LabelKind::Time), Some("T7"));
        assert_eq!(scene.label_text(LabelKind::Date), Some("today"));
    }
}
