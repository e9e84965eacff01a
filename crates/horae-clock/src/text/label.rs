use std::fmt;

use glam::Vec3;

use crate::config::LabelConfig;
use crate::error::TextMeshError;
use crate::mesh::MeshData;

use super::extrude::extrude_contours;
use super::font::{FontHandle, FontKey, GlyphSource};
use super::outline::ContourBuilder;

/// A resolved font the scene can build labels with.
pub trait LabelFont: fmt::Debug + Send + Sync {
    fn key(&self) -> FontKey;
    fn build(&self, text: &str, config: &LabelConfig) -> Result<MeshData, TextMeshError>;
}

impl LabelFont for FontHandle {
    fn key(&self) -> FontKey {
        FontHandle::key(self)
    }

    fn build(&self, text: &str, config: &LabelConfig) -> Result<MeshData, TextMeshError> {
        build_label(text, &self.glyphs()?, config)
    }
}

/// Builds the extruded mesh for `text`.
///
/// Pure: the result depends only on the arguments. The mesh is centered
/// horizontally on x = 0 from its bounding box and moved up by
/// `config.y_offset`. Whitespace advances the pen without adding geometry.
pub fn build_label<G: GlyphSource + ?Sized>(
    text: &str,
    glyphs: &G,
    config: &LabelConfig,
) -> Result<MeshData, TextMeshError> {
    let params = &config.extrude;
    let upem = glyphs.units_per_em().max(1.0);
    let scale = params.size / upem;

    let mut mesh = MeshData::new();
    let mut pen = 0.0f32;
    let mut prev: Option<u16> = None;

    for ch in text.chars() {
        let glyph = glyphs.glyph_index(ch);
        if let Some(left) = prev {
            pen += glyphs.kern(left, glyph) * scale;
        }

        if !ch.is_whitespace() {
            let mut builder = ContourBuilder::new(scale, pen, params.curve_segments);
            glyphs.outline(glyph, &mut builder);
            let contours = builder.finish();
            mesh.append(extrude_contours(&contours, params)?);
        }

        pen += glyphs.advance(glyph) * scale;
        prev = Some(glyph);
    }

    let dx = mesh.aabb().map_or(0.0, |b| -b.center().x);
    mesh.translate(Vec3::new(dx, config.y_offset, 0.0));
    Ok(mesh)
}

#[cfg(test)]
pub(crate) mod testing {
    use ttf_parser::OutlineBuilder;

    use super::super::font::{FontKey, GlyphSource};
    use super::{LabelFont, build_label};
    use crate::config::LabelConfig;
    use crate::error::TextMeshError;
    use crate::mesh::MeshData;

    /// `BoxGlyphs` under a font key.
    #[derive(Debug)]
    pub(crate) struct BoxFont(pub FontKey);

    impl LabelFont for BoxFont {
        fn key(&self) -> FontKey {
            self.0
        }

        fn build(&self, text: &str, config: &LabelConfig) -> Result<MeshData, TextMeshError> {
            build_label(text, &BoxGlyphs, config)
        }
    }

    /// Every glyph is a 600x700 box with a 200x300 hole, advance 700.
    /// Digits are narrower (advance 500) so strings of equal length differ
    /// in width.
    pub(crate) struct BoxGlyphs;

    impl GlyphSource for BoxGlyphs {
        fn units_per_em(&self) -> f32 {
            1000.0
        }

        fn glyph_index(&self, ch: char) -> u16 {
            ch as u16
        }

        fn advance(&self, glyph: u16) -> f32 {
            if (b'0' as u16..=b'9' as u16).contains(&glyph) {
                500.0
            } else {
                700.0
            }
        }

        fn kern(&self, left: u16, right: u16) -> f32 {
            if left == b'A' as u16 && right == b'V' as u16 {
                -80.0
            } else {
                0.0
            }
        }

        fn outline(&self, _glyph: u16, sink: &mut dyn OutlineBuilder) {
            // TrueType convention: outer clockwise, hole counter-clockwise.
            sink.move_to(0.0, 0.0);
            sink.line_to(0.0, 700.0);
            sink.line_to(600.0, 700.0);
            sink.line_to(600.0, 0.0);
            sink.close();
            sink.move_to(200.0, 200.0);
            sink.line_to(400.0, 200.0);
            sink.line_to(400.0, 500.0);
            sink.line_to(200.0, 500.0);
            sink.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::BoxGlyphs;
    use super::*;

    fn config() -> LabelConfig {
        LabelConfig::time_default()
    }

    #[test]
    fn labels_are_centered_regardless_of_text() {
        for text in ["1", "02:05:09 PM", "Tue, Mar 4, 2025", "AV  x", " 7"] {
            let mesh = build_label(text, &BoxGlyphs, &config()).unwrap();
            let center = mesh.aabb().unwrap().center().x;
            assert!(center.abs() < 1e-4, "{text:?} centered at {center}");
        }
    }

    #[test]
    fn vertical_offset_is_applied() {
        let mut cfg = config();
        cfg.y_offset = -0.75;
        let mesh = build_label("8", &BoxGlyphs, &cfg).unwrap();
        let b = mesh.aabb().unwrap();
        // Box glyph bottom is at the baseline; the bevel grows it by bevel_size.
        let bevel = cfg.extrude.bevel_size + cfg.extrude.bevel_offset;
        assert!((b.min.y - (-0.75 - bevel)).abs() < 1e-4);
    }

    #[test]
    fn empty_and_blank_strings_give_empty_meshes() {
        assert!(build_label("", &BoxGlyphs, &config()).unwrap().is_empty());
        assert!(build_label("   ", &BoxGlyphs, &config()).unwrap().is_empty());
    }

    #[test]
    fn kerning_narrows_pairs() {
        let cfg = config();
        let av = build_label("AV", &BoxGlyphs, &cfg).unwrap().aabb().unwrap();
        let ax = build_label("AX", &BoxGlyphs, &cfg).unwrap().aabb().unwrap();
        let expected = 80.0 / 1000.0 * cfg.extrude.size;
        assert!((ax.size().x - av.size().x - expected).abs() < 1e-4);
    }

    #[test]
    fn larger_size_gives_wider_label() {
        let small = build_label("12", &BoxGlyphs, &LabelConfig::date_default()).unwrap();
        let large = build_label("12", &BoxGlyphs, &LabelConfig::time_default()).unwrap();
        assert!(large.aabb().unwrap().size().x > small.aabb().unwrap().size().x);
    }

    #[test]
    fn build_is_deterministic() {
        let a = build_label("02:05:09 PM", &BoxGlyphs, &config()).unwrap();
        let b = build_label("02:05:09 PM", &BoxGlyphs, &config()).unwrap();
        assert_eq!(a, b);
    }
}
