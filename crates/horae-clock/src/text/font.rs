use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use ttf_parser::OutlineBuilder;

use crate::error::{AssetLoadError, TextMeshError};

/// The built-in font choices.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FontKey {
    #[default]
    Default,
    Alt1,
    Alt2,
    Alt3,
}

impl FontKey {
    pub const ALL: [FontKey; 4] = [FontKey::Default, FontKey::Alt1, FontKey::Alt2, FontKey::Alt3];

    pub fn name(self) -> &'static str {
        match self {
            FontKey::Default => "default",
            FontKey::Alt1 => "alt-1",
            FontKey::Alt2 => "alt-2",
            FontKey::Alt3 => "alt-3",
        }
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FontKey::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown font key '{s}' (expected default, alt-1, alt-2, alt-3)"))
    }
}

/// Source of glyph metrics and outlines, in font units (y up).
pub trait GlyphSource {
    fn units_per_em(&self) -> f32;
    /// 0 is the missing glyph.
    fn glyph_index(&self, ch: char) -> u16;
    fn advance(&self, glyph: u16) -> f32;
    fn kern(&self, left: u16, right: u16) -> f32;
    fn outline(&self, glyph: u16, sink: &mut dyn OutlineBuilder);
}

/// A loaded font. Cheap to clone.
#[derive(Clone)]
pub struct FontHandle {
    key: FontKey,
    font: Arc<fontdue::Font>,
    data: Arc<[u8]>,
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("key", &self.key)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl FontHandle {
    pub fn from_bytes(key: FontKey, bytes: Vec<u8>) -> Result<Self, AssetLoadError> {
        let data: Arc<[u8]> = bytes.into();
        let font = fontdue::Font::from_bytes(&data[..], fontdue::FontSettings::default())
            .map_err(|e| AssetLoadError::Font(e.to_string()))?;
        // Outlines come from ttf-parser; reject faces it cannot read up front.
        ttf_parser::Face::parse(&data, 0).map_err(|e| AssetLoadError::Font(e.to_string()))?;
        Ok(Self {
            key,
            font: Arc::new(font),
            data,
        })
    }

    #[inline]
    pub fn key(&self) -> FontKey {
        self.key
    }

    /// Borrows metrics and outlines for one layout pass.
    pub fn glyphs(&self) -> Result<FaceGlyphs<'_>, TextMeshError> {
        let face = ttf_parser::Face::parse(&self.data, 0)
            .map_err(|e| TextMeshError::FaceParse(e.to_string()))?;
        Ok(FaceGlyphs {
            font: &self.font,
            face,
        })
    }
}

/// `fontdue` metrics + `ttf-parser` outlines over one font.
pub struct FaceGlyphs<'a> {
    font: &'a fontdue::Font,
    face: ttf_parser::Face<'a>,
}

impl GlyphSource for FaceGlyphs<'_> {
    fn units_per_em(&self) -> f32 {
        self.font.units_per_em()
    }

    fn glyph_index(&self, ch: char) -> u16 {
        self.font.lookup_glyph_index(ch)
    }

    fn advance(&self, glyph: u16) -> f32 {
        // Metrics at px == units_per_em are in font units.
        self.font
            .metrics_indexed(glyph, self.units_per_em())
            .advance_width
    }

    fn kern(&self, left: u16, right: u16) -> f32 {
        self.font
            .horizontal_kern_indexed(left, right, self.units_per_em())
            .unwrap_or(0.0)
    }

    fn outline(&self, glyph: u16, sink: &mut dyn OutlineBuilder) {
        let _ = self.face.outline_glyph(ttf_parser::GlyphId(glyph), sink);
    }
}

/// Where each font key lives on disk.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    paths: HashMap<FontKey, PathBuf>,
}

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/liberation",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

fn system_candidates(key: FontKey) -> &'static [&'static str] {
    match key {
        FontKey::Default => &[
            "DejaVuSans-Bold.ttf",
            "LiberationSans-Bold.ttf",
            "Arial Bold.ttf",
            "arialbd.ttf",
        ],
        FontKey::Alt1 => &[
            "DejaVuSerif-Bold.ttf",
            "LiberationSerif-Bold.ttf",
            "Georgia Bold.ttf",
            "georgiab.ttf",
        ],
        FontKey::Alt2 => &[
            "DejaVuSansMono-Bold.ttf",
            "LiberationMono-Bold.ttf",
            "Courier New Bold.ttf",
            "courbd.ttf",
        ],
        FontKey::Alt3 => &[
            "DejaVuSans.ttf",
            "LiberationSans-Regular.ttf",
            "Arial.ttf",
            "arial.ttf",
        ],
    }
}

impl FontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: FontKey, path: impl Into<PathBuf>) -> Self {
        self.insert(key, path);
        self
    }

    pub fn insert(&mut self, key: FontKey, path: impl Into<PathBuf>) {
        self.paths.insert(key, path.into());
    }

    pub fn path(&self, key: FontKey) -> Option<&Path> {
        self.paths.get(&key).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Picks up `default.ttf`, `alt-1.otf`, ... from `dir`.
    pub fn scan_dir(mut self, dir: &Path) -> Self {
        for key in FontKey::ALL {
            for ext in ["ttf", "otf"] {
                let candidate = dir.join(format!("{}.{ext}", key.name()));
                if candidate.is_file() {
                    self.insert(key, candidate);
                    break;
                }
            }
        }
        self
    }

    /// Fills keys that are still unset from well-known system font files.
    pub fn with_system_fallbacks(mut self) -> Self {
        for key in FontKey::ALL {
            if self.paths.contains_key(&key) {
                continue;
            }
            let found = SYSTEM_FONT_DIRS.iter().find_map(|dir| {
                system_candidates(key)
                    .iter()
                    .map(|file| Path::new(dir).join(file))
                    .find(|p| p.is_file())
            });
            match found {
                Some(path) => {
                    log::debug!("font {key}: using {}", path.display());
                    self.insert(key, path);
                }
                None => log::warn!("font {key}: no system font found"),
            }
        }
        self
    }

    /// Reads and parses the font for `key`. Blocking; call off the render thread.
    pub fn load(&self, key: FontKey) -> Result<FontHandle, AssetLoadError> {
        let path = self.path(key).ok_or(AssetLoadError::UnknownFont(key))?;
        let bytes = std::fs::read(path).map_err(|source| AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        FontHandle::from_bytes(key, bytes)
    }
}
