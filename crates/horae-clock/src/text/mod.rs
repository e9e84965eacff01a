//! Text mesh factory.
//!
//! Lays a string out with font metrics, flattens glyph outlines into
//! contours, and extrudes them into a beveled solid centered on x = 0.

mod extrude;
mod font;
mod label;
mod outline;

pub use extrude::extrude_contours;
pub use font::{FaceGlyphs, FontCatalog, FontHandle, FontKey, GlyphSource};
pub use label::{LabelFont, build_label};
pub use outline::{Contour, ContourBuilder};

#[cfg(test)]
pub(crate) use label::testing;
