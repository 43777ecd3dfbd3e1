//! Label typefaces
//!
//! The compositor only needs three things from a font: how wide a string is,
//! where its ink ends vertically, and the glyph outlines to fill. Those live
//! behind the [`Typeface`] trait so layout can be exercised with fixed metrics.

use std::path::Path;

use tiny_skia::PathBuilder;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::{Error, Result};

/// Font metrics and outlines, in pixels at a given size.
///
/// Coordinates follow raster conventions: `y` grows downwards and the origin
/// passed to [`Typeface::outline`] is the top-left corner of the line box
/// (the ascender line), matching where a label is anchored on the canvas.
pub trait Typeface {
    /// Horizontal advance of `text` at `px` pixels.
    fn text_width(&self, text: &str, px: f32) -> f32;

    /// Distance from the top of the line box to the lowest inked pixel.
    fn ink_bottom(&self, text: &str, px: f32) -> f32;

    /// Append the outlines of `text` to `path`, with the line box's top-left
    /// corner at (`x`, `y`).
    fn outline(&self, text: &str, px: f32, x: f32, y: f32, path: &mut PathBuilder);
}

/// TrueType/OpenType font held in memory.
#[derive(Debug, Clone)]
pub struct TtfTypeface {
    data: Vec<u8>,
}

impl TtfTypeface {
    /// Parse font bytes; `origin` is only used for diagnostics.
    pub fn from_bytes(data: Vec<u8>, origin: &Path) -> Result<Self> {
        Face::parse(&data, 0).map_err(|e| Error::AssetDecode {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { data })
    }

    // The bytes were validated in `from_bytes`, so this only fails if the
    // buffer was corrupted in memory.
    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }
}

fn glyph(face: &Face<'_>, c: char) -> GlyphId {
    face.glyph_index(c).unwrap_or(GlyphId(0))
}

fn scale(face: &Face<'_>, px: f32) -> f32 {
    px / f32::from(face.units_per_em().max(1))
}

impl Typeface for TtfTypeface {
    fn text_width(&self, text: &str, px: f32) -> f32 {
        let Some(face) = self.face() else { return 0.0 };
        let s = scale(&face, px);
        text.chars()
            .map(|c| f32::from(face.glyph_hor_advance(glyph(&face, c)).unwrap_or(0)) * s)
            .sum()
    }

    fn ink_bottom(&self, text: &str, px: f32) -> f32 {
        let Some(face) = self.face() else { return 0.0 };
        let s = scale(&face, px);
        let ascent = f32::from(face.ascender()) * s;
        let lowest = text
            .chars()
            .filter_map(|c| face.glyph_bounding_box(glyph(&face, c)))
            .map(|bbox| f32::from(bbox.y_min))
            .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |a| a.min(y))));
        match lowest {
            Some(y_min) => ascent - y_min * s,
            None => ascent,
        }
    }

    fn outline(&self, text: &str, px: f32, x: f32, y: f32, path: &mut PathBuilder) {
        let Some(face) = self.face() else { return };
        let s = scale(&face, px);
        let baseline = y + f32::from(face.ascender()) * s;
        let mut pen = x;
        for c in text.chars() {
            let id = glyph(&face, c);
            let mut sink = GlyphSink {
                path: &mut *path,
                origin_x: pen,
                baseline,
                scale: s,
            };
            let _ = face.outline_glyph(id, &mut sink);
            pen += f32::from(face.glyph_hor_advance(id).unwrap_or(0)) * s;
        }
    }
}

/// Converts font-unit outlines into raster-space path segments.
struct GlyphSink<'a> {
    path: &'a mut PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphSink<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for GlyphSink<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}
