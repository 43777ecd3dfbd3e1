/// Vector paint commands: background polygons and text labels
///
/// Shapes are rasterized with tiny-skia into a coverage mask and then filled
/// onto the RGBA canvas through [`raster::fill_coverage`].

use image::RgbaImage;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Transform};

use crate::rendering::layout::{LabelPlacement, LayoutGeometry, Polygon};
use crate::rendering::raster::{self, Coverage};
use crate::{Error, Result, Rgba8, StyleConfig, Typeface};

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Polygon {
        polygon: Polygon,
        rgba: Rgba8,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        rgba: Rgba8,
    },
}

/// Execute commands in order onto `canvas`.
pub fn execute(
    canvas: &mut RgbaImage,
    commands: &[PaintCommand],
    face: &dyn Typeface,
    font_size: f32,
) -> Result<()> {
    let (w, h) = canvas.dimensions();
    for cmd in commands {
        let coverage = match cmd {
            // Backgrounds are hard-edged so adjoining regions leave no seam gap
            PaintCommand::Polygon { polygon, .. } => {
                rasterize(polygon_path(polygon), w, h, false)?
            }
            PaintCommand::Text { x, y, text, .. } => {
                let mut pb = PathBuilder::new();
                face.outline(text, font_size, *x, *y, &mut pb);
                rasterize(pb.finish(), w, h, true)?
            }
        };
        let rgba = match cmd {
            PaintCommand::Polygon { rgba, .. } | PaintCommand::Text { rgba, .. } => *rgba,
        };
        raster::fill_coverage(canvas, &coverage, rgba);
    }
    Ok(())
}

fn polygon_path(polygon: &Polygon) -> Option<Path> {
    let (first, rest) = polygon.points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

fn rasterize(path: Option<Path>, width: u32, height: u32, anti_alias: bool) -> Result<Coverage> {
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        Error::RenderError(format!("cannot allocate a {}x{} mask", width, height))
    })?;
    if let Some(path) = path {
        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, 255);
        paint.anti_alias = anti_alias;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    let alpha = pixmap.data().chunks_exact(4).map(|px| px[3]).collect();
    Ok(Coverage {
        width,
        height,
        alpha,
    })
}

/// Killer region first, victim region over it, shifted right by `dx`.
pub fn background_commands(
    geometry: &LayoutGeometry,
    killer: Rgba8,
    victim: Rgba8,
    dx: f32,
) -> Vec<PaintCommand> {
    vec![
        PaintCommand::Polygon {
            polygon: geometry.killer_background.translated(dx),
            rgba: killer,
        },
        PaintCommand::Polygon {
            polygon: geometry.victim_background.translated(dx),
            rgba: victim,
        },
    ]
}

/// Drop shadow, then the label itself.
pub fn label_commands(style: &StyleConfig, text: &str, at: LabelPlacement) -> Vec<PaintCommand> {
    if text.is_empty() {
        return Vec::new();
    }
    let [sx, sy] = style.shadow_offset;
    vec![
        PaintCommand::Text {
            x: (at.x + sx) as f32,
            y: (at.y + sy) as f32,
            text: text.to_string(),
            rgba: style.shadow_color,
        },
        PaintCommand::Text {
            x: at.x as f32,
            y: at.y as f32,
            text: text.to_string(),
            rgba: style.text_color,
        },
    ]
}
