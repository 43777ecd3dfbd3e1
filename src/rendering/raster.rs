/// RGBA raster primitives
///
/// Pastes and mask fills interpolate all four channels by the mask value, so
/// drawing a semi-transparent color over an opaque pixel lowers its alpha.
/// `flatten` is the only operation with source-over semantics.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::{Error, Result, Rgba8};

/// Per-pixel coverage (0 = outside, 255 = fully inside) of a filled shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    pub alpha: Vec<u8>,
}

impl Coverage {
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[(y * self.width + x) as usize]
    }
}

/// Fully transparent canvas.
pub fn blank(width: u32, height: u32) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::RenderError(format!(
            "cannot allocate a {}x{} canvas",
            width, height
        )));
    }
    Ok(RgbaImage::new(width, height))
}

pub fn solid(width: u32, height: u32, color: Rgba8) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

#[inline]
fn lerp(dst: u8, src: u8, m: u8) -> u8 {
    let m = u32::from(m);
    ((u32::from(src) * m + u32::from(dst) * (255 - m) + 127) / 255) as u8
}

#[inline]
fn blend_into(dst: &mut Rgba<u8>, src: Rgba8, m: u8) {
    match m {
        0 => {}
        255 => dst.0 = src,
        _ => {
            for (d, s) in dst.0.iter_mut().zip(src) {
                *d = lerp(*d, s, m);
            }
        }
    }
}

/// Paste `src` with its top-left corner at (`x`, `y`).
///
/// With a mask, each pixel is interpolated by the mask's alpha at the same
/// sprite coordinate; without one, `src` replaces the destination. Parts
/// falling outside `dst` are clipped.
pub fn paste(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64, mask: Option<&RgbaImage>) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    for sy in 0..src.height() {
        let ty = y + i64::from(sy);
        if ty < 0 || ty >= dh {
            continue;
        }
        for sx in 0..src.width() {
            let tx = x + i64::from(sx);
            if tx < 0 || tx >= dw {
                continue;
            }
            let m = match mask {
                Some(mask) => mask.get_pixel_checked(sx, sy).map_or(0, |p| p.0[3]),
                None => 255,
            };
            let s = src.get_pixel(sx, sy).0;
            blend_into(dst.get_pixel_mut(tx as u32, ty as u32), s, m);
        }
    }
}

/// Paste a solid rectangle, replacing what is underneath.
pub fn fill_rect(dst: &mut RgbaImage, x: i64, y: i64, width: u32, height: u32, color: Rgba8) {
    paste(dst, &solid(width, height, color), x, y, None);
}

/// Fill `color` through a coverage mask laid over the whole canvas.
pub fn fill_coverage(dst: &mut RgbaImage, coverage: &Coverage, color: Rgba8) {
    for (x, y, px) in dst.enumerate_pixels_mut() {
        blend_into(px, color, coverage.get(x, y));
    }
}

/// A `color` silhouette shaped like `mask`'s alpha channel.
pub fn tint(mask: &RgbaImage, color: Rgba8) -> RgbaImage {
    let [r, g, b, a] = color;
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let m = u32::from(mask.get_pixel(x, y).0[3]);
        Rgba([r, g, b, ((u32::from(a) * m + 127) / 255) as u8])
    })
}

pub fn mirror(img: &RgbaImage) -> RgbaImage {
    imageops::flip_horizontal(img)
}

pub fn resize_exact(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::CatmullRom)
}

/// Scale to `height`, keeping the aspect ratio (width is truncated).
pub fn scale_to_height(img: &RgbaImage, height: u32) -> RgbaImage {
    let ratio = height as f64 / f64::from(img.height().max(1));
    let width = ((f64::from(img.width()) * ratio) as u32).max(1);
    resize_exact(img, width, height)
}

/// Composite `foreground` over `background` (source-over, straight alpha).
/// An opaque background pixel stays at alpha 255.
pub fn flatten(mut background: RgbaImage, foreground: &RgbaImage) -> RgbaImage {
    for (x, y, bg) in background.enumerate_pixels_mut() {
        let Some(fg) = foreground.get_pixel_checked(x, y) else {
            continue;
        };
        bg.0 = over(fg.0, bg.0);
    }
    background
}

#[inline]
fn over(fg: Rgba8, bg: Rgba8) -> Rgba8 {
    let fa = u32::from(fg[3]);
    let ba = u32::from(bg[3]);
    match fa {
        0 => return bg,
        255 => return fg,
        _ => {}
    }
    let under = (ba * (255 - fa) + 127) / 255;
    let out_a = fa + under;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(fg[i]) * fa + u32::from(bg[i]) * under;
        out[i] = ((c + out_a / 2) / out_a) as u8;
    }
    out[3] = out_a as u8;
    out
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
