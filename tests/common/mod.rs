//! Shared fixtures: a generated asset tree and a fixed-metric typeface
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use killfeed::{AssetLayout, AssetSet, Compositor, StyleConfig, Typeface};
use tiny_skia::{PathBuilder, Rect};

pub const JETT_STRIPE: [u8; 4] = [10, 20, 200, 255];
pub const SAGE_STRIPE: [u8; 4] = [20, 160, 40, 255];
pub const NUMERAL_INK: [u8; 4] = [250, 250, 250, 255];
pub const WEAPON_WIDTH: u32 = 180;
pub const TRIANGLE_WIDTH: u32 = 64;
pub const NUMERAL_WIDTH: u32 = 100;
pub const HIGHLIGHT: [u8; 4] = [231, 237, 131, 255];

/// Every glyph advances half the font size; ink spans 10%..80% of the size
/// vertically and 10%..40% horizontally.
pub struct BlockFace;

impl Typeface for BlockFace {
    fn text_width(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * 0.5
    }

    fn ink_bottom(&self, _text: &str, px: f32) -> f32 {
        px * 0.8
    }

    fn outline(&self, text: &str, px: f32, x: f32, y: f32, path: &mut PathBuilder) {
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let pen = x + i as f32 * px * 0.5;
            let rect = Rect::from_ltrb(pen + px * 0.1, y + px * 0.1, pen + px * 0.4, y + px * 0.8);
            if let Some(rect) = rect {
                path.push_rect(rect);
            }
        }
    }
}

pub fn scratch_dir(tag: &str) -> PathBuf {
    let name = format!("killfeed-{}-{}", tag, killfeed::output::unique_token());
    let dir = std::env::temp_dir().join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Agent silhouette: opaque body over x 40..216, y 8..128 with a colored
/// stripe over x 40..60 so orientation can be checked.
fn agent_icon(body: [u8; 4], stripe: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(256, 128, |x, y| {
        if !(40..216).contains(&x) || y < 8 {
            Rgba([0, 0, 0, 0])
        } else if x < 60 {
            Rgba(stripe)
        } else {
            Rgba(body)
        }
    })
}

fn opaque(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Opaque `thickness`-pixel frame around a transparent interior.
fn frame(width: u32, height: u32, thickness: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let edge =
            x < thickness || y < thickness || x >= width - thickness || y >= height - thickness;
        if edge {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn save(root: &Path, rel: &str, img: &RgbaImage) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save(&path).unwrap();
}

/// Build a complete asset tree (without a font).
pub fn fixture_assets(tag: &str) -> PathBuf {
    let root = scratch_dir(tag);
    save(&root, "agents/Jett.png", &agent_icon([200, 200, 220, 255], JETT_STRIPE));
    save(&root, "agents/Sage.png", &agent_icon([90, 220, 200, 255], SAGE_STRIPE));
    // scaled to 180x90 on load
    save(&root, "weapons/classic.png", &opaque(360, 180, [230, 230, 230, 255]));
    save(&root, "weapons/ghost_weapon.png", &opaque(240, 120, [200, 200, 200, 255]));
    save(&root, "icons/headshot.png", &opaque(72, 72, [255, 255, 255, 255]));
    save(&root, "icons/wallbang.png", &opaque(72, 72, [180, 180, 180, 255]));
    save(&root, "ui/MeBorder.png", &frame(600, 128, 4));
    save(&root, "ui/MeBorderTriangle.png", &opaque(TRIANGLE_WIDTH, 128, [255, 255, 255, 255]));
    for n in 3..=7 {
        save(&root, &format!("ui/Numeral_{}.png", n), &opaque(NUMERAL_WIDTH, 70, NUMERAL_INK));
        save(&root, &format!("ui/Rev_Numeral_{}.png", n), &opaque(NUMERAL_WIDTH, 70, NUMERAL_INK));
    }
    root
}

pub fn remove_asset(root: &Path, rel: &str) {
    fs::remove_file(root.join(rel)).unwrap();
}

pub fn compositor(root: &Path) -> Compositor {
    Compositor::new(StyleConfig::default(), AssetSet::new(root, AssetLayout::default()))
}

pub fn pixel(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

/// DejaVu Sans Mono: every glyph advances 1233 of 2048 units per em.
pub fn test_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fonts/DejaVuSansMono.ttf")
}

/// Install the test font where the asset layout expects the label font.
pub fn install_font(root: &Path) {
    let dest = root.join(AssetLayout::default().font_file);
    fs::create_dir_all(dest.parent().unwrap()).unwrap();
    fs::copy(test_font_path(), dest).unwrap();
}
