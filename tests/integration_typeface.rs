mod common;

use std::fs;

use common::*;
use killfeed::{KillEvent, Orientation, TtfTypeface, Typeface};
use tiny_skia::PathBuilder;

// DejaVu Sans Mono metrics at 60px: 2048 units per em, ascender 1901
const PX: f32 = 60.0;
const ADVANCE: f32 = 1233.0 * PX / 2048.0;
const ASCENT: f32 = 1901.0 * PX / 2048.0;

fn face() -> TtfTypeface {
    let path = test_font_path();
    TtfTypeface::from_bytes(fs::read(&path).unwrap(), &path).unwrap()
}

fn close(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 0.01, "{} != {}", actual, expected);
}

#[test]
fn width_is_the_sum_of_advances() {
    let face = face();
    close(face.text_width("Jett", PX), 4.0 * ADVANCE);
    close(face.text_width("Sage", PX), 4.0 * ADVANCE);
    close(face.text_width("JettSage", PX), 8.0 * ADVANCE);
    close(face.text_width("", PX), 0.0);
}

#[test]
fn ink_bottom_follows_descenders() {
    let face = face();
    // lowest glyphs: 'J' and 'e' reach -29 units, 'g' reaches -440
    close(face.ink_bottom("Jett", PX), ASCENT + 29.0 * PX / 2048.0);
    close(face.ink_bottom("Sage", PX), ASCENT + 440.0 * PX / 2048.0);
    // no ink below the baseline
    close(face.ink_bottom("I", PX), ASCENT);
}

#[test]
fn outlines_are_placed_below_the_line_top() {
    let face = face();
    let mut pb = PathBuilder::new();
    face.outline("I", PX, 100.0, 10.0, &mut pb);
    let bounds = pb.finish().expect("glyph outline").bounds();
    let s = PX / 2048.0;
    // 'I' spans x 201..1030 and y 0..1493 in font units
    close(bounds.left(), 100.0 + 201.0 * s);
    close(bounds.right(), 100.0 + 1030.0 * s);
    close(bounds.top(), 10.0 + ASCENT - 1493.0 * s);
    close(bounds.bottom(), 10.0 + ASCENT);
}

#[test]
fn compositor_lays_out_labels_with_the_asset_font() {
    let root = fixture_assets("real-font");
    install_font(&root);
    let comp = compositor(&root);
    let face = comp.load_typeface().unwrap();
    close(face.text_width("Jett", PX), 4.0 * ADVANCE);

    let ev = KillEvent::new("Jett", "Sage", "Jett", "Sage", "classic").with_headshot(true);
    let out = comp.render(&ev, Orientation::Forward).unwrap();
    // 256 + 40 + 144.49 + 40 + 180 + 82 + 40 + 40 + 144.49 + 40 + 256
    close(out.geometry.total_width, 1262.984_4);
    assert_eq!(out.width(), 1262);

    let killer = out.geometry.killer_label;
    let victim = out.geometry.victim_label;
    assert_eq!((killer.x, killer.y), (296, 35));
    // 'g' hangs lower, so the victim label sits higher
    assert_eq!((victim.x, victim.y), (862, 29));

    let glyph_top = killer.y as f32 + ASCENT - 1493.0 * PX / 2048.0;
    let ink_bottom = killer.y as f32 + face.ink_bottom("Jett", PX);
    let mut white = 0;
    for y in 0..out.height() {
        for x in 296..296 + 145 {
            if pixel(&out.image, x, y) == [255, 255, 255, 255] {
                white += 1;
                let row = y as f32;
                assert!(row >= glyph_top.floor() && row <= ink_bottom, "ink at row {}", y);
            }
        }
    }
    assert!(white > 100, "only {} label pixels", white);
}

#[test]
fn asset_font_must_parse() {
    let root = fixture_assets("bad-font");
    let font = root.join("fonts/dinnextw1g_medium.otf");
    fs::create_dir_all(font.parent().unwrap()).unwrap();
    fs::write(&font, b"not a font").unwrap();
    let err = compositor(&root).load_typeface().unwrap_err();
    assert!(matches!(err, killfeed::Error::AssetDecode { ref path, .. } if path == &font));
}
