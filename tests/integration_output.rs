mod common;

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use common::*;
use killfeed::output::{OutputDir, MIN_SWEEP_AGE};
use killfeed::{Error, KillEvent, Numeral, Orientation};

fn event() -> KillEvent {
    KillEvent::new("Jett", "Sage", "Jett", "Sage", "classic").with_headshot(true)
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn age(path: &Path, by: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - by).unwrap();
}

#[test]
fn generated_png_round_trips() {
    let root = fixture_assets("roundtrip");
    let out = OutputDir::create(scratch_dir("roundtrip-out")).unwrap();
    let artifact = compositor(&root)
        .generate_with_typeface(&event(), Orientation::Forward, &BlockFace, &out)
        .unwrap();

    assert!(artifact.path.starts_with(out.path()));
    assert_eq!(artifact.format, "png");
    assert_eq!((artifact.width, artifact.height), (1214, 128));
    let bytes = fs::read(&artifact.path).unwrap();
    assert_eq!(bytes.len() as u64, artifact.byte_size);
    assert_eq!(artifact.sha256.len(), 64);

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (1214, 128));
    assert_eq!(pixel(&decoded, 792, 64), [75, 190, 158, 255]);
    assert_eq!(pixel(&decoded, 805, 64), [214, 98, 98, 255]);
    assert!(decoded.pixels().all(|p| p.0[3] == 255));

    // no leftovers next to the artifact
    assert_eq!(entries(out.path()), vec![artifact.file_name.clone()]);
}

#[test]
fn file_names_describe_the_event() {
    let root = fixture_assets("names");
    let out = OutputDir::create(scratch_dir("names-out")).unwrap();
    let ev = event()
        .with_player_kill(true)
        .with_numeral(Some(Numeral::try_from(5).unwrap()));
    let artifact = compositor(&root)
        .generate_with_typeface(&ev, Orientation::Forward, &BlockFace, &out)
        .unwrap();
    assert!(artifact.file_name.starts_with("Jett_vs_Sage_5K_"));
    assert!(artifact.file_name.ends_with("_Me.png"));
}

#[test]
fn concurrent_generations_never_collide() {
    let root = fixture_assets("concurrent");
    let out = OutputDir::create(scratch_dir("concurrent-out")).unwrap();
    let comp = compositor(&root);
    let ev = event();

    let names: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|_| {
                s.spawn(|| {
                    comp.generate_with_typeface(&ev, Orientation::Forward, &BlockFace, &out)
                        .unwrap()
                        .file_name
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 6);
    assert_eq!(entries(out.path()), unique);
}

#[test]
fn missing_agent_fails_without_writing() {
    let root = fixture_assets("missing-agent");
    remove_asset(&root, "agents/Sage.png");
    let out = OutputDir::create(scratch_dir("missing-agent-out")).unwrap();
    let err = compositor(&root)
        .generate_with_typeface(&event(), Orientation::Forward, &BlockFace, &out)
        .unwrap_err();
    assert!(err.is_missing_asset());
    assert!(entries(out.path()).is_empty());
}

#[test]
fn missing_font_fails_without_writing() {
    let root = fixture_assets("missing-font");
    let out = OutputDir::create(scratch_dir("missing-font-out")).unwrap();
    let err = compositor(&root)
        .generate(&event(), Orientation::Forward, &out)
        .unwrap_err();
    match err {
        Error::MissingAsset(path) => assert!(path.ends_with("fonts/dinnextw1g_medium.otf")),
        other => panic!("unexpected error: {}", other),
    }
    assert!(entries(out.path()).is_empty());
}

#[test]
fn missing_overlay_art_is_an_error() {
    let root = fixture_assets("missing-overlay");
    remove_asset(&root, "ui/MeBorderTriangle.png");
    remove_asset(&root, "ui/Numeral_4.png");
    let out = OutputDir::create(scratch_dir("missing-overlay-out")).unwrap();
    let comp = compositor(&root);

    let pk = event().with_player_kill(true);
    let err = comp
        .generate_with_typeface(&pk, Orientation::Forward, &BlockFace, &out)
        .unwrap_err();
    assert!(err.is_missing_asset());

    let four = event().with_numeral(Some(Numeral::try_from(4).unwrap()));
    let err = comp
        .generate_with_typeface(&four, Orientation::Forward, &BlockFace, &out)
        .unwrap_err();
    assert!(err.is_missing_asset());
    assert!(entries(out.path()).is_empty());
}

#[test]
fn missing_modifier_icons_are_skipped() {
    let root = fixture_assets("missing-modifiers");
    remove_asset(&root, "icons/headshot.png");
    remove_asset(&root, "icons/wallbang.png");
    let out = compositor(&root)
        .render_with_typeface(&event().with_wallbang(true), Orientation::Forward, &BlockFace)
        .unwrap();
    assert!(!out.headshot);
    assert!(!out.wallbang);
    assert_eq!(out.width(), 1214 - 82);
}

#[test]
fn sweep_removes_only_aged_generated_files() {
    let root = fixture_assets("sweep");
    let out = OutputDir::create(scratch_dir("sweep-out")).unwrap();
    let comp = compositor(&root);
    let fresh = comp
        .generate_with_typeface(&event(), Orientation::Forward, &BlockFace, &out)
        .unwrap();
    let stale = comp
        .generate_with_typeface(&event(), Orientation::Reverse, &BlockFace, &out)
        .unwrap();
    age(&stale.path, Duration::from_secs(3600));

    let notes = out.path().join("notes.txt");
    fs::write(&notes, "keep me").unwrap();
    age(&notes, Duration::from_secs(3600));

    let partial = out.path().join(".orphan.png.partial");
    fs::write(&partial, b"").unwrap();
    age(&partial, Duration::from_secs(3600));

    let report = out.sweep(Duration::from_secs(180)).unwrap();
    assert_eq!(report.removed.len(), 2);
    assert_eq!(report.kept, 1);
    assert_eq!(report.failed, 0);
    assert!(fresh.path.exists());
    assert!(!stale.path.exists());
    assert!(!partial.exists());
    assert!(notes.exists());
}

#[test]
fn sweep_never_drops_below_the_minimum_age() {
    let out = OutputDir::create(scratch_dir("sweep-min")).unwrap();
    let young = out.path().join("young.png");
    fs::write(&young, b"png").unwrap();
    age(&young, MIN_SWEEP_AGE / 2);

    let report = out.sweep(Duration::ZERO).unwrap();
    assert!(report.removed.is_empty());
    assert!(young.exists());

    let later = SystemTime::now() + MIN_SWEEP_AGE;
    let report = out.sweep_at(Duration::ZERO, later).unwrap();
    assert_eq!(report.removed, vec![young.clone()]);
    assert!(!young.exists());
}

#[test]
fn missing_weapon_fails_without_writing() {
    let root = fixture_assets("missing-weapon");
    let out = OutputDir::create(scratch_dir("missing-weapon-out")).unwrap();
    let ev = KillEvent::new("Jett", "Sage", "Jett", "Sage", "vandal");
    let err = compositor(&root)
        .generate_with_typeface(&ev, Orientation::Forward, &BlockFace, &out)
        .unwrap_err();
    match err {
        Error::MissingAsset(path) => assert!(path.ends_with("weapons/vandal.png")),
        other => panic!("unexpected error: {}", other),
    }
    assert!(entries(out.path()).is_empty());
}
