//! Output directory: naming, single-write persistence and age-based cleanup
//!
//! Every artifact name carries a random token next to the timestamp, so
//! concurrent calls never target the same file. Bytes are written to a hidden
//! `.partial` file and renamed into place, which means a reader either sees the
//! complete PNG or nothing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use image::RgbaImage;
use log::{debug, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::rendering::Screenshot;
use crate::{KillEvent, Result};

/// Files younger than this are never swept, whatever the configured age.
pub const MIN_SWEEP_AGE: Duration = Duration::from_secs(30);

const PARTIAL_SUFFIX: &str = ".partial";

/// A generated killfeed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
    /// Always `png`
    pub format: String,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
}

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub kept: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct OutputDir {
    dir: PathBuf,
}

impl OutputDir {
    /// Open `dir`, creating it if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Encode `image` and write it under a fresh unique name.
    pub fn persist(&self, event: &KillEvent, image: &RgbaImage) -> Result<OutputArtifact> {
        let shot = Screenshot::from_rgba(image)?;
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let file_name = artifact_file_name(event, timestamp, &unique_token());
        let path = self.dir.join(&file_name);
        let partial = self.dir.join(format!(".{}{}", file_name, PARTIAL_SUFFIX));

        let written =
            fs::write(&partial, &shot.png_data).and_then(|()| fs::rename(&partial, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
        debug!("wrote {} ({} bytes)", path.display(), shot.byte_size());

        Ok(OutputArtifact {
            path,
            file_name,
            width: shot.width,
            height: shot.height,
            byte_size: shot.byte_size(),
            format: "png".to_string(),
            sha256: hex::encode(Sha256::digest(&shot.png_data)),
        })
    }

    /// Delete generated files older than `max_age` (never younger than
    /// [`MIN_SWEEP_AGE`]).
    pub fn sweep(&self, max_age: Duration) -> Result<SweepReport> {
        self.sweep_at(max_age, SystemTime::now())
    }

    pub fn sweep_at(&self, max_age: Duration, now: SystemTime) -> Result<SweepReport> {
        let threshold = max_age.max(MIN_SWEEP_AGE);
        let mut report = SweepReport::default();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !is_generated(&path) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let age = meta
                .modified()
                .ok()
                .and_then(|mtime| now.duration_since(mtime).ok())
                .unwrap_or(Duration::ZERO);
            if age <= threshold {
                report.kept += 1;
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) => {
                    warn!("Failed to delete {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}

fn is_generated(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".png") || n.ends_with(PARTIAL_SUFFIX))
}

/// `{killer}_vs_{victim}_{numeral}K_{timestamp}_{token}[_Me].png`
pub fn artifact_file_name(event: &KillEvent, timestamp: u64, token: &str) -> String {
    let numeral = event.numeral.map(|n| n.to_string()).unwrap_or_default();
    let me = if event.player_kill { "_Me" } else { "" };
    format!(
        "{}_vs_{}_{}K_{}_{}{}.png",
        sanitize_component(&event.killer_name),
        sanitize_component(&event.victim_name),
        numeral,
        timestamp,
        token,
        me
    )
}

/// 12 random hex digits.
pub fn unique_token() -> String {
    hex::encode(rand::random::<[u8; 6]>())
}

/// Make free text safe to embed in a file name.
pub fn sanitize_component(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Numeral;

    #[test]
    fn file_name_encodes_event() {
        let event = KillEvent::new("Jett", "Sage", "Jett", "Sage", "classic")
            .with_numeral(Some(Numeral::try_from(4).unwrap()))
            .with_player_kill(true);
        assert_eq!(
            artifact_file_name(&event, 1_700_000_000, "abcdef012345"),
            "Jett_vs_Sage_4K_1700000000_abcdef012345_Me.png"
        );

        let plain = KillEvent::new("Jett", "Sage", "Jett", "Sage", "classic");
        assert_eq!(
            artifact_file_name(&plain, 1, "00"),
            "Jett_vs_Sage_K_1_00.png"
        );
    }

    #[test]
    fn names_cannot_escape_output_dir() {
        assert_eq!(sanitize_component("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_component("a\\b:c"), "a_b_c");
        assert_eq!(sanitize_component("..."), "_");
        assert_eq!(sanitize_component("  xX Oper Xx "), "xX Oper Xx");
    }

    #[test]
    fn tokens_are_twelve_hex_digits_and_differ() {
        let a = unique_token();
        let b = unique_token();
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn only_generated_files_are_sweep_candidates() {
        assert!(is_generated(Path::new("/x/Jett_vs_Sage_K_1_ab.png")));
        assert!(is_generated(Path::new("/x/.Jett.png.partial")));
        assert!(!is_generated(Path::new("/x/README.md")));
    }
}
