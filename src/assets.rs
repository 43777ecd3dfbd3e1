//! Asset directory contract and loading
//!
//! Assets are plain files addressed by identifier: `agents/{id}.png`,
//! `weapons/{id}.png`, modifier icons under `icons/`, overlay images under
//! `ui/` and one label font. Nothing is cached; every call reads from disk so
//! that an updated asset tree is picked up without a restart.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{Error, Numeral, Orientation, Result};

/// File naming inside the asset tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetLayout {
    pub agents_dir: String,
    pub weapons_dir: String,
    pub icons_dir: String,
    pub ui_dir: String,
    /// Extension appended to agent and weapon identifiers
    pub image_extension: String,
    /// Font path relative to the asset root
    pub font_file: String,
    pub headshot_icon: String,
    pub wallbang_icon: String,
    pub player_border: String,
    pub player_triangle: String,
    /// Numeral badge file prefix for the forward orientation (`{prefix}{n}.png`)
    pub numeral_prefix: String,
    /// Numeral badge file prefix for the reverse orientation
    pub reverse_numeral_prefix: String,
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self {
            agents_dir: "agents".into(),
            weapons_dir: "weapons".into(),
            icons_dir: "icons".into(),
            ui_dir: "ui".into(),
            image_extension: "png".into(),
            font_file: "fonts/dinnextw1g_medium.otf".into(),
            headshot_icon: "headshot.png".into(),
            wallbang_icon: "wallbang.png".into(),
            player_border: "MeBorder.png".into(),
            player_triangle: "MeBorderTriangle.png".into(),
            numeral_prefix: "Numeral_".into(),
            reverse_numeral_prefix: "Rev_Numeral_".into(),
        }
    }
}

/// Read-only handle on an asset tree.
#[derive(Debug, Clone)]
pub struct AssetSet {
    root: PathBuf,
    layout: AssetLayout,
}

impl AssetSet {
    pub fn new(root: impl Into<PathBuf>, layout: AssetLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    pub fn font_path(&self) -> PathBuf {
        self.root.join(&self.layout.font_file)
    }

    pub fn agent_path(&self, id: &str) -> PathBuf {
        self.identified(&self.layout.agents_dir, id)
    }

    pub fn weapon_path(&self, id: &str) -> PathBuf {
        self.identified(&self.layout.weapons_dir, id)
    }

    pub fn headshot_path(&self) -> PathBuf {
        self.root.join(&self.layout.icons_dir).join(&self.layout.headshot_icon)
    }

    pub fn wallbang_path(&self) -> PathBuf {
        self.root.join(&self.layout.icons_dir).join(&self.layout.wallbang_icon)
    }

    pub fn player_border_path(&self) -> PathBuf {
        self.root.join(&self.layout.ui_dir).join(&self.layout.player_border)
    }

    pub fn player_triangle_path(&self) -> PathBuf {
        self.root.join(&self.layout.ui_dir).join(&self.layout.player_triangle)
    }

    /// Badge image for a numeral; each orientation has its own artwork.
    pub fn numeral_path(&self, numeral: Numeral, orientation: Orientation) -> PathBuf {
        let prefix = match orientation {
            Orientation::Forward => &self.layout.numeral_prefix,
            Orientation::Reverse => &self.layout.reverse_numeral_prefix,
        };
        self.root
            .join(&self.layout.ui_dir)
            .join(format!("{}{}.{}", prefix, numeral, self.layout.image_extension))
    }

    fn identified(&self, dir: &str, id: &str) -> PathBuf {
        self.root
            .join(dir)
            .join(format!("{}.{}", id, self.layout.image_extension))
    }

    /// Load a required image as RGBA.
    pub fn load_image(&self, path: &Path) -> Result<RgbaImage> {
        if !path.is_file() {
            return Err(Error::MissingAsset(path.to_path_buf()));
        }
        debug!("loading asset {}", path.display());
        let img = image::open(path).map_err(|e| Error::AssetDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(img.to_rgba8())
    }

    /// Load an image whose absence only disables a visual element.
    pub fn load_optional_image(&self, path: &Path) -> Result<Option<RgbaImage>> {
        match self.load_image(path) {
            Ok(img) => Ok(Some(img)),
            Err(Error::MissingAsset(p)) => {
                warn!("Optional asset {} not found, skipping", p.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Raw bytes of the label font.
    pub fn load_font_bytes(&self) -> Result<Vec<u8>> {
        let path = self.font_path();
        if !path.is_file() {
            return Err(Error::MissingAsset(path));
        }
        Ok(fs::read(&path)?)
    }

    /// Agent identifiers available in the asset tree, sorted.
    pub fn agents(&self) -> Result<Vec<String>> {
        self.catalog(&self.layout.agents_dir)
    }

    /// Weapon identifiers available in the asset tree, sorted.
    pub fn weapons(&self) -> Result<Vec<String>> {
        self.catalog(&self.layout.weapons_dir)
    }

    fn catalog(&self, dir: &str) -> Result<Vec<String>> {
        let dir = self.root.join(dir);
        let entries = fs::read_dir(&dir).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::MissingAsset(dir.clone())
            } else {
                Error::Io(e)
            }
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let matches_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(&self.layout.image_extension));
            if !matches_ext || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Whether an identifier can be joined onto an asset directory without
/// escaping it.
pub fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains("..")
        && !id.chars().any(|c| matches!(c, '/' | '\\' | '\0' | ':'))
}
