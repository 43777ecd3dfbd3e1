//! Killfeed compositor
//!
//! Renders a killfeed banner for a player-vs-player game event: two agent
//! icons, a weapon icon, optional headshot/wallbang modifiers, name labels and
//! two colored background regions that meet at a diagonal seam. The layout is
//! left-to-right ([`Orientation::Forward`]) or mirrored for the "killed by"
//! perspective ([`Orientation::Reverse`]).
//!
//! # Example
//!
//! ```no_run
//! use killfeed::{KillEvent, KillfeedConfig, Numeral, Orientation};
//! use killfeed::output::OutputDir;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KillfeedConfig::default();
//! let compositor = killfeed::new_compositor(&config);
//! let output = OutputDir::create(&config.output_dir)?;
//!
//! let event = KillEvent::new("Jett", "Sage", "Jett", "Sage", "classic")
//!     .with_headshot(true)
//!     .with_numeral(Some(Numeral::try_from(3)?));
//! let artifact = compositor.generate(&event, Orientation::Forward, &output)?;
//! println!("wrote {} ({} bytes)", artifact.path.display(), artifact.byte_size);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod assets;
pub mod compositor;
pub mod output;
pub mod rendering;
pub mod typeface;

pub use assets::{AssetLayout, AssetSet};
pub use compositor::{Compositor, RenderedKillfeed};
pub use output::{OutputArtifact, OutputDir};
pub use typeface::{TtfTypeface, Typeface};

/// RGBA color as four 8-bit channels.
pub type Rgba8 = [u8; 4];

/// Top-level configuration for a killfeed deployment
///
/// The defaults mirror the on-disk layout used in production: assets under
/// `assets/`, generated files under `generated_killfeeds_v1/`, and a three
/// minute retention for generated images.
///
/// # Examples
///
/// ```
/// let cfg = killfeed::KillfeedConfig::default();
/// assert_eq!(cfg.cleanup_max_age_secs, 180);
/// assert_eq!(cfg.style.canvas_height, 128);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillfeedConfig {
    /// Root directory of the asset tree
    pub asset_root: PathBuf,
    /// Directory receiving generated images
    pub output_dir: PathBuf,
    /// Age in seconds after which generated images are swept
    pub cleanup_max_age_secs: u64,
    /// File naming inside the asset tree
    pub assets: AssetLayout,
    /// Visual constants
    pub style: StyleConfig,
}

impl Default for KillfeedConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            output_dir: PathBuf::from("generated_killfeeds_v1"),
            cleanup_max_age_secs: 180,
            assets: AssetLayout::default(),
            style: StyleConfig::default(),
        }
    }
}

impl KillfeedConfig {
    /// Parse a configuration from JSON. Missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }
}

/// Background and glow colors for one side of the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePalette {
    /// Fill of the side's background polygon
    pub background: Rgba8,
    /// Silhouette glow pasted beneath the side's agent icon
    pub glow: Rgba8,
}

/// Pixel constants of the killfeed design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Height of the banner before extensions
    pub canvas_height: u32,
    /// Agent icons are resized to this box
    pub agent_icon_size: [u32; 2],
    /// Weapon icons are scaled to this height, preserving aspect ratio
    pub weapon_icon_height: u32,
    /// Headshot and wallbang icons are resized to this square
    pub modifier_icon_size: u32,
    /// Extra width reserved next to each modifier icon
    pub modifier_spacing: u32,
    /// Gap between the weapon and the first modifier icon
    pub modifier_gap: u32,
    /// Padding between layout elements
    pub padding: u32,
    /// Label font size in pixels
    pub font_size: f32,
    /// Horizontal distance from the seam tip to the pointed polygon's corners
    pub seam_point_inset: f32,
    /// Horizontal distance from the seam tip to the notched polygon's corners
    pub seam_notch_inset: f32,
    /// Offset of the glow silhouette toward the canvas center
    pub glow_offset: i64,
    /// Colors of the player's team
    pub ally: SidePalette,
    /// Colors of the opposing team
    pub enemy: SidePalette,
    /// Label color
    pub text_color: Rgba8,
    /// Label drop-shadow color
    pub shadow_color: Rgba8,
    /// Label drop-shadow offset
    pub shadow_offset: [i64; 2],
    /// Player-kill highlight color (badge, border and triangle tint)
    pub highlight_color: Rgba8,
    /// Size of the player-kill badge rectangle at the trailing edge
    pub badge_size: [u32; 2],
    /// Player border image is resized to this box
    pub border_size: [u32; 2],
    /// How far the player border hangs past the trailing edge
    pub border_overhang: i64,
    /// Fixed position of the numeral badge in the extended canvas
    pub numeral_offset: [i64; 2],
    /// Weapon identifiers containing this marker are drawn mirrored
    pub weapon_mirror_marker: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            canvas_height: 128,
            agent_icon_size: [256, 128],
            weapon_icon_height: 90,
            modifier_icon_size: 72,
            modifier_spacing: 10,
            modifier_gap: 40,
            padding: 40,
            font_size: 60.0,
            seam_point_inset: 20.0,
            seam_notch_inset: 35.0,
            glow_offset: 10,
            ally: SidePalette {
                background: [75, 190, 158, 255],
                glow: [119, 233, 199, 255],
            },
            enemy: SidePalette {
                background: [214, 98, 98, 255],
                glow: [240, 146, 146, 255],
            },
            text_color: [255, 255, 255, 255],
            shadow_color: [0, 0, 0, 100],
            shadow_offset: [1, 1],
            highlight_color: [231, 237, 131, 255],
            badge_size: [120, 130],
            border_size: [600, 128],
            border_overhang: 30,
            numeral_offset: [12, 30],
            weapon_mirror_marker: "_weapon".to_string(),
        }
    }
}

impl StyleConfig {
    /// Palettes for (killer, victim) as seen from the given perspective.
    ///
    /// In the forward perspective the player's team scored the kill; in the
    /// reverse perspective the player's team was on the receiving end.
    pub fn palettes(&self, orientation: Orientation) -> (SidePalette, SidePalette) {
        match orientation {
            Orientation::Forward => (self.ally, self.enemy),
            Orientation::Reverse => (self.enemy, self.ally),
        }
    }

    /// Checks the invariants the layout relies on.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_height == 0 || self.agent_icon_size.contains(&0) {
            return Err(Error::ConfigError(
                "canvas and agent icon sizes must be non-zero".into(),
            ));
        }
        if self.weapon_icon_height == 0 || self.modifier_icon_size == 0 {
            return Err(Error::ConfigError("icon heights must be non-zero".into()));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(Error::ConfigError(format!(
                "font size {} is not positive",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Which way the banner reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Killer on the left, victim on the right
    #[default]
    Forward,
    /// Mirrored layout: killer on the right ("killed by" perspective)
    Reverse,
}

impl Orientation {
    pub fn is_reverse(self) -> bool {
        self == Orientation::Reverse
    }
}

/// Multi-kill count shown as a badge. Only 3 through 7 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Numeral(u8);

impl Numeral {
    /// The accepted numeral values.
    pub const VALID: [u8; 5] = [3, 4, 5, 6, 7];

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Numeral {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        if Self::VALID.contains(&value) {
            Ok(Numeral(value))
        } else {
            Err(Error::InvalidInput(
                "Only values 3, 4, 5, 6, and 7 are allowed for Numeral.".into(),
            ))
        }
    }
}

impl From<Numeral> for u8 {
    fn from(n: Numeral) -> u8 {
        n.0
    }
}

impl FromStr for Numeral {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: u8 = s.trim().parse().map_err(|_| {
            Error::InvalidInput(format!("numeral '{}' is not a number", s.trim()))
        })?;
        Numeral::try_from(value)
    }
}

impl fmt::Display for Numeral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single kill to render
///
/// Agent and weapon values are asset identifiers (file stems inside the asset
/// tree). Names are used verbatim for labels and sanitized for file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillEvent {
    pub killer_name: String,
    pub victim_name: String,
    pub killer_agent: String,
    pub victim_agent: String,
    pub weapon: String,
    #[serde(default)]
    pub headshot: bool,
    #[serde(default)]
    pub wallbang: bool,
    /// The local player is the highlighted party
    #[serde(default)]
    pub player_kill: bool,
    #[serde(default)]
    pub numeral: Option<Numeral>,
}

impl KillEvent {
    pub fn new(
        killer_name: impl Into<String>,
        victim_name: impl Into<String>,
        killer_agent: impl Into<String>,
        victim_agent: impl Into<String>,
        weapon: impl Into<String>,
    ) -> Self {
        Self {
            killer_name: killer_name.into(),
            victim_name: victim_name.into(),
            killer_agent: killer_agent.into(),
            victim_agent: victim_agent.into(),
            weapon: weapon.into(),
            headshot: false,
            wallbang: false,
            player_kill: false,
            numeral: None,
        }
    }

    pub fn with_headshot(mut self, headshot: bool) -> Self {
        self.headshot = headshot;
        self
    }

    pub fn with_wallbang(mut self, wallbang: bool) -> Self {
        self.wallbang = wallbang;
        self
    }

    pub fn with_player_kill(mut self, player_kill: bool) -> Self {
        self.player_kill = player_kill;
        self
    }

    pub fn with_numeral(mut self, numeral: Option<Numeral>) -> Self {
        self.numeral = numeral;
        self
    }

    /// Caller-side validation of the free-text and identifier fields.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("killer name", &self.killer_name),
            ("victim name", &self.victim_name),
            ("killer agent", &self.killer_agent),
            ("victim agent", &self.victim_agent),
            ("weapon", &self.weapon),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} must not be empty", label)));
            }
        }
        for (label, value) in &fields[2..] {
            if !assets::is_safe_identifier(value) {
                return Err(Error::InvalidInput(format!(
                    "{} '{}' is not a valid asset name",
                    label, value
                )));
            }
        }
        Ok(())
    }
}

/// Create a compositor reading assets from the configured asset root.
pub fn new_compositor(config: &KillfeedConfig) -> Compositor {
    let assets = AssetSet::new(&config.asset_root, config.assets.clone());
    Compositor::new(config.style.clone(), assets)
}
