//! The killfeed compositor
//!
//! One call runs the whole pipeline in memory: load assets, measure labels,
//! lay out the banner, paint backgrounds, layer sprites, draw labels, apply the
//! player-highlight and numeral extensions, and flatten the result over a
//! freshly painted background layer. Nothing touches the output directory
//! until the composite is complete.

use image::RgbaImage;
use log::{debug, error, info};

use crate::output::{OutputArtifact, OutputDir};
use crate::rendering::layout::{LayoutGeometry, LayoutInputs, Placement};
use crate::rendering::paint::{self, PaintCommand};
use crate::rendering::raster;
use crate::{
    AssetSet, KillEvent, Numeral, Orientation, Result, SidePalette, StyleConfig,
    TtfTypeface, Typeface,
};

/// Finished composite, before it is written anywhere.
#[derive(Debug, Clone)]
pub struct RenderedKillfeed {
    pub image: RgbaImage,
    /// Layout of the banner before extensions
    pub geometry: LayoutGeometry,
    /// Width prepended by the numeral badge
    pub leading_extension: u32,
    /// Width appended by the player-highlight triangle
    pub trailing_extension: u32,
    /// Whether the headshot icon was drawn (false when disabled or missing)
    pub headshot: bool,
    /// Whether the wallbang icon was drawn
    pub wallbang: bool,
}

impl RenderedKillfeed {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

struct Sprites {
    killer_agent: RgbaImage,
    victim_agent: RgbaImage,
    weapon: RgbaImage,
    headshot: Option<RgbaImage>,
    wallbang: Option<RgbaImage>,
}

/// Renders killfeed banners from an asset tree.
#[derive(Debug, Clone)]
pub struct Compositor {
    style: StyleConfig,
    assets: AssetSet,
}

impl Compositor {
    pub fn new(style: StyleConfig, assets: AssetSet) -> Self {
        Self { style, assets }
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn assets(&self) -> &AssetSet {
        &self.assets
    }

    /// Load the label font from the asset tree.
    pub fn load_typeface(&self) -> Result<TtfTypeface> {
        let data = self.assets.load_font_bytes()?;
        TtfTypeface::from_bytes(data, &self.assets.font_path())
    }

    /// Render with the asset tree's font.
    pub fn render(&self, event: &KillEvent, orientation: Orientation) -> Result<RenderedKillfeed> {
        let face = self.load_typeface()?;
        self.render_with_typeface(event, orientation, &face)
    }

    /// Render and write the banner into `output`.
    pub fn generate(
        &self,
        event: &KillEvent,
        orientation: Orientation,
        output: &OutputDir,
    ) -> Result<OutputArtifact> {
        let result = self
            .render(event, orientation)
            .and_then(|rendered| output.persist(event, &rendered.image));
        log_outcome(event, &result);
        result
    }

    /// Like [`Compositor::generate`] with a caller-supplied typeface.
    pub fn generate_with_typeface(
        &self,
        event: &KillEvent,
        orientation: Orientation,
        face: &dyn Typeface,
        output: &OutputDir,
    ) -> Result<OutputArtifact> {
        let result = self
            .render_with_typeface(event, orientation, face)
            .and_then(|rendered| output.persist(event, &rendered.image));
        log_outcome(event, &result);
        result
    }

    pub fn render_with_typeface(
        &self,
        event: &KillEvent,
        orientation: Orientation,
        face: &dyn Typeface,
    ) -> Result<RenderedKillfeed> {
        let style = &self.style;
        style.validate()?;
        let sprites = self.load_sprites(event)?;

        let px = style.font_size;
        let inputs = LayoutInputs {
            killer_name_width: face.text_width(&event.killer_name, px),
            victim_name_width: face.text_width(&event.victim_name, px),
            killer_ink_bottom: face.ink_bottom(&event.killer_name, px),
            victim_ink_bottom: face.ink_bottom(&event.victim_name, px),
            weapon_size: sprites.weapon.dimensions(),
            weapon_marked: weapon_is_marked(&event.weapon, &style.weapon_mirror_marker),
            wallbang_size: sprites.wallbang.as_ref().map(RgbaImage::dimensions),
            headshot_size: sprites.headshot.as_ref().map(RgbaImage::dimensions),
        };
        let geometry = LayoutGeometry::compute(style, orientation, &inputs);
        debug!(
            "layout {:?}: total width {:.2}, canvas {}x{}, seam at {:.2}",
            orientation,
            geometry.total_width,
            geometry.canvas_width,
            geometry.canvas_height,
            geometry.seam_x
        );

        let (killer_palette, victim_palette) = style.palettes(orientation);
        let backgrounds = |dx: f32| {
            paint::background_commands(
                &geometry,
                killer_palette.background,
                victim_palette.background,
                dx,
            )
        };

        let mut canvas = raster::blank(geometry.canvas_width, geometry.canvas_height)?;
        paint::execute(&mut canvas, &backgrounds(0.0), face, px)?;

        self.layer_sprites(
            &mut canvas,
            &geometry,
            &sprites,
            event.player_kill,
            killer_palette,
            victim_palette,
        );

        let mut labels: Vec<PaintCommand> =
            paint::label_commands(style, &event.killer_name, geometry.killer_label);
        labels.extend(paint::label_commands(style, &event.victim_name, geometry.victim_label));
        paint::execute(&mut canvas, &labels, face, px)?;

        let mut trailing_extension = 0;
        if event.player_kill {
            let (extended, added) = self.apply_player_highlight(canvas)?;
            canvas = extended;
            trailing_extension = added;
        }
        let mut leading_extension = 0;
        if let Some(numeral) = event.numeral {
            let (extended, added) = self.apply_numeral(canvas, numeral, orientation)?;
            canvas = extended;
            leading_extension = added;
        }

        // Extensions moved the banner's origin; repaint the backgrounds where
        // the banner now sits and composite everything over them.
        let mut background = raster::blank(canvas.width(), canvas.height())?;
        paint::execute(&mut background, &backgrounds(leading_extension as f32), face, px)?;
        let image = raster::flatten(background, &canvas);

        Ok(RenderedKillfeed {
            image,
            headshot: sprites.headshot.is_some(),
            wallbang: sprites.wallbang.is_some(),
            geometry,
            leading_extension,
            trailing_extension,
        })
    }

    fn load_sprites(&self, event: &KillEvent) -> Result<Sprites> {
        let style = &self.style;
        let assets = &self.assets;
        let [aw, ah] = style.agent_icon_size;
        let agent = |id: &str| -> Result<RgbaImage> {
            let img = assets.load_image(&assets.agent_path(id))?;
            Ok(raster::resize_exact(&img, aw, ah))
        };
        let killer_agent = agent(&event.killer_agent)?;
        let victim_agent = agent(&event.victim_agent)?;
        let weapon = raster::scale_to_height(
            &assets.load_image(&assets.weapon_path(&event.weapon))?,
            style.weapon_icon_height,
        );

        let m = style.modifier_icon_size;
        let modifier = |enabled: bool, path: std::path::PathBuf| -> Result<Option<RgbaImage>> {
            if !enabled {
                return Ok(None);
            }
            Ok(assets
                .load_optional_image(&path)?
                .map(|img| raster::resize_exact(&img, m, m)))
        };
        let headshot = modifier(event.headshot, assets.headshot_path())?;
        let wallbang = modifier(event.wallbang, assets.wallbang_path())?;

        Ok(Sprites {
            killer_agent,
            victim_agent,
            weapon,
            headshot,
            wallbang,
        })
    }

    fn layer_sprites(
        &self,
        canvas: &mut RgbaImage,
        geometry: &LayoutGeometry,
        sprites: &Sprites,
        player_kill: bool,
        killer: SidePalette,
        victim: SidePalette,
    ) {
        let style = &self.style;
        if player_kill {
            let [bw, bh] = style.badge_size;
            let x = i64::from(canvas.width()) - i64::from(bw);
            raster::fill_rect(canvas, x, 0, bw, bh, style.highlight_color);
        }

        let agents = [
            (&sprites.killer_agent, geometry.killer_icon, geometry.killer_glow, killer.glow),
            (&sprites.victim_agent, geometry.victim_icon, geometry.victim_glow, victim.glow),
        ];
        for (icon, at, glow_at, glow) in agents {
            let icon = oriented(icon, at);
            let silhouette = raster::solid(icon.width(), icon.height(), glow);
            raster::paste(canvas, &silhouette, glow_at.x, glow_at.y, Some(&icon));
            raster::paste(canvas, &icon, at.x, at.y, Some(&icon));
        }

        let weapon = oriented(&sprites.weapon, geometry.weapon);
        raster::paste(canvas, &weapon, geometry.weapon.x, geometry.weapon.y, Some(&weapon));

        let modifiers = [
            (sprites.wallbang.as_ref(), geometry.wallbang),
            (sprites.headshot.as_ref(), geometry.headshot),
        ];
        for (icon, at) in modifiers {
            if let (Some(icon), Some(at)) = (icon, at) {
                raster::paste(canvas, icon, at.x, at.y, Some(icon));
            }
        }
    }

    /// Tint the player border over the trailing edge and append the triangle.
    fn apply_player_highlight(&self, mut canvas: RgbaImage) -> Result<(RgbaImage, u32)> {
        let style = &self.style;
        let assets = &self.assets;
        let triangle = raster::mirror(&assets.load_image(&assets.player_triangle_path())?);

        if let Some(border) = assets.load_optional_image(&assets.player_border_path())? {
            let [bw, bh] = style.border_size;
            let border = raster::mirror(&raster::resize_exact(&border, bw, bh));
            let fill = raster::solid(bw, bh, style.highlight_color);
            let x = i64::from(canvas.width()) - i64::from(bw) + style.border_overhang;
            raster::paste(&mut canvas, &fill, x, 0, Some(&border));
        }

        let tinted = raster::tint(&triangle, style.highlight_color);
        let (w, h) = canvas.dimensions();
        let height = h.max(triangle.height());
        let mut out = raster::blank(w + triangle.width(), height)?;
        raster::paste(&mut out, &canvas, 0, 0, None);
        let y = (i64::from(height) - i64::from(triangle.height())) / 2;
        raster::paste(&mut out, &tinted, i64::from(w), y, Some(&triangle));
        Ok((out, triangle.width()))
    }

    /// Prepend the numeral badge at its fixed offset.
    fn apply_numeral(
        &self,
        canvas: RgbaImage,
        numeral: Numeral,
        orientation: Orientation,
    ) -> Result<(RgbaImage, u32)> {
        let assets = &self.assets;
        let badge = assets.load_image(&assets.numeral_path(numeral, orientation))?;
        let (w, h) = canvas.dimensions();
        let mut out = raster::blank(w + badge.width(), h.max(badge.height()))?;
        raster::paste(&mut out, &canvas, i64::from(badge.width()), 0, None);
        let [nx, ny] = self.style.numeral_offset;
        raster::paste(&mut out, &badge, nx, ny, Some(&badge));
        Ok((out, badge.width()))
    }
}

fn oriented(img: &RgbaImage, at: Placement) -> RgbaImage {
    if at.mirrored {
        raster::mirror(img)
    } else {
        img.clone()
    }
}

/// Weapons drawn facing the other way are tagged in their identifier.
pub fn weapon_is_marked(weapon: &str, marker: &str) -> bool {
    !marker.is_empty() && weapon.to_lowercase().contains(&marker.to_lowercase())
}

fn log_outcome(event: &KillEvent, result: &Result<OutputArtifact>) {
    match result {
        Ok(artifact) => info!(
            "Created killfeed {} ({}x{}, {} bytes)",
            artifact.file_name, artifact.width, artifact.height, artifact.byte_size
        ),
        Err(e) => error!(
            "Killfeed {} vs {} not generated: {}",
            event.killer_name, event.victim_name, e
        ),
    }
}
