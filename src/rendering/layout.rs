//! Banner layout: canvas width, seam position and element placement
//!
//! Geometry is computed once in forward coordinates (killer on the left) and
//! mirrored about the banner's center for the reverse orientation, so both
//! orientations share a single set of formulas.

use crate::{Orientation, StyleConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Closed polygon in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Reflect about the vertical line `x = axis / 2`.
    pub fn mirrored(&self, axis: f32) -> Self {
        Self::new(self.points.iter().map(|p| Point::new(axis - p.x, p.y)).collect())
    }

    pub fn translated(&self, dx: f32) -> Self {
        Self::new(self.points.iter().map(|p| Point::new(p.x + dx, p.y)).collect())
    }

    pub fn min_x(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn max_x(&self) -> f32 {
        self.points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Integer placement of a sprite on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Draw the sprite flipped horizontally
    pub mirrored: bool,
}

impl Placement {
    pub fn right(&self) -> i64 {
        self.x + i64::from(self.width)
    }
}

/// Top-left anchor of a text label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub x: i64,
    pub y: i64,
    pub width: f32,
}

/// Measurements the layout depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInputs {
    pub killer_name_width: f32,
    pub victim_name_width: f32,
    pub killer_ink_bottom: f32,
    pub victim_ink_bottom: f32,
    /// Weapon icon size after scaling
    pub weapon_size: (u32, u32),
    /// Whether the weapon identifier carries the mirror marker
    pub weapon_marked: bool,
    /// `None` when the icon is disabled or failed to load
    pub wallbang_size: Option<(u32, u32)>,
    pub headshot_size: Option<(u32, u32)>,
}

/// Per-call geometry of a killfeed banner before extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGeometry {
    pub orientation: Orientation,
    /// Exact sum of element widths
    pub total_width: f32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub headshot_span: u32,
    pub wallbang_span: u32,
    /// x-coordinate of the seam tip, at half height
    pub seam_x: f32,
    pub killer_background: Polygon,
    pub victim_background: Polygon,
    pub killer_icon: Placement,
    pub killer_glow: Placement,
    pub victim_icon: Placement,
    pub victim_glow: Placement,
    pub weapon: Placement,
    pub wallbang: Option<Placement>,
    pub headshot: Option<Placement>,
    pub killer_label: LabelPlacement,
    pub victim_label: LabelPlacement,
}

fn centered(outer: u32, inner: u32) -> i64 {
    (i64::from(outer) - i64::from(inner)) / 2
}

fn text_top(canvas_height: u32, ink_bottom: f32) -> i64 {
    ((canvas_height as f32 - ink_bottom) / 2.0).trunc() as i64
}

impl LayoutGeometry {
    pub fn compute(style: &StyleConfig, orientation: Orientation, inputs: &LayoutInputs) -> Self {
        let [agent_w, agent_h] = style.agent_icon_size;
        let a = agent_w as f32;
        let p = style.padding as f32;
        let h = style.canvas_height;
        let hf = h as f32;
        let (weapon_w, weapon_h) = inputs.weapon_size;
        let span = |size: Option<(u32, u32)>| size.map_or(0, |(w, _)| w + style.modifier_spacing);
        let headshot_span = span(inputs.headshot_size);
        let wallbang_span = span(inputs.wallbang_size);

        let k = inputs.killer_name_width;
        let v = inputs.victim_name_width;

        let total_width = a + p + k + p + weapon_w as f32 + headshot_span as f32 + p
            + wallbang_span as f32 + p + v + p + a;
        let canvas_width = (total_width.floor() as u32).max(1);

        // Everything up to and including the modifiers belongs to the killer.
        let mid = a + p + k + p + weapon_w as f32 + headshot_span as f32 + p + p
            + wallbang_span as f32;

        let killer_background = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(mid - style.seam_point_inset, 0.0),
            Point::new(mid, hf / 2.0),
            Point::new(mid - style.seam_point_inset, hf),
            Point::new(0.0, hf),
        ]);
        let victim_background = Polygon::new(vec![
            Point::new(mid - style.seam_notch_inset, 0.0),
            Point::new(total_width, 0.0),
            Point::new(total_width, hf),
            Point::new(mid - style.seam_notch_inset, hf),
            Point::new(mid, hf / 2.0),
        ]);

        let killer_icon = Placement {
            x: 0,
            y: 0,
            width: agent_w,
            height: agent_h,
            mirrored: false,
        };
        let killer_glow = Placement {
            x: style.glow_offset,
            ..killer_icon
        };
        let victim_x = (total_width - a).floor() as i64;
        let victim_icon = Placement {
            x: victim_x,
            y: 0,
            width: agent_w,
            height: agent_h,
            mirrored: true,
        };
        let victim_glow = Placement {
            x: victim_x - style.glow_offset,
            ..victim_icon
        };

        let weapon_center = a + p + k + p + weapon_w as f32 / 2.0;
        let weapon = Placement {
            x: (weapon_center - weapon_w as f32 / 2.0).floor() as i64,
            y: centered(h, weapon_h),
            width: weapon_w,
            height: weapon_h,
            mirrored: inputs.weapon_marked,
        };
        let gap = i64::from(style.modifier_gap);
        let wallbang = inputs.wallbang_size.map(|(w, ih)| Placement {
            x: weapon.right() + gap,
            y: centered(h, ih),
            width: w,
            height: ih,
            mirrored: false,
        });
        let headshot = inputs.headshot_size.map(|(w, ih)| Placement {
            x: weapon.right() + i64::from(wallbang_span) + gap,
            y: centered(h, ih),
            width: w,
            height: ih,
            mirrored: false,
        });

        let killer_label_x = a + p;
        let victim_label_x = total_width - a - v;

        let forward = Self {
            orientation: Orientation::Forward,
            total_width,
            canvas_width,
            canvas_height: h,
            headshot_span,
            wallbang_span,
            seam_x: mid,
            killer_background,
            victim_background,
            killer_icon,
            killer_glow,
            victim_icon,
            victim_glow,
            weapon,
            wallbang,
            headshot,
            killer_label: LabelPlacement {
                x: killer_label_x.trunc() as i64,
                y: text_top(h, inputs.killer_ink_bottom),
                width: k,
            },
            victim_label: LabelPlacement {
                x: victim_label_x.trunc() as i64,
                y: text_top(h, inputs.victim_ink_bottom),
                width: v,
            },
        };

        match orientation {
            Orientation::Forward => forward,
            Orientation::Reverse => forward.mirror(killer_label_x, victim_label_x),
        }
    }

    fn mirror(self, killer_label_x: f32, victim_label_x: f32) -> Self {
        let total = self.total_width;
        let cw = i64::from(self.canvas_width);
        let flip = |p: Placement| Placement {
            x: cw - p.x - i64::from(p.width),
            mirrored: !p.mirrored,
            ..p
        };
        let shift = |p: Placement| Placement {
            x: cw - p.x - i64::from(p.width),
            ..p
        };
        let label = |l: LabelPlacement, real_x: f32| LabelPlacement {
            x: (total - real_x - l.width).trunc() as i64,
            ..l
        };

        Self {
            orientation: Orientation::Reverse,
            seam_x: total - self.seam_x,
            killer_background: self.killer_background.mirrored(total),
            victim_background: self.victim_background.mirrored(total),
            killer_icon: flip(self.killer_icon),
            killer_glow: flip(self.killer_glow),
            victim_icon: flip(self.victim_icon),
            victim_glow: flip(self.victim_glow),
            weapon: flip(self.weapon),
            wallbang: self.wallbang.map(shift),
            headshot: self.headshot.map(shift),
            killer_label: label(self.killer_label, killer_label_x),
            victim_label: label(self.victim_label, victim_label_x),
            ..self
        }
    }

    /// The tip of the killer's pointed region.
    pub fn seam_tip(&self) -> Point {
        Point::new(self.seam_x, self.canvas_height as f32 / 2.0)
    }
}
