//! Rendering building blocks: layout geometry, vector paint and raster ops

pub mod layout;
pub mod paint;
pub mod raster;

pub use layout::{LabelPlacement, LayoutGeometry, LayoutInputs, Placement, Point, Polygon};
pub use paint::PaintCommand;

/// An encoded image ready to be written or served.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn from_rgba(image: &image::RgbaImage) -> crate::Result<Self> {
        Ok(Self {
            width: image.width(),
            height: image.height(),
            png_data: raster::encode_png(image)?,
        })
    }

    pub fn byte_size(&self) -> u64 {
        self.png_data.len() as u64
    }
}
