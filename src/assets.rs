use std::sync::Arc;

use crate::foundation::error::{FramecardError, FramecardResult};

pub(crate) mod catalog;
pub(crate) mod decode;
pub(crate) mod source;
pub(crate) mod svg_raster;

/// A decoded image ready to be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Raster {
    pub fn from_premul_rgba8(
        width: u32,
        height: u32,
        rgba8_premul: Vec<u8>,
    ) -> FramecardResult<Self> {
        if width == 0 || height == 0 {
            return Err(FramecardError::invalid_dimensions(format!(
                "raster must be non-empty, got {width}x{height}"
            )));
        }
        if rgba8_premul.len() != (width as usize) * (height as usize) * 4 {
            return Err(FramecardError::validation(
                "raster byte length must equal width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Builds a raster from straight (non-premultiplied) RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> FramecardResult<Self> {
        crate::foundation::math::premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, rgba8)
    }

    /// A single-colour raster, mostly useful for tests and placeholder backgrounds.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FramecardResult<Self> {
        let px = (width as usize) * (height as usize);
        Self::from_rgba8(width, height, rgba.repeat(px))
    }
}
