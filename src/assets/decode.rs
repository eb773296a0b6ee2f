use std::sync::Arc;

use crate::{
    assets::{Raster, svg_raster::rasterize_svg_to_premul_rgba8},
    foundation::error::{FramecardError, FramecardResult},
};

/// Decodes any supported encoded image (PNG/JPEG/... via `image`, or SVG) into a raster.
pub fn decode_asset(bytes: &[u8]) -> FramecardResult<Raster> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        return rasterize_svg(&tree);
    }
    decode_image(bytes)
}

pub fn decode_image(bytes: &[u8]) -> FramecardResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FramecardError::asset_load(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Raster::from_rgba8(width, height, rgba.into_raw())
}

pub fn parse_svg(bytes: &[u8]) -> FramecardResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FramecardError::asset_load(format!("parse svg tree: {e}")))?;
    Ok(Arc::new(tree))
}

/// Rasterises an SVG at its intrinsic size.
pub fn rasterize_svg(tree: &usvg::Tree) -> FramecardResult<Raster> {
    let size = tree.size();
    let to_px = |v: f32| -> FramecardResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(FramecardError::asset_load("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    };
    let (w, h) = (to_px(size.width())?, to_px(size.height())?);
    let premul = rasterize_svg_to_premul_rgba8(tree, w, h)?;
    Raster::from_premul_rgba8(w, h, premul)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = match std::str::from_utf8(head) {
        Ok(t) => t,
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default(),
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}
