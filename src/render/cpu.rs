use std::sync::Arc;

use image::imageops::FilterType;

use crate::{
    assets::Raster,
    foundation::{
        core::{Affine, BezPath, Canvas, PathEl, Rect, Rgba8Premul},
        error::{FramecardError, FramecardResult},
        math::{mul_div255_u8, unpremultiply_rgba8_in_place},
    },
    geometry::path::path_bounds,
    render::{
        FrameRGBA,
        blur::{blur_coverage, shadow_boxes, shadow_reach},
        composite::{alpha_mask, apply_mask_in_place, intersect_mask_in_place, over_in_place},
        passes::DrawBackend,
    },
};

const IMAGE_CACHE_CAPACITY: usize = 8;

/// [`DrawBackend`] rasterising with `vello_cpu`.
///
/// Each op renders into a scratch layer that is then composited (premultiplied source-over)
/// onto the working surface. An active clip is an alpha mask multiplied into every layer
/// before compositing.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    surface: Option<vello_cpu::Pixmap>,
    layer: Option<vello_cpu::Pixmap>,
    clips: Vec<Vec<u8>>,
    image_cache: Vec<CachedImage>,
}

struct CachedImage {
    bytes: Arc<Vec<u8>>,
    size: (u32, u32),
    paint: vello_cpu::Image,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            ctx: None,
            surface: None,
            layer: None,
            clips: Vec::new(),
            image_cache: Vec::new(),
        }
    }

    fn surface_dims(&self) -> FramecardResult<(u16, u16)> {
        let s = self
            .surface
            .as_ref()
            .ok_or_else(|| FramecardError::render("draw before begin_pass"))?;
        Ok((s.width(), s.height()))
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> FramecardResult<R>,
    ) -> FramecardResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    /// Renders `draw` into a cleared scratch layer the size of the surface.
    fn render_layer(
        &mut self,
        draw: impl FnOnce(&mut vello_cpu::RenderContext) -> FramecardResult<()>,
    ) -> FramecardResult<vello_cpu::Pixmap> {
        let (w, h) = self.surface_dims()?;
        let mut layer = match self.layer.take() {
            Some(p) if p.width() == w && p.height() == h => p,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        clear_pixmap_to_transparent(&mut layer);

        self.with_ctx_mut(w, h, |_, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            draw(ctx)?;
            ctx.flush();
            ctx.render_to_pixmap(&mut layer);
            Ok(())
        })?;
        Ok(layer)
    }

    fn composite_layer(&mut self, mut layer: vello_cpu::Pixmap) -> FramecardResult<()> {
        if let Some(mask) = self.clips.last() {
            apply_mask_in_place(layer.data_as_u8_slice_mut(), mask)?;
        }
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| FramecardError::render("draw before begin_pass"))?;
        over_in_place(surface.data_as_u8_slice_mut(), layer.data_as_u8_slice())?;
        self.layer = Some(layer);
        Ok(())
    }

    fn path_layer(
        &mut self,
        path: &BezPath,
        color: Rgba8Premul,
    ) -> FramecardResult<vello_cpu::Pixmap> {
        let cpu_path = bezpath_to_cpu(path);
        let paint = color_to_cpu(color);
        self.render_layer(|ctx| {
            ctx.set_paint(paint);
            ctx.fill_path(&cpu_path);
            Ok(())
        })
    }

    fn draw_raster(&mut self, dest: Rect, raster: &Raster) -> FramecardResult<()> {
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }
        let (sw, sh) = sample_size(raster, dest);
        let paint = self.image_paint_for(raster, sw, sh)?;
        let (w, h) = (f64::from(sw), f64::from(sh));
        let transform = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / w, dest.height() / h);

        let layer = self.render_layer(|ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            Ok(())
        })?;
        self.composite_layer(layer)
    }

    /// Image paint for `raster` sampled at `width` x `height`.
    fn image_paint_for(
        &mut self,
        raster: &Raster,
        width: u32,
        height: u32,
    ) -> FramecardResult<vello_cpu::Image> {
        if let Some(hit) = self.image_cache.iter().find(|c| {
            Arc::ptr_eq(&c.bytes, &raster.rgba8_premul) && c.size == (width, height)
        }) {
            return Ok(hit.paint.clone());
        }

        let pixmap = if (width, height) == (raster.width, raster.height) {
            pixmap_from_premul_bytes(&raster.rgba8_premul, width, height)?
        } else {
            tracing::debug!(
                from_width = raster.width,
                from_height = raster.height,
                width,
                height,
                "resampling raster"
            );
            pixmap_from_premul_bytes(&resample_premul(raster, width, height)?, width, height)?
        };
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        if self.image_cache.len() >= IMAGE_CACHE_CAPACITY {
            self.image_cache.remove(0);
        }
        self.image_cache.push(CachedImage {
            bytes: raster.rgba8_premul.clone(),
            size: (width, height),
            paint: paint.clone(),
        });
        Ok(paint)
    }
}

impl DrawBackend for CpuBackend {
    fn begin_pass(&mut self, canvas: Canvas) -> FramecardResult<()> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| FramecardError::render("surface width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| FramecardError::render("surface height exceeds u16"))?;

        let mut surface = match self.surface.take() {
            Some(p) if p.width() == w && p.height() == h => p,
            _ => vello_cpu::Pixmap::new(w, h),
        };
        clear_pixmap_to_transparent(&mut surface);
        self.surface = Some(surface);
        self.clips.clear();
        Ok(())
    }

    fn draw_background(&mut self, dest: Rect, background: &Raster) -> FramecardResult<()> {
        self.draw_raster(dest, background)
    }

    fn draw_shadow(
        &mut self,
        path: &BezPath,
        blur_radius: f64,
        color: Rgba8Premul,
    ) -> FramecardResult<()> {
        let Some(boxes) = shadow_boxes(blur_radius) else {
            return self.fill_path(path, color);
        };
        let mut layer = self.path_layer(path, Rgba8Premul::WHITE)?;
        let (w, h) = (usize::from(layer.width()), usize::from(layer.height()));

        // Only the shape's bounds grown by the blur reach can end up non-zero.
        let reach = shadow_reach(&boxes) as f64;
        let bounds = path_bounds(path);
        let x0 = (bounds.x0.floor() - reach).clamp(0.0, w as f64) as usize;
        let y0 = (bounds.y0.floor() - reach).clamp(0.0, h as f64) as usize;
        let x1 = (bounds.x1.ceil() + reach).clamp(0.0, w as f64) as usize;
        let y1 = (bounds.y1.ceil() + reach).clamp(0.0, h as f64) as usize;
        if x0 >= x1 || y0 >= y1 {
            self.layer = Some(layer);
            return Ok(());
        }
        let (rw, rh) = (x1 - x0, y1 - y0);

        let data = layer.data_as_u8_slice_mut();
        let mut coverage = Vec::with_capacity(rw * rh);
        for y in y0..y1 {
            let row = &data[(y * w + x0) * 4..(y * w + x1) * 4];
            coverage.extend(row.chunks_exact(4).map(|px| px[3]));
        }
        blur_coverage(&mut coverage, rw, rh, &boxes)?;

        let rgba = color.to_array();
        for (y, cov_row) in (y0..y1).zip(coverage.chunks_exact(rw)) {
            let row = &mut data[(y * w + x0) * 4..(y * w + x1) * 4];
            for (px, &a) in row.chunks_exact_mut(4).zip(cov_row) {
                for (dst, &c) in px.iter_mut().zip(&rgba) {
                    *dst = mul_div255_u8(u16::from(c), u16::from(a));
                }
            }
        }
        self.composite_layer(layer)
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba8Premul) -> FramecardResult<()> {
        let layer = self.path_layer(path, color)?;
        self.composite_layer(layer)
    }

    fn push_clip(&mut self, path: &BezPath) -> FramecardResult<()> {
        let layer = self.path_layer(path, Rgba8Premul::WHITE)?;
        let mut mask = alpha_mask(layer.data_as_u8_slice());
        if let Some(outer) = self.clips.last() {
            intersect_mask_in_place(&mut mask, outer)?;
        }
        self.clips.push(mask);
        self.layer = Some(layer);
        Ok(())
    }

    fn draw_image(&mut self, dest: Rect, image: &Raster) -> FramecardResult<()> {
        self.draw_raster(dest, image)
    }

    fn pop_clip(&mut self) -> FramecardResult<()> {
        self.clips
            .pop()
            .map(|_| ())
            .ok_or_else(|| FramecardError::render("pop_clip without push_clip"))
    }

    fn finish_pass(&mut self) -> FramecardResult<FrameRGBA> {
        if !self.clips.is_empty() {
            return Err(FramecardError::render("clip still active at finish_pass"));
        }
        let s = self
            .surface
            .as_ref()
            .ok_or_else(|| FramecardError::render("finish_pass before begin_pass"))?;
        Ok(FrameRGBA {
            width: u32::from(s.width()),
            height: u32::from(s.height()),
            data: s.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn color_to_cpu(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let mut px = c.to_array();
    unpremultiply_rgba8_in_place(&mut px);
    vello_cpu::peniko::Color::from_rgba8(px[0], px[1], px[2], px[3])
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Pixel size `raster` is sampled at when drawn into `dest`.
///
/// Rasters too large for a pixmap, or minified more than twofold, are resampled to the
/// destination size.
fn sample_size(raster: &Raster, dest: Rect) -> (u32, u32) {
    let max = u32::from(u16::MAX);
    let target = |v: f64| (v.ceil() as u32).clamp(1, max);
    let (tw, th) = (target(dest.width()), target(dest.height()));
    let oversized = raster.width > max || raster.height > max;
    let minified = raster.width > tw * 2 || raster.height > th * 2;
    if oversized || minified {
        (tw, th)
    } else {
        (raster.width, raster.height)
    }
}

// Filtering premultiplied samples keeps transparent edges from bleeding colour.
fn resample_premul(raster: &Raster, width: u32, height: u32) -> FramecardResult<Vec<u8>> {
    let src = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
        raster.width,
        raster.height,
        raster.rgba8_premul.as_slice(),
    )
    .ok_or_else(|| FramecardError::render("raster does not form an rgba image"))?;
    let resized = image::imageops::resize(&src, width, height, FilterType::Triangle);
    Ok(resized.into_raw())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FramecardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FramecardError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FramecardError::render("image height exceeds u16"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(FramecardError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}
