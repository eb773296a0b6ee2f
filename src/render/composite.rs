use crate::foundation::{
    error::{FramecardError, FramecardResult},
    math::mul_div255_u8,
};

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over for one pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - sa;
    let mut out = [0u8; 4];
    out[3] = src[3].saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for c in 0..3 {
        out[c] = src[c].saturating_add(mul_div255_u8(u16::from(dst[c]), inv));
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> FramecardResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FramecardError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Alpha channel of a premultiplied RGBA8 buffer, one byte per pixel.
pub fn alpha_mask(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).map(|px| px[3]).collect()
}

/// Multiplies `outer` into `mask`, giving the intersection of two coverage masks.
pub fn intersect_mask_in_place(mask: &mut [u8], outer: &[u8]) -> FramecardResult<()> {
    if mask.len() != outer.len() {
        return Err(FramecardError::render(
            "intersect_mask_in_place expects equal-length masks",
        ));
    }
    for (m, o) in mask.iter_mut().zip(outer) {
        *m = mul_div255_u8(u16::from(*m), u16::from(*o));
    }
    Ok(())
}

/// Scales every pixel of a premultiplied layer by the mask coverage at that pixel.
pub fn apply_mask_in_place(rgba: &mut [u8], mask: &[u8]) -> FramecardResult<()> {
    if rgba.len() != mask.len() * 4 {
        return Err(FramecardError::render(
            "apply_mask_in_place expects one mask byte per pixel",
        ));
    }
    for (px, &m) in rgba.chunks_exact_mut(4).zip(mask) {
        if m == 255 {
            continue;
        }
        let w = u16::from(m);
        for c in px.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_half_alpha_blends() {
        let out = over([0, 0, 255, 255], [128, 0, 0, 128]);
        assert_eq!(out[3], 255);
        assert_eq!(out[0], 128);
        assert_eq!(out[2], mul_div255_u8(255, 127));
    }

    #[test]
    fn mask_application_scales_all_channels() {
        let mut px = vec![200u8, 100, 50, 255, 200, 100, 50, 255];
        apply_mask_in_place(&mut px, &[0, 255]).unwrap();
        assert_eq!(&px[0..4], &[0, 0, 0, 0]);
        assert_eq!(&px[4..8], &[200, 100, 50, 255]);
        assert!(apply_mask_in_place(&mut px, &[0]).is_err());
    }

    #[test]
    fn masks_intersect_multiplicatively() {
        let mut a = vec![255u8, 255, 0, 128];
        intersect_mask_in_place(&mut a, &[255, 0, 255, 255]).unwrap();
        assert_eq!(a, vec![255, 0, 0, 128]);
        assert_eq!(alpha_mask(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![4, 8]);
    }
}
