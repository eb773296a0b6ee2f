use crate::foundation::error::{FramecardError, FramecardResult};

/// One box filter: each sample averages `left` neighbours before it, itself, and `right`
/// neighbours after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BoxPass {
    pub left: usize,
    pub right: usize,
}

impl BoxPass {
    fn width(self) -> u32 {
        (self.left + self.right + 1) as u32
    }
}

/// Three box passes approximating the Gaussian of a canvas `shadowBlur` value.
///
/// The Gaussian has standard deviation `blur / 2`. Box width is
/// `d = floor(sigma * 3 * sqrt(2 * pi) / 4 + 0.5)`: an odd `d` gives three centred boxes,
/// an even `d` two boxes of `d` skewed in opposite directions plus a centred box of `d + 1`.
/// `None` when the blur leaves the shape unchanged.
pub(crate) fn shadow_boxes(blur: f64) -> Option<[BoxPass; 3]> {
    if !blur.is_finite() || blur <= 0.0 {
        return None;
    }
    let sigma = blur / 2.0;
    let d = (sigma * 3.0 * std::f64::consts::TAU.sqrt() / 4.0 + 0.5).floor() as usize;
    if d <= 1 {
        return None;
    }
    let h = d / 2;
    let centred = BoxPass { left: h, right: h };
    Some(if d % 2 == 1 {
        [centred; 3]
    } else {
        [
            BoxPass {
                left: h,
                right: h - 1,
            },
            BoxPass {
                left: h - 1,
                right: h,
            },
            centred,
        ]
    })
}

/// Farthest distance, in pixels, the passes move coverage away from the shape.
pub(crate) fn shadow_reach(boxes: &[BoxPass]) -> usize {
    let left: usize = boxes.iter().map(|b| b.left).sum();
    let right: usize = boxes.iter().map(|b| b.right).sum();
    left.max(right)
}

/// Blurs a row-major coverage plane in place. Samples past the plane count as zero.
pub(crate) fn blur_coverage(
    coverage: &mut [u8],
    width: usize,
    height: usize,
    boxes: &[BoxPass],
) -> FramecardResult<()> {
    if coverage.len() != width * height {
        return Err(FramecardError::render(format!(
            "coverage plane is {} bytes, expected {width}x{height}",
            coverage.len()
        )));
    }
    if width == 0 || height == 0 || boxes.is_empty() {
        return Ok(());
    }

    let mut line = Vec::with_capacity(width.max(height));
    let mut scratch = Vec::with_capacity(width.max(height));
    let mut prefix = Vec::with_capacity(width.max(height) + 1);

    for row in coverage.chunks_exact_mut(width) {
        line.clear();
        line.extend_from_slice(row);
        for &b in boxes {
            box_line(&line, &mut scratch, &mut prefix, b);
            std::mem::swap(&mut line, &mut scratch);
        }
        row.copy_from_slice(&line);
    }

    for x in 0..width {
        line.clear();
        line.extend((0..height).map(|y| coverage[y * width + x]));
        for &b in boxes {
            box_line(&line, &mut scratch, &mut prefix, b);
            std::mem::swap(&mut line, &mut scratch);
        }
        for (y, &v) in line.iter().enumerate() {
            coverage[y * width + x] = v;
        }
    }
    Ok(())
}

// Running sums keep each pass linear in the line length whatever the box width.
fn box_line(src: &[u8], dst: &mut Vec<u8>, prefix: &mut Vec<u32>, b: BoxPass) {
    prefix.clear();
    prefix.push(0);
    let mut acc = 0u32;
    for &v in src {
        acc += u32::from(v);
        prefix.push(acc);
    }

    let n = src.len();
    let w = b.width();
    dst.clear();
    dst.extend((0..n).map(|x| {
        let lo = x.saturating_sub(b.left);
        let hi = (x + b.right + 1).min(n);
        ((prefix[hi] - prefix[lo] + w / 2) / w) as u8
    }));
}
