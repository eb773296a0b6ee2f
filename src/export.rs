use std::{io::Cursor, path::Path};

use anyhow::Context as _;

use crate::{
    foundation::{
        error::{FramecardError, FramecardResult},
        math::unpremultiply_rgba8_in_place,
    },
    render::FrameRGBA,
};

/// File name used when the caller does not pick one.
pub const DEFAULT_EXPORT_NAME: &str = "screenshot.png";

/// Straight-alpha RGBA8 copy of `frame`.
pub fn straight_rgba8(frame: &FrameRGBA) -> FramecardResult<Vec<u8>> {
    let expected = (frame.width as usize) * (frame.height as usize) * 4;
    if frame.data.len() != expected {
        return Err(FramecardError::render(format!(
            "frame data is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    Ok(data)
}

/// Encodes `frame` as a PNG.
pub fn encode_png(frame: &FrameRGBA) -> FramecardResult<Vec<u8>> {
    let data = straight_rgba8(frame)?;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| FramecardError::render("frame does not form an rgba image"))?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Writes `frame` as a PNG at `path`, creating missing parent directories.
pub fn write_png(path: impl AsRef<Path>, frame: &FrameRGBA) -> FramecardResult<()> {
    write_encoded(path, &encode_png(frame)?)
}

/// Writes already encoded bytes at `path`, creating missing parent directories.
pub fn write_encoded(path: impl AsRef<Path>, bytes: &[u8]) -> FramecardResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(data: Vec<u8>, premultiplied: bool) -> FrameRGBA {
        FrameRGBA {
            width: 2,
            height: 1,
            data,
            premultiplied,
        }
    }

    #[test]
    fn png_decodes_back_to_straight_pixels() {
        let f = frame(vec![128, 0, 0, 128, 0, 0, 255, 255], true);
        let png = encode_png(&f).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (2, 1));
        assert_eq!(back.get_pixel(0, 0).0, [255, 0, 0, 128]);
        assert_eq!(back.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn straight_frames_are_left_alone() {
        let f = frame(vec![200, 100, 50, 100, 1, 2, 3, 4], false);
        assert_eq!(straight_rgba8(&f).unwrap(), f.data);
    }

    #[test]
    fn short_frame_is_rejected() {
        assert!(matches!(
            encode_png(&frame(vec![0; 4], true)),
            Err(FramecardError::Render(_))
        ));
    }

    #[test]
    fn write_png_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("framecard-export-{}", std::process::id()));
        let path = dir.join("nested").join(DEFAULT_EXPORT_NAME);
        write_png(&path, &frame(vec![0, 0, 0, 255, 255, 255, 255, 255], true)).unwrap();
        assert!(path.is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_encoded_stores_bytes_verbatim() {
        let dir = std::env::temp_dir().join(format!("framecard-bytes-{}", std::process::id()));
        let path = dir.join("a").join("b").join("card.png");
        let png = encode_png(&frame(vec![10, 20, 30, 255, 0, 0, 0, 0], true)).unwrap();
        write_encoded(&path, &png).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), png);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
