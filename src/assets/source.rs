use std::{
    fmt,
    path::Path,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{
    assets::{Raster, decode::decode_asset},
    foundation::error::{FramecardError, FramecardResult},
};

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to an image supplied by a picker, a share payload, or the background catalog.
///
/// Clones share the same pixels and decode cache. Every constructor call mints a new
/// identity, so replacing an image with identical bytes still counts as a change.
#[derive(Clone)]
pub struct SourceImage {
    inner: Arc<SourceInner>,
}

struct SourceInner {
    id: u64,
    label: String,
    encoded: Option<Arc<[u8]>>,
    decoded: OnceLock<Raster>,
}

impl SourceImage {
    /// Encoded bytes, decoded on first use.
    pub fn from_encoded(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(label.into(), Some(bytes.into()), OnceLock::new())
    }

    pub fn from_path(path: impl AsRef<Path>) -> FramecardResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            FramecardError::asset_load(format!("failed to read image '{}': {e}", path.display()))
        })?;
        Ok(Self::from_encoded(path.display().to_string(), bytes))
    }

    pub fn from_raster(label: impl Into<String>, raster: Raster) -> Self {
        let decoded = OnceLock::new();
        let _ = decoded.set(raster);
        Self::new(label.into(), None, decoded)
    }

    fn new(label: String, encoded: Option<Arc<[u8]>>, decoded: OnceLock<Raster>) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
                label,
                encoded,
                decoded,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn is_decoded(&self) -> bool {
        self.inner.decoded.get().is_some()
    }

    /// Decoded pixels; decodes on first call. A failed decode is not cached, so a later
    /// pass retries it.
    pub fn decode(&self) -> FramecardResult<&Raster> {
        if let Some(raster) = self.inner.decoded.get() {
            return Ok(raster);
        }
        let bytes = self.inner.encoded.as_deref().ok_or_else(|| {
            FramecardError::asset_load(format!("image '{}' has no pixel data", self.label()))
        })?;
        let raster = decode_asset(bytes).map_err(|e| match e {
            FramecardError::AssetLoad(msg) => {
                FramecardError::asset_load(format!("'{}': {msg}", self.inner.label))
            }
            other => other,
        })?;
        tracing::debug!(
            label = %self.inner.label,
            width = raster.width,
            height = raster.height,
            "decoded image"
        );
        Ok(self.inner.decoded.get_or_init(|| raster))
    }
}

impl PartialEq for SourceImage {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for SourceImage {}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("decoded", &self.is_decoded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn encoded_source_decodes_once_and_caches() {
        let src = SourceImage::from_encoded("shot.png", png_bytes(3, 2));
        assert!(!src.is_decoded());
        let r = src.decode().unwrap();
        assert_eq!((r.width, r.height), (3, 2));
        assert!(src.is_decoded());

        let clone = src.clone();
        assert!(clone.is_decoded());
        assert_eq!(clone, src);
    }

    #[test]
    fn each_handle_has_a_new_identity() {
        let bytes = png_bytes(1, 1);
        let a = SourceImage::from_encoded("a", bytes.clone());
        let b = SourceImage::from_encoded("a", bytes);
        assert_ne!(a, b);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn decode_failure_is_reported_and_not_cached() {
        let src = SourceImage::from_encoded("broken.png", b"nope".to_vec());
        let err = src.decode().unwrap_err();
        assert!(matches!(err, FramecardError::AssetLoad(_)));
        assert!(err.to_string().contains("broken.png"));
        assert!(!src.is_decoded());
        assert!(src.decode().is_err());
    }

    #[test]
    fn missing_file_is_an_asset_load_failure() {
        let err = SourceImage::from_path("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, FramecardError::AssetLoad(_)));
    }

    #[test]
    fn raster_source_is_already_decoded() {
        let r = Raster::solid(2, 2, [0, 0, 0, 255]).unwrap();
        let src = SourceImage::from_raster("solid", r.clone());
        assert!(src.is_decoded());
        assert_eq!(src.decode().unwrap(), &r);
    }
}
