use std::path::Path;

use crate::{
    assets::{Raster, source::SourceImage},
    foundation::error::{FramecardError, FramecardResult},
};

/// Side length of the built-in square gradient backgrounds.
pub const BUILTIN_BACKGROUND_SIZE: u32 = 512;

struct GradientSpec {
    id: &'static str,
    // x1, y1, x2, y2 in objectBoundingBox units
    direction: [f32; 4],
    stops: &'static [(f32, &'static str)],
}

const BUILTIN_GRADIENTS: [GradientSpec; 6] = [
    GradientSpec {
        id: "gradient-1",
        direction: [0.0, 0.0, 1.0, 1.0],
        stops: &[(0.0, "#ff9a9e"), (1.0, "#fad0c4")],
    },
    GradientSpec {
        id: "gradient-2",
        direction: [0.0, 0.0, 1.0, 1.0],
        stops: &[(0.0, "#a18cd1"), (1.0, "#fbc2eb")],
    },
    GradientSpec {
        id: "gradient-3",
        direction: [0.0, 1.0, 1.0, 0.0],
        stops: &[(0.0, "#84fab0"), (1.0, "#8fd3f4")],
    },
    GradientSpec {
        id: "gradient-4",
        direction: [0.0, 0.0, 0.0, 1.0],
        stops: &[(0.0, "#4facfe"), (1.0, "#00f2fe")],
    },
    GradientSpec {
        id: "gradient-5",
        direction: [0.0, 0.0, 1.0, 1.0],
        stops: &[(0.0, "#f6d365"), (0.5, "#fda085"), (1.0, "#f5576c")],
    },
    GradientSpec {
        id: "gradient-6",
        direction: [1.0, 0.0, 0.0, 1.0],
        stops: &[(0.0, "#30cfd0"), (1.0, "#330867")],
    },
];

fn gradient_svg(spec: &GradientSpec) -> String {
    let [x1, y1, x2, y2] = spec.direction;
    let stops: String = spec
        .stops
        .iter()
        .map(|(offset, color)| format!(r#"<stop offset="{offset}" stop-color="{color}"/>"#))
        .collect();
    let s = BUILTIN_BACKGROUND_SIZE;
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}"><defs><linearGradient id="g" x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}">{stops}</linearGradient></defs><rect width="{s}" height="{s}" fill="url(#g)"/></svg>"#
    )
}

/// One selectable background.
#[derive(Clone, Debug)]
pub struct BackgroundAsset {
    pub id: String,
    pub source: SourceImage,
}

impl BackgroundAsset {
    pub fn new(id: impl Into<String>, source: SourceImage) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    pub fn decode(&self) -> FramecardResult<&Raster> {
        self.source.decode()
    }
}

/// Fixed, ordered, index-addressed list of backgrounds.
#[derive(Clone, Debug)]
pub struct BackgroundCatalog {
    entries: Vec<BackgroundAsset>,
}

impl BackgroundCatalog {
    /// The six bundled gradients. Pixels are produced on first use and kept for the life of
    /// the catalog.
    pub fn builtin() -> Self {
        let entries = BUILTIN_GRADIENTS
            .iter()
            .map(|spec| {
                BackgroundAsset::new(
                    spec.id,
                    SourceImage::from_encoded(spec.id, gradient_svg(spec).into_bytes()),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn from_assets(entries: Vec<BackgroundAsset>) -> FramecardResult<Self> {
        if entries.is_empty() {
            return Err(FramecardError::validation(
                "background catalog must not be empty",
            ));
        }
        Ok(Self { entries })
    }

    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> FramecardResult<Self> {
        let entries = paths
            .iter()
            .map(|p| {
                let p = p.as_ref();
                let id = p
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string());
                Ok(BackgroundAsset::new(id, SourceImage::from_path(p)?))
            })
            .collect::<FramecardResult<Vec<_>>>()?;
        Self::from_assets(entries)
    }

    pub fn get(&self, index: usize) -> FramecardResult<&BackgroundAsset> {
        self.entries.get(index).ok_or_else(|| {
            FramecardError::validation(format!(
                "background index {index} out of range (0..{})",
                self.entries.len()
            ))
        })
    }

    /// Decodes every entry up front.
    pub fn preload(&self) -> FramecardResult<()> {
        for entry in &self.entries {
            entry.decode()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackgroundAsset> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::BACKGROUND_COUNT;

    #[test]
    fn builtin_catalog_has_one_entry_per_selector_slot() {
        let cat = BackgroundCatalog::builtin();
        assert_eq!(cat.len(), BACKGROUND_COUNT);
        let ids: Vec<_> = cat.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids[0], "gradient-1");
        assert_eq!(ids[5], "gradient-6");
    }

    #[test]
    fn builtin_backgrounds_are_square_and_opaque() {
        let cat = BackgroundCatalog::builtin();
        let bg = cat.get(3).unwrap().decode().unwrap();
        assert_eq!(bg.width, BUILTIN_BACKGROUND_SIZE);
        assert_eq!(bg.height, BUILTIN_BACKGROUND_SIZE);
        assert!(bg.rgba8_premul.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn builtin_gradients_differ_from_each_other() {
        let cat = BackgroundCatalog::builtin();
        cat.preload().unwrap();
        let first = |i: usize| cat.get(i).unwrap().decode().unwrap().rgba8_premul[0..4].to_vec();
        assert_ne!(first(0), first(3));
    }

    #[test]
    fn out_of_range_index_is_a_validation_error() {
        let cat = BackgroundCatalog::builtin();
        assert!(matches!(cat.get(6), Err(FramecardError::Validation(_))));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(BackgroundCatalog::from_assets(vec![]).is_err());
    }
}
