//! Framecard renders a screenshot as a styled card: the image is aspect-fitted into a
//! rounded, shadowed white frame and composited over a decorative background.
//!
//! The live-preview pipeline is:
//!
//! - a [`ParamStore`] holding the style controls, debouncing dragged values
//! - a [`RenderTrigger`] serialising and coalescing redraws
//! - a [`Compositor`] drawing each pass with the CPU backend
//!
//! [`PreviewSession`] wires the three together and exports the settled surface as PNG.
#![forbid(unsafe_code)]

mod assets;
mod compile;
mod export;
mod foundation;
mod geometry;
mod params;
mod render;
mod session;
mod settings;
mod style;
mod trigger;

pub use crate::assets::{
    Raster,
    catalog::{BUILTIN_BACKGROUND_SIZE, BackgroundAsset, BackgroundCatalog},
    decode::{decode_asset, decode_image},
    source::SourceImage,
};
pub use crate::compile::plan::{DrawOp, FRAME_FILL, RenderPlan, compile_image_ops, compile_pass};
pub use crate::export::{
    DEFAULT_EXPORT_NAME, encode_png, straight_rgba8, write_encoded, write_png,
};
pub use crate::foundation::core::{Affine, BezPath, Canvas, PathEl, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{FramecardError, FramecardResult};
pub use crate::geometry::{
    fit::{AspectFit, aspect_fit},
    layout::FrameLayout,
    path::{effective_corner_radius, path_bounds, rounded_rect_path},
};
pub use crate::params::{Debouncer, ParamKey, ParamStore, RenderInputs};
pub use crate::render::{
    Compositor, CpuBackend, DrawBackend, FrameRGBA, PassAssets, PassReport, RenderBackend,
    execute_plan,
};
pub use crate::session::{PreviewSession, TickSummary};
pub use crate::settings::{DEFAULT_DEBOUNCE, DEFAULT_HOST_WIDTH, PreviewSettings};
pub use crate::style::{
    AspectPreset, AspectRatio, BACKGROUND_COUNT, MARGIN_MAX, PADDING_MAX, RADIUS_MAX,
    SHADOW_MAX, StyleParameters, canvas_size,
};
pub use crate::trigger::RenderTrigger;
