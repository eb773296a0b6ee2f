use crate::{assets::source::SourceImage, style::StyleParameters};

pub(crate) mod debounce;
pub(crate) mod store;

pub use debounce::Debouncer;
pub use store::{ParamKey, ParamStore};

/// Snapshot handed to the render trigger whenever a published value changes.
#[derive(Clone, Debug)]
pub struct RenderInputs {
    /// Monotonic publish counter of the store that produced this snapshot.
    pub revision: u64,
    pub params: StyleParameters,
    pub source: Option<SourceImage>,
}
