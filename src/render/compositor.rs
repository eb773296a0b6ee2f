use crate::{
    assets::catalog::BackgroundCatalog,
    compile::plan::compile_pass,
    foundation::{core::Canvas, error::FramecardResult},
    geometry::layout::FrameLayout,
    params::RenderInputs,
    render::{CpuBackend, FrameRGBA, PassAssets, RenderBackend},
    settings::PreviewSettings,
    style::canvas_size,
};

/// What a completed pass drew.
#[derive(Clone, Debug)]
pub struct PassReport {
    pub revision: u64,
    pub canvas: Canvas,
    pub background_id: String,
    /// `None` when only the background was drawn.
    pub layout: Option<FrameLayout>,
    pub ops: Vec<&'static str>,
}

/// Produces the preview surface for one snapshot at a time.
///
/// The surface is replaced only when a pass completes, so after a failure it still holds
/// the last good pass.
pub struct Compositor {
    settings: PreviewSettings,
    catalog: BackgroundCatalog,
    backend: Box<dyn RenderBackend>,
    surface: Option<FrameRGBA>,
    passes: u64,
}

impl Compositor {
    pub fn new(settings: PreviewSettings, catalog: BackgroundCatalog) -> Self {
        Self::with_backend(settings, catalog, Box::new(CpuBackend::new()))
    }

    pub fn with_backend(
        settings: PreviewSettings,
        catalog: BackgroundCatalog,
        backend: Box<dyn RenderBackend>,
    ) -> Self {
        Self {
            settings,
            catalog,
            backend,
            surface: None,
            passes: 0,
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &BackgroundCatalog {
        &self.catalog
    }

    /// Result of the last completed pass.
    pub fn surface(&self) -> Option<&FrameRGBA> {
        self.surface.as_ref()
    }

    /// Number of passes that completed.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Decodes the background and source, then redraws the whole surface.
    #[tracing::instrument(level = "debug", skip(self, inputs), fields(revision = inputs.revision))]
    pub fn render_pass(&mut self, inputs: &RenderInputs) -> FramecardResult<PassReport> {
        let params = &inputs.params;
        params.validate()?;

        let background = self.catalog.get(params.background_index)?;
        let background_raster = background.decode()?;
        let source = inputs.source.as_ref().map(|s| s.decode()).transpose()?;

        let canvas = canvas_size(self.settings.host_width, params.aspect)?;
        let plan = compile_pass(
            canvas,
            params,
            source.map(|r| (r.width, r.height)),
            self.settings.shadow_color,
        )?;
        plan.validate_ordering()?;

        let frame = self.backend.render_plan(
            &plan,
            PassAssets {
                background: background_raster,
                source,
            },
        )?;

        self.surface = Some(frame);
        self.passes += 1;
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            ops = plan.ops.len(),
            "pass complete"
        );

        Ok(PassReport {
            revision: inputs.revision,
            canvas,
            background_id: background.id.clone(),
            ops: plan.op_names(),
            layout: plan.layout,
        })
    }
}
