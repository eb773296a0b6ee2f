use std::time::Instant;

use crate::{
    assets::catalog::BackgroundCatalog,
    export::encode_png,
    foundation::error::{FramecardError, FramecardResult},
    params::ParamStore,
    render::{Compositor, FrameRGBA, PassReport},
    settings::PreviewSettings,
    style::StyleParameters,
    trigger::RenderTrigger,
};

/// Passes run by one [`PreviewSession::tick`] or [`PreviewSession::settle`].
#[derive(Clone, Debug, Default)]
pub struct TickSummary {
    pub completed: Vec<PassReport>,
    pub failed: usize,
}

impl TickSummary {
    pub fn passes(&self) -> usize {
        self.completed.len() + self.failed
    }
}

/// Parameter store, render trigger and compositor wired together.
pub struct PreviewSession {
    store: ParamStore,
    trigger: RenderTrigger,
    compositor: Compositor,
    stale: bool,
}

impl PreviewSession {
    /// Builds the pipeline and queues the first pass.
    pub fn new(
        settings: PreviewSettings,
        catalog: BackgroundCatalog,
        params: StyleParameters,
    ) -> FramecardResult<Self> {
        Self::with_compositor(params, Compositor::new(settings, catalog))
    }

    pub fn with_compositor(
        params: StyleParameters,
        compositor: Compositor,
    ) -> FramecardResult<Self> {
        let mut store = ParamStore::new(params, compositor.settings().debounce)?;
        let trigger = RenderTrigger::new(store.subscribe());
        store.request_redraw();
        Ok(Self {
            store,
            trigger,
            compositor,
            stale: false,
        })
    }

    pub fn store(&self) -> &ParamStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParamStore {
        &mut self.store
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn trigger(&self) -> &RenderTrigger {
        &self.trigger
    }

    /// Last good surface.
    pub fn surface(&self) -> Option<&FrameRGBA> {
        self.compositor.surface()
    }

    /// Whether the most recent pass failed, leaving an older surface in place.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Publishes debounces settled at `now` and renders until the trigger is idle.
    pub fn tick(&mut self, now: Instant) -> FramecardResult<TickSummary> {
        self.store.poll(now);
        self.run_until_idle()
    }

    /// Flushes every pending debounce and renders until the trigger is idle.
    pub fn settle(&mut self) -> FramecardResult<TickSummary> {
        self.store.flush();
        self.run_until_idle()
    }

    /// Settles, then encodes the surface as PNG.
    pub fn export_png(&mut self) -> FramecardResult<Vec<u8>> {
        self.settle()?;
        if self.stale {
            return Err(FramecardError::render(
                "latest pass failed; refusing to export a stale surface",
            ));
        }
        let surface = self
            .compositor
            .surface()
            .ok_or_else(|| FramecardError::render("no surface has been rendered"))?;
        encode_png(surface)
    }

    fn run_until_idle(&mut self) -> FramecardResult<TickSummary> {
        let mut summary = TickSummary::default();
        while let Some(inputs) = self.trigger.next_pass() {
            match self.compositor.render_pass(&inputs) {
                Ok(report) => {
                    self.stale = false;
                    summary.completed.push(report);
                }
                Err(err) => {
                    tracing::warn!(
                        revision = inputs.revision,
                        retryable = err.is_retryable(),
                        "render pass failed, keeping last surface: {err}"
                    );
                    self.stale = true;
                    summary.failed += 1;
                }
            }
            self.trigger.finish_pass(inputs.revision)?;
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::assets::{Raster, catalog::BackgroundAsset, source::SourceImage};

    fn catalog() -> BackgroundCatalog {
        let entries = (0..6u8)
            .map(|i| {
                let raster = Raster::solid(4, 4, [i * 40, 0, 0, 255]).unwrap();
                BackgroundAsset::new(format!("bg-{i}"), SourceImage::from_raster("bg", raster))
            })
            .collect();
        BackgroundCatalog::from_assets(entries).unwrap()
    }

    fn session() -> PreviewSession {
        let settings = PreviewSettings {
            host_width: 32,
            ..PreviewSettings::default()
        };
        PreviewSession::new(settings, catalog(), StyleParameters::default()).unwrap()
    }

    #[test]
    fn first_tick_renders_the_initial_snapshot() {
        let mut s = session();
        assert!(s.surface().is_none());
        let summary = s.tick(Instant::now()).unwrap();
        assert_eq!(summary.passes(), 1);
        assert_eq!(summary.completed[0].ops, ["background"]);
        assert!(s.surface().is_some());
    }

    #[test]
    fn unsettled_drag_does_not_render() {
        let t0 = Instant::now();
        let mut s = session();
        s.tick(t0).unwrap();

        s.store_mut().set_margin(5.0, t0).unwrap();
        assert_eq!(s.tick(t0 + Duration::from_millis(100)).unwrap().passes(), 0);
        assert_eq!(s.tick(t0 + Duration::from_millis(150)).unwrap().passes(), 1);
        assert_eq!(s.compositor().passes(), 2);
    }

    #[test]
    fn failed_pass_marks_session_stale_until_next_success() {
        let mut s = session();
        s.settle().unwrap();

        let broken = SourceImage::from_encoded("broken", b"garbage".to_vec());
        s.store_mut().set_source_image(broken);
        let summary = s.settle().unwrap();
        assert_eq!(summary.failed, 1);
        assert!(s.is_stale());
        assert!(s.surface().is_some());
        assert!(s.export_png().is_err());

        s.store_mut().clear_source_image();
        s.settle().unwrap();
        assert!(!s.is_stale());
        assert!(s.export_png().is_ok());
    }

    #[test]
    fn export_settles_pending_drags_first() {
        let t0 = Instant::now();
        let mut s = session();
        let src = SourceImage::from_raster("shot", Raster::solid(8, 4, [0, 0, 0, 255]).unwrap());
        s.store_mut().set_source_image(src);
        s.store_mut().set_padding(4.0, t0).unwrap();

        let png = s.export_png().unwrap();
        assert!(!png.is_empty());
        assert_eq!(s.store().published().padding, 4.0);
        assert!(s.trigger.is_idle());
    }
}
