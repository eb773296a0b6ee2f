use std::{
    sync::mpsc::{Receiver, Sender, channel},
    time::{Duration, Instant},
};

use crate::{
    assets::source::SourceImage,
    foundation::error::FramecardResult,
    params::{RenderInputs, debounce::Debouncer},
    style::{
        AspectPreset, AspectRatio, MARGIN_MAX, PADDING_MAX, RADIUS_MAX, SHADOW_MAX,
        StyleParameters, check_background_index, check_range,
    },
};

/// The continuously dragged controls, each debounced on its own timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    CornerRadius,
    Margin,
    Padding,
    ShadowRadius,
}

impl ParamKey {
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::CornerRadius => "corner_radius",
            ParamKey::Margin => "margin",
            ParamKey::Padding => "padding",
            ParamKey::ShadowRadius => "shadow_radius",
        }
    }

    fn max(self) -> f64 {
        match self {
            ParamKey::CornerRadius => RADIUS_MAX,
            ParamKey::Margin => MARGIN_MAX,
            ParamKey::Padding => PADDING_MAX,
            ParamKey::ShadowRadius => SHADOW_MAX,
        }
    }

    fn field(self, params: &mut StyleParameters) -> &mut f64 {
        match self {
            ParamKey::CornerRadius => &mut params.corner_radius,
            ParamKey::Margin => &mut params.margin,
            ParamKey::Padding => &mut params.padding,
            ParamKey::ShadowRadius => &mut params.shadow_radius,
        }
    }
}

/// Owner of the style parameters and the current source image.
///
/// Setters update the raw values immediately. Dragged controls reach the published
/// snapshot only after their debounce settles; discrete selections publish at once.
/// Every change to the published snapshot is sent to all subscribers.
pub struct ParamStore {
    raw: StyleParameters,
    published: StyleParameters,
    source: Option<SourceImage>,
    debouncer: Debouncer<ParamKey, f64>,
    revision: u64,
    subscribers: Vec<Sender<RenderInputs>>,
}

impl ParamStore {
    pub fn new(initial: StyleParameters, debounce: Duration) -> FramecardResult<Self> {
        initial.validate()?;
        Ok(Self {
            raw: initial,
            published: initial,
            source: None,
            debouncer: Debouncer::new(debounce),
            revision: 0,
            subscribers: Vec::new(),
        })
    }

    /// Values as the controls currently show them, including unsettled drags.
    pub fn raw(&self) -> &StyleParameters {
        &self.raw
    }

    /// Values the renderer currently sees.
    pub fn published(&self) -> &StyleParameters {
        &self.published
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> RenderInputs {
        RenderInputs {
            revision: self.revision,
            params: self.published,
            source: self.source.clone(),
        }
    }

    /// Registers an observer of published snapshots.
    pub fn subscribe(&mut self) -> Receiver<RenderInputs> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn set_corner_radius(&mut self, value: f64, now: Instant) -> FramecardResult<()> {
        self.set_debounced(ParamKey::CornerRadius, value, now)
    }

    pub fn set_margin(&mut self, value: f64, now: Instant) -> FramecardResult<()> {
        self.set_debounced(ParamKey::Margin, value, now)
    }

    pub fn set_padding(&mut self, value: f64, now: Instant) -> FramecardResult<()> {
        self.set_debounced(ParamKey::Padding, value, now)
    }

    pub fn set_shadow_radius(&mut self, value: f64, now: Instant) -> FramecardResult<()> {
        self.set_debounced(ParamKey::ShadowRadius, value, now)
    }

    pub fn set_debounced(
        &mut self,
        key: ParamKey,
        value: f64,
        now: Instant,
    ) -> FramecardResult<()> {
        check_range(key.name(), value, key.max())?;
        *key.field(&mut self.raw) = value;
        self.debouncer.push(key, value, now);
        Ok(())
    }

    /// Accepts only the ratio of one of the [`AspectPreset`]s.
    pub fn set_aspect(&mut self, aspect: AspectRatio) -> FramecardResult<()> {
        AspectPreset::from_ratio(aspect)?;
        self.raw.aspect = aspect;
        if self.published.aspect != aspect {
            self.published.aspect = aspect;
            self.publish();
        }
        Ok(())
    }

    pub fn set_aspect_preset(&mut self, preset: AspectPreset) -> FramecardResult<()> {
        self.set_aspect(preset.ratio())
    }

    pub fn set_background_index(&mut self, index: usize) -> FramecardResult<()> {
        check_background_index(index)?;
        self.raw.background_index = index;
        if self.published.background_index != index {
            self.published.background_index = index;
            self.publish();
        }
        Ok(())
    }

    /// Replaces the source image. Always publishes, even for identical pixels.
    pub fn set_source_image(&mut self, image: SourceImage) {
        tracing::debug!(source = image.label(), "source image replaced");
        self.source = Some(image);
        self.publish();
    }

    pub fn clear_source_image(&mut self) {
        if self.source.take().is_some() {
            self.publish();
        }
    }

    /// Applies every debounce that has settled at `now`. Returns whether a snapshot was
    /// published.
    pub fn poll(&mut self, now: Instant) -> bool {
        let settled = self.debouncer.poll(now);
        self.apply_settled(settled)
    }

    /// Applies every pending debounce immediately.
    pub fn flush(&mut self) -> bool {
        let settled = self.debouncer.flush();
        self.apply_settled(settled)
    }

    /// Republishes the current snapshot so the trigger runs another pass.
    pub fn request_redraw(&mut self) {
        self.publish();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.debouncer.is_empty()
    }

    fn apply_settled(&mut self, settled: Vec<(ParamKey, f64)>) -> bool {
        let mut changed = false;
        for (key, value) in settled {
            let field = key.field(&mut self.published);
            if *field != value {
                tracing::debug!(param = key.name(), value, "debounced value settled");
                *field = value;
                changed = true;
            }
        }
        if changed {
            self.publish();
        }
        changed
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        tracing::debug!(
            revision = self.revision,
            subscribers = self.subscribers.len(),
            "render inputs published"
        );
    }
}
