use std::time::{Duration, Instant};

use framecard::{
    AspectPreset, BackgroundAsset, BackgroundCatalog, Compositor, ParamStore, PreviewSession,
    PreviewSettings, Raster, RenderTrigger, SourceImage, StyleParameters,
};

const QUIET: Duration = Duration::from_millis(150);

fn catalog() -> BackgroundCatalog {
    let entries = (0..6u8)
        .map(|i| {
            let raster = Raster::solid(8, 8, [0, i * 40, 255 - i * 40, 255]).unwrap();
            BackgroundAsset::new(format!("bg-{i}"), SourceImage::from_raster("bg", raster))
        })
        .collect();
    BackgroundCatalog::from_assets(entries).unwrap()
}

fn settings() -> PreviewSettings {
    PreviewSettings {
        host_width: 120,
        debounce: QUIET,
        ..PreviewSettings::default()
    }
}

fn screenshot() -> SourceImage {
    SourceImage::from_raster("shot", Raster::solid(200, 100, [250, 250, 250, 255]).unwrap())
}

#[test]
fn changes_during_a_pass_collapse_into_one_follow_up_pass() {
    let t0 = Instant::now();
    let mut store = ParamStore::new(StyleParameters::default(), QUIET).unwrap();
    let mut trigger = RenderTrigger::new(store.subscribe());
    let mut compositor = Compositor::new(settings(), catalog());

    store.set_source_image(screenshot());
    let first = trigger.next_pass().unwrap();

    // three rapid edits land while the first pass is still running
    store.set_background_index(1).unwrap();
    store.set_aspect_preset(AspectPreset::FourThree).unwrap();
    store.set_corner_radius(40.0, t0).unwrap();
    store.poll(t0 + QUIET);
    assert!(trigger.next_pass().is_none());

    compositor.render_pass(&first).unwrap();
    trigger.finish_pass(first.revision).unwrap();

    let follow_up = trigger.next_pass().unwrap();
    assert_eq!(follow_up.revision, store.revision());
    assert_eq!(follow_up.params.background_index, 1);
    assert_eq!(follow_up.params.aspect, AspectPreset::FourThree.ratio());
    assert_eq!(follow_up.params.corner_radius, 40.0);
    let report = compositor.render_pass(&follow_up).unwrap();
    trigger.finish_pass(follow_up.revision).unwrap();

    assert!(trigger.next_pass().is_none());
    assert!(trigger.is_idle());
    assert_eq!(trigger.coalesced(), 2);
    assert_eq!(compositor.passes(), 2);
    assert_eq!((report.canvas.width, report.canvas.height), (120, 90));
}

#[test]
fn slider_drag_renders_once_after_it_settles() {
    let t0 = Instant::now();
    let mut session = PreviewSession::new(settings(), catalog(), StyleParameters::default())
        .unwrap();
    session.store_mut().set_source_image(screenshot());
    assert_eq!(session.tick(t0).unwrap().passes(), 1);

    let mut passes = 0;
    for step in 0..10u64 {
        let now = t0 + Duration::from_millis(20 * step);
        session
            .store_mut()
            .set_margin(20.0 + step as f64, now)
            .unwrap();
        passes += session.tick(now).unwrap().passes();
    }
    assert_eq!(passes, 0);
    assert_eq!(session.store().raw().margin, 29.0);
    assert_eq!(session.store().published().margin, 20.0);

    let deadline = session.store().next_deadline().unwrap();
    assert_eq!(deadline, t0 + Duration::from_millis(180) + QUIET);
    let summary = session.tick(deadline).unwrap();
    assert_eq!(summary.passes(), 1);

    let layout = summary.completed[0].layout.as_ref().unwrap();
    assert!((layout.frame.x0 - 29.0).abs() < 1e-9);
}

#[test]
fn independent_fields_settle_on_their_own_timers() {
    let t0 = Instant::now();
    let mut session = PreviewSession::new(settings(), catalog(), StyleParameters::default())
        .unwrap();
    session.settle().unwrap();

    session.store_mut().set_padding(5.0, t0).unwrap();
    session
        .store_mut()
        .set_shadow_radius(60.0, t0 + Duration::from_millis(100))
        .unwrap();

    assert_eq!(session.tick(t0 + QUIET).unwrap().passes(), 1);
    assert_eq!(session.store().published().padding, 5.0);
    assert_eq!(session.store().published().shadow_radius, 5.0);

    assert_eq!(
        session
            .tick(t0 + Duration::from_millis(100) + QUIET)
            .unwrap()
            .passes(),
        1
    );
    assert_eq!(session.store().published().shadow_radius, 60.0);
}

#[test]
fn export_produces_a_png_of_the_settled_surface() {
    let t0 = Instant::now();
    let mut session = PreviewSession::new(settings(), catalog(), StyleParameters::default())
        .unwrap();
    session.store_mut().set_source_image(screenshot());
    session
        .store_mut()
        .set_aspect_preset(AspectPreset::SixteenNine)
        .unwrap();
    session.store_mut().set_corner_radius(30.0, t0).unwrap();

    let png = session.export_png().unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (120, 68));
    assert_eq!(session.store().published().corner_radius, 30.0);

    let again = session.export_png().unwrap();
    assert_eq!(png, again);
}

#[test]
fn failed_decode_keeps_the_last_good_surface_and_retries_on_redraw() {
    let mut session = PreviewSession::new(settings(), catalog(), StyleParameters::default())
        .unwrap();
    session.settle().unwrap();
    let good = session.surface().unwrap().clone();

    session
        .store_mut()
        .set_source_image(SourceImage::from_encoded("broken", b"\x89PNG broken".to_vec()));
    let summary = session.settle().unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(session.surface(), Some(&good));
    assert!(session.is_stale());

    session.store_mut().request_redraw();
    assert_eq!(session.settle().unwrap().failed, 1);

    session.store_mut().set_source_image(screenshot());
    let summary = session.settle().unwrap();
    assert_eq!(summary.completed.len(), 1);
    assert!(!session.is_stale());
    assert_ne!(session.surface(), Some(&good));
}
