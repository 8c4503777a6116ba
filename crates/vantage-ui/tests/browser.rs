//! Browser tests for the platform layer
//!
//! Run with `wasm-pack test --headless --firefox crates/vantage-ui`.

#![allow(clippy::unwrap_used)]

use futures::channel::oneshot;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

use vantage_core::RootMargin;
use vantage_core::env::{
    FormatProbe, IdleScheduler, ModuleFetcher, ObserverFactory, ObserverOptions, ProbeOutcome,
    SchedulePath, schedule_background,
};
use vantage_core::{FetchError, ImageFormat};
use vantage_ui::platform::{BrowserFormatProbe, BrowserObservers, BrowserScheduler, FutureFetcher};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
async fn next_tick_runs_the_job() {
    let (tx, rx) = oneshot::channel();
    BrowserScheduler.on_next_tick(Box::pin(async move {
        let _ = tx.send(7_u8);
    }));

    assert_eq!(rx.await.unwrap(), 7);
}

#[wasm_bindgen_test]
async fn background_job_runs_on_either_path() {
    let (tx, rx) = oneshot::channel();
    let path = schedule_background(
        &BrowserScheduler,
        Box::pin(async move {
            let _ = tx.send(());
        }),
    );

    let expected = if BrowserScheduler.supports_idle() {
        SchedulePath::Idle
    } else {
        SchedulePath::NextTick
    };
    assert_eq!(path, expected);
    assert!(rx.await.is_ok());
}

#[wasm_bindgen_test]
fn observer_is_created_and_disconnects_twice() {
    let document = web_sys::window().unwrap().document().unwrap();
    let target = document.create_element("div").unwrap();
    let options = ObserverOptions {
        threshold: 0.25,
        root_margin: RootMargin::px(200.0),
    };

    let mut handle = BrowserObservers
        .observe(&target, &options, Box::new(|_entry| {}))
        .unwrap();
    handle.disconnect();
    handle.disconnect();
}

#[wasm_bindgen_test]
async fn probe_answers_are_definite() {
    let probe = BrowserFormatProbe::default();

    assert_eq!(probe.probe(ImageFormat::Original).await, ProbeOutcome::Supported);
    let webp = probe.probe(ImageFormat::Webp).await;
    assert!(matches!(webp, ProbeOutcome::Supported | ProbeOutcome::Unsupported));
}

#[wasm_bindgen_test]
async fn future_fetcher_reports_failure() {
    let fetcher = FutureFetcher::new(|| async { Err::<u8, _>(FetchError::new("offline")) });

    assert!(fetcher.fetch().await.is_err());
}
