//! Format support detection by decoding tiny embedded images
//!
//! Each format is decoded at most once per probe instance; later components
//! sharing the probe reuse the answer.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

use vantage_core::ImageFormat;
use vantage_core::env::{FormatProbe, ProbeOutcome};

use crate::error::{PlatformError, describe_js};

/// 1x1 AVIF.
const AVIF_SAMPLE: &str = "data:image/avif;base64,AAAAIGZ0eXBhdmlmAAAAAGF2aWZtaWYxbWlhZk1BMUIAAADybWV0YQAAAAAAAAAoaGRscgAAAAAAAAAAcGljdAAAAAAAAAAAAAAAAGxpYmF2aWYAAAAADnBpdG0AAAAAAAEAAAAeaWxvYwAAAABEAAABAAEAAAABAAABGgAAAB0AAAAoaWluZgAAAAAAAQAAABppbmZlAgAAAAABAABhdjAxQ29sb3IAAAAAamlwcnAAAABLaXBjbwAAABRpc3BlAAAAAAAAAAIAAAACAAAAEHBpeGkAAAAAAwgICAAAAAxhdjFDgQ0MAAAAABNjb2xybmNseAACAAIAAYAAAAAXaXBtYQAAAAAAAAABAAEEAQKDBAAAACVtZGF0EgAKCBgANogQEAwgMg8f8D///8WfhwB8+ErK42A=";

/// 1x1 lossy WebP.
const WEBP_SAMPLE: &str =
    "data:image/webp;base64,UklGRiIAAABXRUJQVlA4IBYAAAAwAQCdASoBAAEADsD+JaQAA3AAAAAA";

/// Embedded sample for a compressed format.
#[must_use]
pub const fn sample_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Avif => Some(AVIF_SAMPLE),
        ImageFormat::Webp => Some(WEBP_SAMPLE),
        ImageFormat::Original => None,
    }
}

thread_local! {
    static SHARED: BrowserFormatProbe = BrowserFormatProbe::default();
}

/// Probe shared by every component on the page.
#[must_use]
pub fn shared() -> BrowserFormatProbe {
    SHARED.with(Clone::clone)
}

/// Decodes embedded samples and caches the answers.
#[derive(Debug, Clone, Default)]
pub struct BrowserFormatProbe {
    answers: Rc<RefCell<Vec<(ImageFormat, ProbeOutcome)>>>,
}

impl BrowserFormatProbe {
    fn cached(&self, format: ImageFormat) -> Option<ProbeOutcome> {
        self.answers
            .borrow()
            .iter()
            .find(|(known, _)| *known == format)
            .map(|(_, outcome)| outcome.clone())
    }

    fn remember(&self, format: ImageFormat, outcome: &ProbeOutcome) {
        // Errors are not cached so a later component may try again.
        if !matches!(outcome, ProbeOutcome::Error(_)) && self.cached(format).is_none() {
            self.answers.borrow_mut().push((format, outcome.clone()));
        }
    }
}

async fn decode(sample: &str) -> ProbeOutcome {
    let image = match HtmlImageElement::new() {
        Ok(image) => image,
        Err(e) => {
            return ProbeOutcome::Error(PlatformError::ProbeImageFailed(describe_js(&e)).to_string());
        }
    };

    let (sender, receiver) = oneshot::channel::<bool>();
    let sender = Rc::new(RefCell::new(Some(sender)));

    let on_load = {
        let sender = Rc::clone(&sender);
        let image = image.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(image.natural_width() > 0 && image.natural_height() > 0);
            }
        })
    };
    let on_error = {
        let sender = Rc::clone(&sender);
        Closure::<dyn FnMut()>::new(move || {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(false);
            }
        })
    };

    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    image.set_src(sample);

    let outcome = match receiver.await {
        Ok(true) => ProbeOutcome::Supported,
        Ok(false) => ProbeOutcome::Unsupported,
        Err(_) => ProbeOutcome::Error("probe image was dropped before decoding".to_string()),
    };

    image.set_onload(None);
    image.set_onerror(None);
    outcome
}

#[async_trait(?Send)]
impl FormatProbe for BrowserFormatProbe {
    async fn probe(&self, format: ImageFormat) -> ProbeOutcome {
        let Some(sample) = sample_for(format) else {
            return ProbeOutcome::Supported;
        };
        if let Some(outcome) = self.cached(format) {
            return outcome;
        }
        let outcome = decode(sample).await;
        self.remember(format, &outcome);
        outcome
    }
}
