//! Module fetchers for deferred heavy content

use std::future::Future;

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen_futures::JsFuture;

use vantage_core::FetchError;
use vantage_core::env::ModuleFetcher;

use crate::error::{PlatformError, describe_js};

#[wasm_bindgen(inline_js = "export function import_module(url) { return import(url); }")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn import_module(url: &str) -> Result<js_sys::Promise, JsValue>;
}

/// Loads an ES module with a dynamic `import()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicImport {
    url: String,
}

impl DynamicImport {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn failure(&self, reason: &JsValue) -> FetchError {
        FetchError::new(
            PlatformError::ImportFailed {
                url: self.url.clone(),
                reason: describe_js(reason),
            }
            .to_string(),
        )
    }
}

#[async_trait(?Send)]
impl ModuleFetcher for DynamicImport {
    /// The module namespace object.
    type Module = JsValue;

    async fn fetch(&self) -> Result<JsValue, FetchError> {
        let promise = import_module(&self.url).map_err(|e| self.failure(&e))?;
        JsFuture::from(promise).await.map_err(|e| self.failure(&e))
    }
}

/// Adapts an async closure, for heavy work written in Rust.
pub struct FutureFetcher<F> {
    make: F,
}

impl<F> FutureFetcher<F> {
    pub const fn new(make: F) -> Self {
        Self { make }
    }
}

#[async_trait(?Send)]
impl<F, Fut, M> ModuleFetcher for FutureFetcher<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<M, FetchError>>,
{
    type Module = M;

    async fn fetch(&self) -> Result<M, FetchError> {
        (self.make)().await
    }
}
