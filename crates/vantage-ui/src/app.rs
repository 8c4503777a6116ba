//! Showcase root
//!
//! Provides the shared [`VantageConfig`] to every image and deferred module
//! below it. A config that fails validation is replaced by the defaults.

use leptos::prelude::*;

use vantage_core::VantageConfig;

use crate::pages::Home;

fn effective_config(config: Option<VantageConfig>) -> VantageConfig {
    let config = config.unwrap_or_default();
    match config.validate() {
        Ok(()) => config,
        Err(error) => {
            web_sys::console::warn_1(&format!("invalid vantage config, using defaults: {error}").into());
            VantageConfig::default()
        }
    }
}

#[component]
pub fn App(#[prop(optional)] config: Option<VantageConfig>) -> impl IntoView {
    provide_context(effective_config(config));

    view! {
        <main class="showcase">
            <Home />
        </main>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_component_exists() {
        let _component = App;
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(effective_config(None), VantageConfig::default());
    }
}
