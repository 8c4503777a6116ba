//! Showcase binary; `trunk serve` builds it for the browser.

use leptos::prelude::*;
use vantage_ui::App;

fn main() {
    console_error_panic_hook::set_once();
    web_sys::console::debug_1(&"vantage showcase mounting".into());
    mount_to_body(|| view! { <App /> });
}
