//! Query-parameter layering for negotiated source URLs.

use url::form_urlencoded;

use crate::config::ImageSettings;
use crate::image::ImageFormat;

/// Layer quality, width and format parameters onto `original`.
///
/// Parameters already present in `original` are left as they are and never
/// appended a second time. The fragment, if any, stays at the end.
#[must_use]
pub fn build_source_url(
    original: &str,
    settings: &ImageSettings,
    format: ImageFormat,
    quality: u8,
    width: Option<u32>,
) -> String {
    let (without_fragment, fragment) = match original.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (original, None),
    };
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let present: Vec<String> = form_urlencoded::parse(query.as_bytes())
        .map(|(key, _)| key.into_owned())
        .collect();
    let missing = |name: &str| !present.iter().any(|key| key == name);

    let mut serializer = form_urlencoded::Serializer::for_suffix(query.to_string(), 0);
    if missing(&settings.quality_param) {
        serializer.append_pair(&settings.quality_param, &quality.to_string());
    }
    if let Some(width) = width.filter(|_| missing(&settings.width_param)) {
        serializer.append_pair(&settings.width_param, &width.to_string());
    }
    if format != ImageFormat::Original && missing(&settings.format_param) {
        serializer.append_pair(&settings.format_param, format.tag());
    }
    let query = serializer.finish();

    let mut url = String::with_capacity(original.len().saturating_add(32));
    url.push_str(path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}
