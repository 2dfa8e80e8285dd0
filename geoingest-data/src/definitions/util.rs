//! Shared helpers for definition sources.

use super::{BaseUrl, source::DEFAULT_BASE_URL};

/// Collapse trailing slashes to exactly one and fall back to the default
/// service when the URL is blank.
pub(crate) fn sanitise_base_url(url: impl Into<String>) -> BaseUrl {
    let raw = url.into();
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        BaseUrl::from(DEFAULT_BASE_URL)
    } else {
        BaseUrl::new(format!("{trimmed}/"))
    }
}
