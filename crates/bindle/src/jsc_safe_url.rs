//! Decoding of JSC-safe request URLs.
//!
//! Some JavaScriptCore-based clients request bundles through URLs whose
//! query delimiter is spelled `//&` instead of `?`, so the URL stays inert
//! when it ends up verbatim inside a `sourceURL` comment. Only decoding
//! lives here; producing such URLs is the client's business.

use std::borrow::Cow;

use cow_utils::CowUtils;

/// True when `url` uses the `//&` query delimiter form.
///
/// A URL that already carries a `?` is a normal URL even if `//&` appears
/// somewhere in its query values.
pub fn is_jsc_safe_url(url: &str) -> bool {
    !url.contains('?') && url.contains("//&")
}

/// Convert a JSC-safe URL back to a standard one.
///
/// The first `//&` becomes `?`; later separators are already plain `&`.
/// Standard URLs pass through unchanged, without allocation.
pub fn to_normal_url(url: &str) -> Cow<'_, str> {
    if is_jsc_safe_url(url) {
        url.cow_replacen("//&", "?", 1)
    } else {
        Cow::Borrowed(url)
    }
}
