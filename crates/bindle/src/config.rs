//! The slice of a bundler's configuration the serializer cares about.

use std::{fmt, sync::Arc};

use once_cell::sync::Lazy;
use url::Url;

use crate::serializer::BundleSerializer;

/// Base that request URLs are parsed against; bundle requests usually come
/// in as origin-less paths like `/app.bundle?...`.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

static DEFAULT_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"));

/// Serializer-facing bundler configuration.
///
/// The chunk serializer receives a clone of this with the `serializer` slot
/// emptied, so an adapter can read configuration without ever re-entering
/// the pipeline that called it.
#[derive(Clone)]
pub struct BundlerConfig {
    /// Terminal serializer slot; at most one.
    pub serializer: Option<Arc<dyn BundleSerializer>>,
    /// Base URL request URLs resolve against.
    pub base_url: Url,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            serializer: None,
            base_url: DEFAULT_BASE.clone(),
        }
    }
}

impl fmt::Debug for BundlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundlerConfig")
            .field("serializer", &self.serializer.is_some())
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
