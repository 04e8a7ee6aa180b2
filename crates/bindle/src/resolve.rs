//! Output mode resolution.
//!
//! Decides, once per invocation, which terminal contract a request gets.
//! Precedence is strict: explicit caller options win over request-URL query
//! parameters, which win over nothing at all (the legacy whole-bundle
//! path). The resolution is returned to the caller instead of being written
//! back into the shared options value, so concurrent invocations never
//! observe each other.

use anyhow::{Context, Result};
use log::debug;
use url::Url;

use crate::{jsc_safe_url, params::SerializerOptions};

/// Output mode value selecting the structured asset path.
pub const OUTPUT_MODE_STATIC: &str = "static";

/// Query parameters recognized on a bundle request URL.
const QUERY_OUTPUT: &str = "serializer.output";
const QUERY_SOURCE_MAPS: &str = "serializer.map";
const QUERY_BYTECODE: &str = "serializer.bytecode";

/// Flags governing one serialization. Computed per invocation, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSerializerOptions {
    /// Requested output mode, verbatim. Only [`OUTPUT_MODE_STATIC`] selects
    /// the structured path; every other value falls through to legacy.
    pub output_mode: Option<String>,
    pub include_source_maps: bool,
    pub include_bytecode: bool,
}

impl ResolvedSerializerOptions {
    /// True when the structured asset path should be taken.
    pub fn is_static(&self) -> bool {
        self.output_mode.as_deref() == Some(OUTPUT_MODE_STATIC)
    }
}

/// Resolution outcome, tagged by where the options came from.
///
/// Only `Explicit` callers may receive the raw asset collection; URL-driven
/// requests always travel a text wire, whatever their query says. Request
/// callers depend on that asymmetry, so do not "fix" it into symmetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedOptions {
    /// Caller passed output options directly.
    Explicit(ResolvedSerializerOptions),
    /// Options were decoded from the request URL.
    FromUrl(ResolvedSerializerOptions),
}

impl ResolvedOptions {
    pub fn options(&self) -> &ResolvedSerializerOptions {
        match self {
            Self::Explicit(options) | Self::FromUrl(options) => options,
        }
    }

    /// Whether the caller accepts the raw asset collection instead of its
    /// JSON text form.
    pub fn accepts_raw_assets(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

/// Resolve the serializer options for one invocation.
///
/// Returns `None` when neither explicit options nor a `source_url` are
/// present; the caller then takes the legacy path unconditionally. A
/// `source_url` that fails to parse against `base_url` is a fatal error, no
/// fallback parsing is attempted.
pub fn resolve_serializer_options(
    options: &SerializerOptions,
    base_url: &Url,
) -> Result<Option<ResolvedOptions>> {
    if let Some(overrides) = &options.output_options {
        let resolved = ResolvedSerializerOptions {
            output_mode: overrides.output.clone(),
            include_source_maps: overrides.include_source_maps.unwrap_or(false),
            include_bytecode: overrides.include_bytecode.unwrap_or(false),
        };
        debug!("serializer options supplied by caller: {resolved:?}");
        return Ok(Some(ResolvedOptions::Explicit(resolved)));
    }

    if let Some(source_url) = &options.source_url {
        let normal = jsc_safe_url::to_normal_url(source_url);
        let url = Url::options()
            .base_url(Some(base_url))
            .parse(&normal)
            .with_context(|| format!("invalid bundle request URL `{source_url}`"))?;

        let mut resolved = ResolvedSerializerOptions::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                QUERY_OUTPUT => resolved.output_mode = Some(value.into_owned()),
                // `true` exactly; anything else, including `True`, is false.
                QUERY_SOURCE_MAPS => resolved.include_source_maps = value.as_ref() == "true",
                QUERY_BYTECODE => resolved.include_bytecode = value.as_ref() == "true",
                _ => {}
            }
        }
        debug!("serializer options decoded from request URL: {resolved:?}");
        return Ok(Some(ResolvedOptions::FromUrl(resolved)));
    }

    Ok(None)
}
