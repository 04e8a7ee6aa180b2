//! The parameter set threaded through every serial processor.

use serde::{Deserialize, Serialize};

use crate::graph::{Module, ModuleGraph};

/// Caller-supplied output overrides.
///
/// When this value is present on [`SerializerOptions`], request-URL
/// resolution is bypassed entirely and the caller is treated as capable of
/// consuming the raw asset collection. Requests that only carry a
/// `source_url` never are; they always receive text.
///
/// Field names follow the camelCase wire form used by bundle request
/// payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputOptions {
    /// Requested output mode; `"static"` selects the structured asset path,
    /// anything else falls through to the legacy path.
    pub output: Option<String>,
    pub include_source_maps: Option<bool>,
    pub include_bytecode: Option<bool>,
}

/// Options slot of the serializer parameters.
#[derive(Debug, Clone, Default)]
pub struct SerializerOptions {
    /// Explicit output overrides. Takes precedence over `source_url`.
    pub output_options: Option<OutputOptions>,
    /// URL the bundle was requested through, possibly in the JSC-safe
    /// envelope. Only its query parameters matter here.
    pub source_url: Option<String>,
    /// Whether the bundle is built for development.
    pub dev: bool,
}

/// The four-part parameter set every serial processor consumes and
/// produces.
///
/// Processors replace the value wholesale; there is no partial update
/// protocol and no validation beyond what the type system gives us. A
/// processor that drops or scrambles a field corrupts everything after it,
/// which is a contract the assembler of the processor list owns.
#[derive(Debug, Clone, Default)]
pub struct SerializerParams {
    /// Path of the bundle's entry module.
    pub entry_point: String,
    /// Bootstrap modules emitted ahead of the graph's own modules. The
    /// prelude processor prepends here.
    pub pre_modules: Vec<Module>,
    /// Read-only dependency graph.
    pub graph: ModuleGraph,
    /// Configuration bag.
    pub options: SerializerOptions,
}

impl SerializerParams {
    pub fn new(entry_point: impl Into<String>, graph: ModuleGraph) -> Self {
        Self {
            entry_point: entry_point.into(),
            pre_modules: Vec::new(),
            graph,
            options: SerializerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SerializerOptions) -> Self {
        self.options = options;
        self
    }
}
