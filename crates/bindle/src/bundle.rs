//! Whole-bundle assembly for the legacy output path.
//!
//! Deliberately mechanical: module ids and layout follow graph iteration
//! order, and no decisions are made here. Anything that wants a say in the
//! output happens earlier, as a serial processor, or via the post-bundle
//! hooks.

use log::trace;
use rustc_hash::FxHashMap;

use crate::params::SerializerParams;

/// Raw whole-bundle value, before flattening to a single string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleShape {
    /// Bootstrap code emitted before any module.
    pub pre: String,
    /// Trailing code; carries the source-URL comment for the entry point.
    pub post: String,
    /// `(id, code)` pairs in emission order.
    pub modules: Vec<(usize, String)>,
}

/// Flattened legacy artifact: the bundle code plus an optional source map.
///
/// An empty `map` means "no map"; the default formatter never produces one,
/// the post-encode hook may.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeWithMap {
    pub code: String,
    pub map: String,
}

/// Assemble the whole-bundle value from the final parameters.
///
/// Graph modules get dense numeric ids in graph iteration order, and each
/// module's dependency list is rewritten to those ids. Dependencies that
/// point outside the graph are dropped from the wrapper arguments; the
/// front-end already reported them. Pre-modules are concatenated verbatim
/// ahead of everything, unwrapped.
pub fn base_bundle(params: &SerializerParams) -> BundleShape {
    let pre = params
        .pre_modules
        .iter()
        .map(|module| module.source.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut ids: FxHashMap<&str, usize> = FxHashMap::default();
    for (id, path) in params.graph.modules.keys().enumerate() {
        ids.insert(path.as_str(), id);
    }

    let mut modules = Vec::with_capacity(params.graph.modules.len());
    for (path, module) in &params.graph.modules {
        let id = ids[path.as_str()];
        let dependency_ids = module
            .dependencies
            .iter()
            .filter_map(|dependency| ids.get(dependency.as_str()))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        trace!("emitting module {id} ({path})");
        modules.push((
            id,
            format!(
                "__d(function() {{\n{}\n}}, {id}, [{dependency_ids}]);",
                module.source
            ),
        ));
    }

    BundleShape {
        pre,
        post: format!("//# sourceURL={}", params.entry_point),
        modules,
    }
}

/// Flatten a whole-bundle value into one code string.
///
/// Modules are joined in ascending id order. Per-chunk structure and
/// per-module source maps do not survive this point; that loss is the
/// legacy contract.
pub fn bundle_to_code(bundle: &BundleShape) -> String {
    let mut ordered: Vec<&(usize, String)> = bundle.modules.iter().collect();
    ordered.sort_by_key(|(id, _)| *id);

    let mut segments = Vec::with_capacity(ordered.len() + 2);
    if !bundle.pre.is_empty() {
        segments.push(bundle.pre.as_str());
    }
    segments.extend(ordered.iter().map(|(_, code)| code.as_str()));
    if !bundle.post.is_empty() {
        segments.push(bundle.post.as_str());
    }
    segments.join("\n")
}
