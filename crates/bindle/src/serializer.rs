//! Terminal serializer contract and the default legacy formatter.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::{
    assets::SerialAsset,
    bundle::{BundleShape, CodeWithMap, base_bundle, bundle_to_code},
    params::SerializerParams,
};

/// Final artifact of one serialization.
///
/// Which variant a caller can get is decided by the output mode resolution,
/// not by inspecting the value: `Assets` only ever reaches callers that
/// passed explicit output options.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializedBundle {
    /// Legacy bundle code, or the JSON text form of a structured asset
    /// sequence for callers that only accept a text body.
    Text(String),
    /// Legacy code plus its source map.
    CodeMap { code: String, map: String },
    /// Raw structured assets.
    Assets(Vec<SerialAsset>),
}

/// Terminal serializer turning the final parameters into an artifact.
///
/// A bundler config carries at most one. Registering a composed pipeline on
/// a config that already has one keeps the old serializer as the pipeline's
/// legacy fallback; two independently registered serializers never coexist.
#[async_trait]
pub trait BundleSerializer: Send + Sync {
    async fn serialize(&self, params: SerializerParams) -> Result<SerializedBundle>;
}

/// Hook points supplied at pipeline construction. All optional.
///
/// `pre_serialize` runs on the structured path, right before the chunk
/// serializer is invoked. The other two only exist on the synthesized
/// legacy path, the one place where the whole-bundle value and the
/// flattened pair are visible; a registered fallback serializer owns its
/// own output and bypasses them.
#[derive(Default)]
pub struct SerializerHooks {
    pub pre_serialize: Option<Box<dyn Fn(SerializerParams) -> SerializerParams + Send + Sync>>,
    pub post_bundle: Option<Box<dyn Fn(BundleShape) -> BundleShape + Send + Sync>>,
    pub post_encode: Option<Box<dyn Fn(CodeWithMap) -> CodeWithMap + Send + Sync>>,
}

impl fmt::Debug for SerializerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerHooks")
            .field("pre_serialize", &self.pre_serialize.is_some())
            .field("post_bundle", &self.post_bundle.is_some())
            .field("post_encode", &self.post_encode.is_some())
            .finish()
    }
}

/// Default legacy formatter, synthesized when no fallback serializer is
/// registered.
///
/// Builds the whole-bundle value, applies the post-bundle hook, flattens
/// everything into a single code string (per-chunk structure and source
/// maps are discarded), and runs the post-encode hook on the result.
pub(crate) fn default_legacy_serialize(
    params: &SerializerParams,
    hooks: &SerializerHooks,
) -> SerializedBundle {
    let mut bundle = base_bundle(params);
    if let Some(hook) = &hooks.post_bundle {
        bundle = hook(bundle);
    }

    let mut encoded = CodeWithMap {
        code: bundle_to_code(&bundle),
        map: String::new(),
    };
    if let Some(hook) = &hooks.post_encode {
        encoded = hook(encoded);
    }

    debug!(
        "default legacy serializer produced {} bytes of code",
        encoded.code.len()
    );
    if encoded.map.is_empty() {
        SerializedBundle::Text(encoded.code)
    } else {
        SerializedBundle::CodeMap {
            code: encoded.code,
            map: encoded.map,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::{Module, ModuleGraph};

    fn minimal_params() -> SerializerParams {
        let mut graph = ModuleGraph::new(vec!["entry.js".into()]);
        graph.add_module(Module::new("entry.js", "run();"));
        SerializerParams::new("entry.js", graph)
    }

    #[test]
    fn default_formatter_returns_text_without_hooks() {
        let output = default_legacy_serialize(&minimal_params(), &SerializerHooks::default());
        let SerializedBundle::Text(code) = output else {
            panic!("legacy default must be text");
        };
        assert!(code.contains("run();"));
        assert!(code.ends_with("//# sourceURL=entry.js"));
    }

    #[test]
    fn post_bundle_hook_sees_the_raw_bundle() {
        let hooks = SerializerHooks {
            post_bundle: Some(Box::new(|mut bundle| {
                bundle.pre = "/* banner */".into();
                bundle
            })),
            ..SerializerHooks::default()
        };
        let output = default_legacy_serialize(&minimal_params(), &hooks);
        let SerializedBundle::Text(code) = output else {
            panic!("legacy default must be text");
        };
        assert!(code.starts_with("/* banner */\n"));
    }

    #[test]
    fn post_encode_hook_can_attach_a_map() {
        let hooks = SerializerHooks {
            post_encode: Some(Box::new(|mut encoded| {
                encoded.map = "{\"version\":3}".into();
                encoded
            })),
            ..SerializerHooks::default()
        };
        let output = default_legacy_serialize(&minimal_params(), &hooks);
        let SerializedBundle::CodeMap { map, .. } = output else {
            panic!("map attached by the hook selects the pair form");
        };
        assert_eq!(map, "{\"version\":3}");
    }
}
