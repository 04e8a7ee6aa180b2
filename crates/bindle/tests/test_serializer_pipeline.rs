use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bindle::{
    BundleSerializer, BundlerConfig, ChunkSerializeOptions, ChunkSerializer, InlineEnvironment,
    Module, ModuleGraph, OutputOptions, PipelineOptions, SerialAsset, SerializedBundle,
    SerializerHooks, SerializerOptions, SerializerParams, processor, with_default_serializer,
    with_serializer_processors,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Chunk serializer that reports what it was called with through asset
/// metadata, so tests can assert on the adapter's view of the world.
struct FakeChunkSerializer;

#[async_trait]
impl ChunkSerializer for FakeChunkSerializer {
    async fn serialize_chunks(
        &self,
        _config: &BundlerConfig,
        options: &ChunkSerializeOptions,
        params: &SerializerParams,
    ) -> Result<Vec<SerialAsset>> {
        let mut js = SerialAsset::new("js", "app.js", format!("// {} modules", params.graph.len()));
        js.metadata
            .insert("entryPoint".into(), json!(params.entry_point));
        js.metadata
            .insert("preModules".into(), json!(params.pre_modules.len()));
        if let Some(output_options) = &params.options.output_options {
            js.metadata
                .insert("outputMode".into(), json!(output_options.output));
        }

        let mut assets = vec![js];
        if options.include_source_maps {
            assets.push(SerialAsset::new("map", "app.js.map", "{\"version\":3}"));
        }
        if options.include_bytecode {
            assets.push(SerialAsset::new("bytecode", "app.hbc", "HBC"));
        }
        Ok(assets)
    }
}

/// Fallback serializer that echoes the pre-module order it observed.
struct EchoSerializer;

#[async_trait]
impl BundleSerializer for EchoSerializer {
    async fn serialize(&self, params: SerializerParams) -> Result<SerializedBundle> {
        let order = params
            .pre_modules
            .iter()
            .map(|module| module.path.as_str())
            .collect::<Vec<_>>()
            .join("+");
        Ok(SerializedBundle::Text(format!("custom:{order}")))
    }
}

fn sample_params() -> SerializerParams {
    let mut graph = ModuleGraph::new(vec!["entry.js".into()]);
    graph.add_module(
        Module::new("entry.js", "render(helper());").with_dependencies(vec!["helper.js".into()]),
    );
    graph.add_module(Module::new("helper.js", "function helper() { return 7; }"));
    SerializerParams::new("entry.js", graph)
}

fn pipeline_options() -> PipelineOptions {
    PipelineOptions {
        chunk_serializer: Some(Arc::new(FakeChunkSerializer)),
        ..PipelineOptions::default()
    }
}

async fn serialize(config: &BundlerConfig, params: SerializerParams) -> Result<SerializedBundle> {
    config
        .serializer
        .as_ref()
        .expect("a pipeline was registered")
        .serialize(params)
        .await
}

fn index_of(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in output"))
}

#[tokio::test]
async fn legacy_default_flattens_the_whole_bundle() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = with_default_serializer(BundlerConfig::default(), None, pipeline_options());

    let output = serialize(&config, sample_params())
        .await
        .expect("legacy serialization succeeds");
    let SerializedBundle::Text(code) = output else {
        panic!("legacy path must return text, got {output:?}");
    };

    // Prelude first, then the wrapped modules in graph order, then the
    // source URL comment.
    assert!(code.starts_with("var __DEV__=false"));
    let entry = index_of(&code, "render(helper());");
    let helper = index_of(&code, "function helper()");
    assert!(entry < helper);
    assert!(code.contains(", 0, [1]);"));
    assert!(code.ends_with("//# sourceURL=entry.js"));
}

#[tokio::test]
async fn registered_serializer_becomes_the_fallback() {
    let config = BundlerConfig {
        serializer: Some(Arc::new(EchoSerializer)),
        ..BundlerConfig::default()
    };

    let append = |name: &'static str| {
        Some(processor(move |mut params: SerializerParams| {
            params.pre_modules.push(Module::new(name, ";"));
            Ok(params)
        }))
    };
    let config = with_serializer_processors(
        config,
        vec![append("first"), None, append("second")],
        pipeline_options(),
    );

    let output = serialize(&config, sample_params())
        .await
        .expect("fallback serialization succeeds");
    // The old serializer got the fully processed parameters, in order, and
    // was not run as a stage.
    assert_eq!(output, SerializedBundle::Text("custom:first+second".into()));
}

#[tokio::test]
async fn explicit_static_options_return_raw_assets() {
    let config = with_default_serializer(BundlerConfig::default(), None, pipeline_options());

    let mut params = sample_params();
    params.options.output_options = Some(OutputOptions {
        output: Some("static".into()),
        include_source_maps: Some(true),
        include_bytecode: Some(false),
    });

    let output = serialize(&config, params)
        .await
        .expect("static serialization succeeds");
    let SerializedBundle::Assets(assets) = output else {
        panic!("explicit static callers get raw assets, got {output:?}");
    };

    let kinds: Vec<&str> = assets
        .iter()
        .map(|asset| asset.asset_type.as_str())
        .collect();
    assert_eq!(kinds, vec!["js", "map"]);
    // The adapter saw the merged options and the prelude pre-module.
    assert_eq!(assets[0].metadata["outputMode"], json!("static"));
    assert_eq!(assets[0].metadata["preModules"], json!(1));
}

#[tokio::test]
async fn url_static_requests_get_json_text_that_round_trips() {
    let config = with_default_serializer(BundlerConfig::default(), None, pipeline_options());

    let mut params = sample_params();
    params.options.source_url = Some(
        "https://x/app.bundle?serializer.output=static&serializer.map=true&serializer.bytecode=false"
            .into(),
    );

    let output = serialize(&config, params)
        .await
        .expect("static serialization succeeds");
    let SerializedBundle::Text(body) = output else {
        panic!("URL-driven requests always get a text body, got {output:?}");
    };

    let assets: Vec<SerialAsset> = serde_json::from_str(&body).expect("wire form parses back");
    let kinds: Vec<&str> = assets
        .iter()
        .map(|asset| asset.asset_type.as_str())
        .collect();
    assert_eq!(kinds, vec!["js", "map"]);
}

#[tokio::test]
async fn jsc_safe_request_urls_are_understood() {
    let config = with_default_serializer(BundlerConfig::default(), None, pipeline_options());

    let mut params = sample_params();
    params.options.source_url = Some("https://x/app.bundle//&serializer.output=static".into());

    let output = serialize(&config, params)
        .await
        .expect("static serialization succeeds");
    assert!(matches!(output, SerializedBundle::Text(body) if body.starts_with('[')));
}

#[tokio::test]
async fn explicit_non_static_options_dominate_a_static_url() {
    let config = with_default_serializer(BundlerConfig::default(), None, pipeline_options());

    let mut params = sample_params();
    params.options = SerializerOptions {
        output_options: Some(OutputOptions {
            output: Some("bundle".into()),
            ..OutputOptions::default()
        }),
        source_url: Some("/app.bundle?serializer.output=static".into()),
        dev: false,
    };

    let output = serialize(&config, params)
        .await
        .expect("legacy serialization succeeds");
    let SerializedBundle::Text(code) = output else {
        panic!("non-static explicit options select the legacy path");
    };
    assert!(code.contains("__d(function()"), "expected bundle code, got JSON?");
}

#[tokio::test]
async fn static_without_chunk_serializer_is_an_error() {
    let config =
        with_default_serializer(BundlerConfig::default(), None, PipelineOptions::default());

    let mut params = sample_params();
    params.options.output_options = Some(OutputOptions {
        output: Some("static".into()),
        ..OutputOptions::default()
    });

    let error = serialize(&config, params)
        .await
        .expect_err("static output needs an adapter");
    assert!(error.to_string().contains("no chunk serializer"));
}

#[tokio::test]
async fn processor_failure_aborts_the_invocation() {
    let config = with_serializer_processors(
        BundlerConfig::default(),
        vec![Some(processor(|_| Err(anyhow!("corrupt graph"))))],
        pipeline_options(),
    );

    let error = serialize(&config, sample_params())
        .await
        .expect_err("processor failure must propagate");
    assert_eq!(error.to_string(), "corrupt graph");
}

#[tokio::test]
async fn pre_serialize_hook_rewrites_params_before_the_adapter() {
    let options = PipelineOptions {
        chunk_serializer: Some(Arc::new(FakeChunkSerializer)),
        hooks: SerializerHooks {
            pre_serialize: Some(Box::new(|mut params| {
                params.entry_point = "rewritten.js".into();
                params
            })),
            ..SerializerHooks::default()
        },
        ..PipelineOptions::default()
    };
    let config = with_default_serializer(BundlerConfig::default(), None, options);

    let mut params = sample_params();
    params.options.output_options = Some(OutputOptions {
        output: Some("static".into()),
        ..OutputOptions::default()
    });

    let output = serialize(&config, params)
        .await
        .expect("static serialization succeeds");
    let SerializedBundle::Assets(assets) = output else {
        panic!("explicit static callers get raw assets");
    };
    assert_eq!(assets[0].metadata["entryPoint"], json!("rewritten.js"));
}

#[tokio::test]
async fn inline_environment_lands_after_the_prelude() {
    let environment = InlineEnvironment::new(vec![(
        "API_URL".to_owned(),
        "https://example.test".to_owned(),
    )]);
    let config = with_default_serializer(
        BundlerConfig::default(),
        Some(environment),
        pipeline_options(),
    );

    let output = serialize(&config, sample_params())
        .await
        .expect("legacy serialization succeeds");
    let SerializedBundle::Text(code) = output else {
        panic!("legacy path must return text");
    };

    let prelude = index_of(&code, "__BUNDLE_START_TIME__");
    let env = index_of(&code, "process.env.API_URL=\"https://example.test\";");
    assert!(prelude < env);
}

#[tokio::test]
async fn equivalent_inputs_serialize_identically() {
    let config = with_default_serializer(BundlerConfig::default(), None, pipeline_options());

    let first = serialize(&config, sample_params())
        .await
        .expect("serialization succeeds");
    let second = serialize(&config, sample_params())
        .await
        .expect("serialization succeeds");
    assert_eq!(first, second);

    let static_params = || {
        let mut params = sample_params();
        params.options.source_url = Some("/app.bundle?serializer.output=static".into());
        params
    };
    let first = serialize(&config, static_params())
        .await
        .expect("serialization succeeds");
    let second = serialize(&config, static_params())
        .await
        .expect("serialization succeeds");
    assert_eq!(first, second);
}
