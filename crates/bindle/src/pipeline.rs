//! Pipeline composition and registration.
//!
//! A composed pipeline is itself a [`BundleSerializer`]: an ordered list of
//! serial processors folded left to right, followed by the terminal
//! dispatch between the legacy and structured output paths.

use std::{fmt, sync::Arc};

use anyhow::{Result, bail};
use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, trace};

use crate::{
    assets::{ChunkSerializeOptions, ChunkSerializer, assets_to_json},
    config::BundlerConfig,
    environment::{InlineEnvironment, environment_processor},
    params::{OutputOptions, SerializerParams},
    prelude::prelude_processor,
    processor::SerialProcessor,
    resolve::{ResolvedOptions, ResolvedSerializerOptions, resolve_serializer_options},
    serializer::{BundleSerializer, SerializedBundle, SerializerHooks, default_legacy_serialize},
};

/// Everything configurable at pipeline construction beyond the processor
/// list itself.
#[derive(Default)]
pub struct PipelineOptions {
    /// Adapter for the structured asset path. A request that resolves to
    /// the `static` output mode fails when this is absent.
    pub chunk_serializer: Option<Arc<dyn ChunkSerializer>>,
    /// Optional hook points; see [`SerializerHooks`].
    pub hooks: SerializerHooks,
    /// Opaque options forwarded to the chunk serializer verbatim.
    pub chunk_extras: IndexMap<String, serde_json::Value>,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("chunk_serializer", &self.chunk_serializer.is_some())
            .field("hooks", &self.hooks)
            .field("chunk_extras", &self.chunk_extras)
            .finish()
    }
}

/// The composed serializer: ordered processors plus terminal dispatch.
pub struct SerializerPipeline {
    processors: Vec<SerialProcessor>,
    /// Serializer that was registered before this pipeline; owns the legacy
    /// path when present. Never runs as an ordered stage.
    fallback: Option<Arc<dyn BundleSerializer>>,
    chunk_serializer: Option<Arc<dyn ChunkSerializer>>,
    hooks: SerializerHooks,
    chunk_extras: IndexMap<String, serde_json::Value>,
    /// Snapshot of the config taken at registration, with the serializer
    /// slot emptied so the chunk serializer cannot re-enter the pipeline.
    config: BundlerConfig,
}

impl SerializerPipeline {
    /// Compose `processors` and the terminal dispatch into one serializer.
    ///
    /// Holes in the processor list are skipped, not an error; what remains
    /// runs strictly in list order. `fallback` is whatever serializer was
    /// registered before this pipeline.
    pub fn new(
        config: &BundlerConfig,
        processors: Vec<Option<SerialProcessor>>,
        fallback: Option<Arc<dyn BundleSerializer>>,
        options: PipelineOptions,
    ) -> Self {
        let supplied = processors.len();
        let processors: Vec<SerialProcessor> = processors.into_iter().flatten().collect();
        debug!(
            "composed serializer pipeline with {} of {supplied} processors (fallback: {})",
            processors.len(),
            fallback.is_some(),
        );

        let mut config = config.clone();
        config.serializer = None;
        Self {
            processors,
            fallback,
            chunk_serializer: options.chunk_serializer,
            hooks: options.hooks,
            chunk_extras: options.chunk_extras,
            config,
        }
    }

    /// Left-to-right fold of the parameters through every processor.
    fn run_processors(&self, mut params: SerializerParams) -> Result<SerializerParams> {
        for (index, processor) in self.processors.iter().enumerate() {
            trace!("running serial processor {index}");
            params = processor(params)?;
        }
        Ok(params)
    }

    async fn serialize_static(
        &self,
        resolved: &ResolvedOptions,
        mut params: SerializerParams,
    ) -> Result<SerializedBundle> {
        let Some(chunk_serializer) = &self.chunk_serializer else {
            bail!("output mode `static` was requested but no chunk serializer is registered");
        };

        // Downstream code sees the resolved flags merged over whatever the
        // caller passed; the caller's own options value stays untouched.
        let options = resolved.options();
        params.options.output_options = Some(merged_output_options(
            params.options.output_options.take(),
            options,
        ));
        if let Some(hook) = &self.hooks.pre_serialize {
            params = hook(params);
        }

        let chunk_options = ChunkSerializeOptions {
            include_source_maps: options.include_source_maps,
            include_bytecode: options.include_bytecode,
            extras: self.chunk_extras.clone(),
        };
        let assets = chunk_serializer
            .serialize_chunks(&self.config, &chunk_options, &params)
            .await?;
        debug!("chunk serializer produced {} assets", assets.len());

        if resolved.accepts_raw_assets() {
            Ok(SerializedBundle::Assets(assets))
        } else {
            Ok(SerializedBundle::Text(assets_to_json(&assets)?))
        }
    }

    async fn serialize_legacy(&self, params: SerializerParams) -> Result<SerializedBundle> {
        if let Some(fallback) = &self.fallback {
            debug!("delegating to the registered fallback serializer");
            return fallback.serialize(params).await;
        }
        debug!("no fallback serializer registered, using the default whole-bundle formatter");
        Ok(default_legacy_serialize(&params, &self.hooks))
    }
}

impl fmt::Debug for SerializerPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerPipeline")
            .field("processors", &self.processors.len())
            .field("fallback", &self.fallback.is_some())
            .field("chunk_serializer", &self.chunk_serializer.is_some())
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[async_trait]
impl BundleSerializer for SerializerPipeline {
    async fn serialize(&self, params: SerializerParams) -> Result<SerializedBundle> {
        let params = self.run_processors(params)?;
        let resolved = resolve_serializer_options(&params.options, &self.config.base_url)?;
        match &resolved {
            Some(resolved) if resolved.options().is_static() => {
                self.serialize_static(resolved, params).await
            }
            _ => self.serialize_legacy(params).await,
        }
    }
}

/// Resolved flags merged over the caller-supplied options, field-wise.
fn merged_output_options(
    existing: Option<OutputOptions>,
    resolved: &ResolvedSerializerOptions,
) -> OutputOptions {
    let mut merged = existing.unwrap_or_default();
    merged.output = resolved.output_mode.clone().or(merged.output);
    merged.include_source_maps = Some(resolved.include_source_maps);
    merged.include_bytecode = Some(resolved.include_bytecode);
    merged
}

/// Install a composed pipeline as `config`'s serializer.
///
/// A serializer already present on the config becomes the pipeline's legacy
/// fallback; it never runs as an ordered stage, so a config ends up with
/// exactly one terminal serializer no matter how often this is called.
pub fn with_serializer_processors(
    mut config: BundlerConfig,
    processors: Vec<Option<SerialProcessor>>,
    options: PipelineOptions,
) -> BundlerConfig {
    let fallback = config.serializer.take();
    let pipeline = SerializerPipeline::new(&config, processors, fallback, options);
    config.serializer = Some(Arc::new(pipeline));
    config
}

/// The processor list every default pipeline starts from: the prelude
/// first, then environment injection when enabled.
///
/// The hole for a disabled environment processor is intentional; the
/// composer skips it.
pub fn default_processors(environment: Option<InlineEnvironment>) -> Vec<Option<SerialProcessor>> {
    vec![
        Some(prelude_processor()),
        environment.map(environment_processor),
    ]
}

/// Default entry point: register the canonical processors on `config`.
pub fn with_default_serializer(
    config: BundlerConfig,
    environment: Option<InlineEnvironment>,
    options: PipelineOptions,
) -> BundlerConfig {
    with_serializer_processors(config, default_processors(environment), options)
}
