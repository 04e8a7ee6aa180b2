//! Composable post-processing between a resolved module graph and the
//! final bundle artifacts.
//!
//! A bundler front-end resolves and transforms modules; this crate takes it
//! from there. Ordered serial processors rewrite the serializer parameters,
//! then a terminal encoder produces either the legacy whole-bundle string
//! or a structured set of named assets, chosen per request from explicit
//! caller options or from the request URL.

pub mod assets;
pub mod bundle;
pub mod config;
pub mod environment;
pub mod graph;
pub mod jsc_safe_url;
pub mod params;
pub mod pipeline;
pub mod prelude;
pub mod processor;
pub mod resolve;
pub mod serializer;

pub use crate::{
    assets::{ChunkSerializeOptions, ChunkSerializer, SerialAsset},
    bundle::{BundleShape, CodeWithMap},
    config::BundlerConfig,
    environment::InlineEnvironment,
    graph::{Module, ModuleGraph},
    params::{OutputOptions, SerializerOptions, SerializerParams},
    pipeline::{
        PipelineOptions, SerializerPipeline, default_processors, with_default_serializer,
        with_serializer_processors,
    },
    processor::{SerialProcessor, processor},
    resolve::{OUTPUT_MODE_STATIC, ResolvedOptions, ResolvedSerializerOptions},
    serializer::{BundleSerializer, SerializedBundle, SerializerHooks},
};
