//! Structured bundle assets and the adapter that produces them.
//!
//! The structured output path hands the final parameters to an external
//! chunk serializer, which splits the graph into physical artifacts. This
//! crate treats those artifacts as opaque: it collects them, forwards them
//! raw to capable callers, and JSON-encodes them for everyone else.

use anyhow::{Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{config::BundlerConfig, params::SerializerParams};

/// One named artifact of a structured serialization: a JS chunk, a source
/// map, or a bytecode blob.
///
/// The `asset_type` discriminant and the `metadata` schema are owned by the
/// chunk serializer that produced the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialAsset {
    /// Discriminant naming the asset kind (`"js"`, `"map"`, `"bytecode"`, ...).
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Output filename for the asset.
    pub filename: String,
    /// Asset payload, opaque to the pipeline.
    pub contents: String,
    /// Producer-owned extra fields.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl SerialAsset {
    pub fn new(
        asset_type: impl Into<String>,
        filename: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            asset_type: asset_type.into(),
            filename: filename.into(),
            contents: contents.into(),
            metadata: IndexMap::new(),
        }
    }
}

/// Options forwarded to the chunk serializer.
#[derive(Debug, Clone, Default)]
pub struct ChunkSerializeOptions {
    pub include_source_maps: bool,
    pub include_bytecode: bool,
    /// Construction-time extras merged in verbatim. The pipeline never
    /// reads these; their meaning belongs to the chunk serializer.
    pub extras: IndexMap<String, serde_json::Value>,
}

/// Adapter that turns a resolved graph into physical asset chunks.
///
/// Implementations live outside this crate. Contract: deterministic for a
/// given input, and the returned order is preserved all the way to the JSON
/// wire form, so text consumers can parse the sequence back losslessly.
#[async_trait]
pub trait ChunkSerializer: Send + Sync {
    async fn serialize_chunks(
        &self,
        config: &BundlerConfig,
        options: &ChunkSerializeOptions,
        params: &SerializerParams,
    ) -> Result<Vec<SerialAsset>>;
}

/// Encode an asset sequence for callers that only accept a text body.
///
/// The wire contract: parsing the returned string yields the same sequence,
/// in the same order.
pub fn assets_to_json(assets: &[SerialAsset]) -> Result<String> {
    serde_json::to_string(assets).context("failed to encode serial assets as JSON")
}
