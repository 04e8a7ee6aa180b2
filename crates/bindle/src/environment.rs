//! Inline environment variable injection.
//!
//! Whether this processor is part of a pipeline is decided once, at
//! construction, from an explicit option. The pipeline itself never reads
//! the process environment; callers that want `std::env::vars()` baked in
//! capture them at the call site via [`InlineEnvironment::with_prefix`].

use log::debug;

use crate::{
    graph::Module,
    processor::{SerialProcessor, processor},
};

/// Path of the synthesized environment module.
pub const ENV_MODULE_PATH: &str = "__env__";

/// Variables to bake into the bundle, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineEnvironment {
    pub vars: Vec<(String, String)>,
}

impl InlineEnvironment {
    pub fn new(vars: Vec<(String, String)>) -> Self {
        Self { vars }
    }

    /// Keep only variables whose name starts with `prefix`.
    ///
    /// Typical call site: `InlineEnvironment::with_prefix("PUBLIC_",
    /// std::env::vars())`, done by the embedder before pipeline
    /// construction.
    pub fn with_prefix(prefix: &str, vars: impl Iterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.filter(|(name, _)| name.starts_with(prefix)).collect(),
        }
    }
}

/// Source of the synthesized environment module.
///
/// Values go through JSON string encoding, which is also valid JS, so
/// quoting and escaping are never hand-rolled here.
fn environment_source(env: &InlineEnvironment) -> String {
    env.vars
        .iter()
        .map(|(name, value)| {
            let literal = serde_json::Value::String(value.clone()).to_string();
            format!("process.env.{name}={literal};")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Processor appending the environment pre-module.
///
/// Appends rather than prepends: the prelude must already have set up
/// `process.env` by the time this code runs.
pub fn environment_processor(env: InlineEnvironment) -> SerialProcessor {
    processor(move |mut params| {
        debug!("inlining {} environment variables", env.vars.len());
        params
            .pre_modules
            .push(Module::new(ENV_MODULE_PATH, environment_source(&env)));
        Ok(params)
    })
}
