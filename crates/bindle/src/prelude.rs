//! Bundle bootstrap prelude.
//!
//! The prelude processor must be the first entry of any default processor
//! list: later processors and the default formatter assume the bootstrap
//! pre-module is already in place.

use log::debug;

use crate::{
    graph::Module,
    processor::{SerialProcessor, processor},
};

/// Path of the synthesized bootstrap module.
pub const PRELUDE_PATH: &str = "__prelude__";

/// Bootstrap source for a bundle.
///
/// Declares the globals the module wrapper relies on and pins
/// `process.env.NODE_ENV` to the build flavor, without clobbering an
/// environment the host runtime already provides.
fn prelude_source(dev: bool) -> String {
    let node_env = if dev { "development" } else { "production" };
    format!(
        "var __DEV__={dev},__BUNDLE_START_TIME__=Date.now();\n\
         var process=this.process||{{}};process.env=process.env||{{}};\n\
         process.env.NODE_ENV=process.env.NODE_ENV||'{node_env}';"
    )
}

/// Processor that prepends the bootstrap pre-module.
pub fn prelude_processor() -> SerialProcessor {
    processor(|mut params| {
        let dev = params.options.dev;
        debug!("prepending bundle prelude (dev={dev})");
        params
            .pre_modules
            .insert(0, Module::new(PRELUDE_PATH, prelude_source(dev)));
        Ok(params)
    })
}
