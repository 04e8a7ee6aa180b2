//! Serial processor contract.

use anyhow::Result;

use crate::params::SerializerParams;

/// One composable rewrite of the serializer parameters.
///
/// Processors run strictly in list order, each consuming the previous
/// output, and must hand back a complete parameter set. Returning an error
/// aborts the whole pipeline; there is no recovery and no partial result.
pub type SerialProcessor = Box<dyn Fn(SerializerParams) -> Result<SerializerParams> + Send + Sync>;

/// Box a closure as a [`SerialProcessor`].
pub fn processor<F>(f: F) -> SerialProcessor
where
    F: Fn(SerializerParams) -> Result<SerializerParams> + Send + Sync + 'static,
{
    Box::new(f)
}
