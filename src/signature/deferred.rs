//! Deferred reference resolution
//!
//! Turns the parameter part of an encoded signature back into the literal it
//! stands for. `::class` constants are answered from the signature text alone;
//! any other deferred signature costs one index lookup plus literal extraction.

use super::is_deferred;
use crate::error::{Resolution, ResolveMiss};
use crate::index::ProjectIndex;
use tracing::debug;

/// Prefix of class-constant signatures
const CLASS_CONSTANT_PREFIX: &str = "#K#C";

/// Suffix written by current indexers: `#K#C\Foo\Bar.class`
const CLASS_SUFFIX: &str = ".class";

/// Suffix written by older indexers, which left the constant name empty:
/// `#K#C\Foo\Bar.`
const LEGACY_CLASS_SUFFIX: &str = ".";

/// Literal value a signature parameter denotes, if any
pub fn resolve_literal(index: &dyn ProjectIndex, parameter: &str) -> Option<String> {
    try_resolve_literal(index, parameter).ok()
}

pub fn try_resolve_literal(index: &dyn ProjectIndex, parameter: &str) -> Resolution<String> {
    if let Some(class) = class_constant_literal(parameter) {
        return Ok(class.to_string());
    }

    if !is_deferred(parameter) {
        return Ok(parameter.to_string());
    }

    let elements = index.lookup_by_signature(parameter);
    // First hit wins; ordering is the index's business.
    let Some(element) = elements.first() else {
        debug!("deferred signature {parameter} has no index match");
        return Err(ResolveMiss::not_found(parameter));
    };

    index.literal_value_of(element).ok_or_else(|| {
        debug!("deferred signature {parameter} resolved to a non-literal {element}");
        ResolveMiss::non_literal(parameter)
    })
}

/// Class path encoded in a `::class` constant signature
fn class_constant_literal(parameter: &str) -> Option<&str> {
    let path = parameter.strip_prefix(CLASS_CONSTANT_PREFIX)?;
    path.strip_suffix(CLASS_SUFFIX)
        .or_else(|| path.strip_suffix(LEGACY_CLASS_SUFFIX))
}
