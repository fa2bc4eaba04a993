use crate::host::OutputCategory;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub function_cache: FunctionCacheMode,

    /// Where logpoints write to.
    pub log_category: OutputCategory,

    /// Source descriptors starting with one of these denote named chunks
    /// (files, or chunks with an explicit name) that are looked up by path.
    pub named_chunk_markers: Vec<char>,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            function_cache: FunctionCacheMode::default(),
            log_category: OutputCategory::Stdout,
            named_chunk_markers: vec!['@', '='],
        }
    }
}
impl EngineConfig {
    #[must_use]
    pub fn is_named_chunk(&self, source: &str) -> bool {
        source
            .chars()
            .next()
            .map_or(false, |first| self.named_chunk_markers.contains(&first))
    }
}

/// How function identities are mapped to breakpoint tables.
///
/// Function identities are addresses. Once the guest's collector frees a
/// function, another one may get the same address, and a cached binding would
/// then point to the wrong source.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionCacheMode {
    /// Cache bindings until the host reports a new collection epoch. Hosts
    /// that don't report epochs get no caching.
    #[default]
    PerCollectionEpoch,

    /// Resolve the function on every call and return event.
    Disabled,
}
