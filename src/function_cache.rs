use crate::{
    config::{EngineConfig, FunctionCacheMode},
    host::{DebugInfoProvider, FunctionId, PathConverter, SourceDescriptor},
    store::{BreakpointStore, SourceBreakpointTable, SourceKey},
};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// The breakpoint table that a guest function's lines are checked against.
#[derive(Clone, Debug)]
pub struct FunctionBinding {
    pub source: SourceKey,
    pub table: Rc<SourceBreakpointTable>,
}

/// Remembers which source each function belongs to so that repeated calls
/// skip asking the VM for debug info.
///
/// Entries are keyed by function address. Those are only unique until the
/// guest's collector runs, so the whole cache is dropped whenever the host
/// reports a new collection epoch (see [`FunctionCacheMode`]).
#[derive(Debug, Default)]
pub struct FunctionBreakpointCache {
    mode: FunctionCacheMode,
    epoch: Option<u64>,
    /// `None` marks functions that can't have breakpoints.
    bindings: FxHashMap<FunctionId, Option<FunctionBinding>>,
}

impl FunctionBreakpointCache {
    #[must_use]
    pub fn new(mode: FunctionCacheMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Returns the binding of the executing function if its source currently
    /// has any breakpoints.
    ///
    /// The binding is remembered even if there are no breakpoints yet, and
    /// its table picks up breakpoints added later.
    pub fn resolve<D: DebugInfoProvider + ?Sized>(
        &mut self,
        store: &mut BreakpointStore,
        config: &EngineConfig,
        path_converter: &dyn PathConverter,
        context: &mut D,
    ) -> Option<FunctionBinding> {
        let function = context.function_identity()?;

        let use_cache = self.sync_epoch(context);
        let binding = match self.bindings.get(&function) {
            Some(binding) if use_cache => binding.clone(),
            _ => {
                let descriptor = context.source_descriptor()?;
                let binding = bind(store, config, path_converter, &descriptor);
                trace!(
                    "Resolved {function} to {}.",
                    binding
                        .as_ref()
                        .map_or_else(|| "nothing".to_string(), |it| it.source.to_string()),
                );
                if use_cache {
                    self.bindings.insert(function, binding.clone());
                }
                binding
            }
        };
        binding.filter(|it| !it.table.is_empty())
    }

    pub fn invalidate(&mut self) {
        if !self.bindings.is_empty() {
            debug!("Forgetting {} function bindings.", self.bindings.len());
        }
        self.bindings.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drops stale bindings and returns whether caching is possible right now.
    fn sync_epoch<D: DebugInfoProvider + ?Sized>(&mut self, context: &mut D) -> bool {
        match self.mode {
            FunctionCacheMode::Disabled => false,
            FunctionCacheMode::PerCollectionEpoch => {
                let Some(epoch) = context.collection_epoch() else {
                    return false;
                };
                if self.epoch != Some(epoch) {
                    self.invalidate();
                    self.epoch = Some(epoch);
                }
                true
            }
        }
    }
}

fn bind(
    store: &mut BreakpointStore,
    config: &EngineConfig,
    path_converter: &dyn PathConverter,
    descriptor: &SourceDescriptor,
) -> Option<FunctionBinding> {
    let path = if config.is_named_chunk(&descriptor.source) {
        path_converter.convert(&descriptor.source)
    } else {
        None
    };
    let source = match path {
        Some(path) => SourceKey::Path(path),
        None => SourceKey::Handle(descriptor.handle?),
    };
    let table = store.lookup(&source);
    Some(FunctionBinding { source, table })
}
