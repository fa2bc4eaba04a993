use crate::{
    breakpoint::{Breakpoint, BreakpointDefinition},
    condition::ConditionEvaluator,
    config::EngineConfig,
    function_cache::{FunctionBinding, FunctionBreakpointCache},
    host::{DebugInfoProvider, HookContext, PathConverter},
    store::{BreakpointStore, Line, SourceKey},
};
use std::cell::RefCell;

/// The entry point for both the protocol layer and the VM's hook dispatcher.
///
/// All methods take `&self`: guest code evaluated for a condition or log
/// message may call back into the engine (usually through an `Rc` the host
/// keeps next to the VM) and change breakpoints while a line is being checked.
/// The engine is single-threaded; use one per VM.
pub struct BreakpointEngine {
    config: EngineConfig,
    store: RefCell<BreakpointStore>,
    functions: RefCell<FunctionBreakpointCache>,
    conditions: ConditionEvaluator,
    path_converter: Box<dyn PathConverter>,
}

impl BreakpointEngine {
    pub fn new(config: EngineConfig, path_converter: impl PathConverter + 'static) -> Self {
        Self {
            store: RefCell::default(),
            functions: RefCell::new(FunctionBreakpointCache::new(config.function_cache)),
            conditions: ConditionEvaluator::new(config.log_category),
            path_converter: Box::new(path_converter),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Adds or replaces breakpoints of one source. Existing breakpoints at
    /// lines that aren't mentioned stay as they are; call
    /// [`on_clear_source`](Self::on_clear_source) first to replace the whole
    /// set.
    pub fn on_set_breakpoints(
        &self,
        source: &SourceKey,
        breakpoints: impl IntoIterator<Item = (Line, BreakpointDefinition)>,
    ) {
        let mut store = self.store.borrow_mut();
        for (line, definition) in breakpoints {
            store.add(source, line, &definition);
        }
    }

    pub fn on_clear_source(&self, source: &SourceKey) {
        self.store.borrow_mut().clear_source(source);
    }

    pub fn on_clear_all(&self) {
        self.store.borrow_mut().clear();
        // Cached bindings point to the tables that were just dropped.
        self.functions.borrow_mut().invalidate();
    }

    /// Called for every executed line. Returns whether execution should pause.
    pub fn on_line<C: HookContext + ?Sized>(&self, context: &mut C) -> bool {
        let Some(line) = context.current_line() else {
            return false;
        };
        // Checked here as well so that most lines don't even touch the
        // function cache.
        if !self.may_have_breakpoint(line) {
            return false;
        }
        let Some(binding) = self.resolve_function(context) else {
            return false;
        };
        self.conditions
            .should_pause(&self.store, &binding.table, line, context)
    }

    /// Called when a function is entered or returned to.
    ///
    /// Returns the function's binding if its source has breakpoints. The
    /// dispatcher can skip line hooks for the function otherwise.
    pub fn on_call<D: DebugInfoProvider + ?Sized>(
        &self,
        context: &mut D,
    ) -> Option<FunctionBinding> {
        self.resolve_function(context)
    }

    fn resolve_function<D: DebugInfoProvider + ?Sized>(
        &self,
        context: &mut D,
    ) -> Option<FunctionBinding> {
        let mut store = self.store.borrow_mut();
        self.functions.borrow_mut().resolve(
            &mut store,
            &self.config,
            self.path_converter.as_ref(),
            context,
        )
    }

    #[must_use]
    pub fn may_have_breakpoint(&self, line: Line) -> bool {
        self.store.borrow().may_have_breakpoint(line)
    }

    #[must_use]
    pub fn hit_count(&self, source: &SourceKey, line: Line) -> Option<u64> {
        self.store.borrow().get(source)?.hit_count(line)
    }

    /// The breakpoints of a source, sorted by line.
    #[must_use]
    pub fn breakpoints(&self, source: &SourceKey) -> Vec<(Line, Breakpoint)> {
        self.store
            .borrow()
            .get(source)
            .map(|table| table.entries())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.store.borrow().source_count()
    }
    #[must_use]
    pub fn cached_function_count(&self) -> usize {
        self.functions.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.borrow().activation_index().is_empty()
    }
}
