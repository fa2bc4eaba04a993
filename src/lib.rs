//! Breakpoints for a debugger attached to a script VM.
//!
//! The protocol layer registers breakpoints per source through
//! [`BreakpointEngine::on_set_breakpoints`] and friends. The VM's hook
//! dispatcher calls [`BreakpointEngine::on_call`] on call/return events and
//! [`BreakpointEngine::on_line`] on every executed line. The latter runs in the
//! guest's hot path: lines without any breakpoint are rejected by a single
//! array lookup in the [`ActivationIndex`].

pub use self::{
    activation_index::ActivationIndex,
    breakpoint::{Breakpoint, BreakpointDefinition},
    condition::ConditionEvaluator,
    config::{EngineConfig, FunctionCacheMode},
    engine::BreakpointEngine,
    error::{EvaluationError, LogMessageError, TemplateError},
    function_cache::{FunctionBinding, FunctionBreakpointCache},
    host::{
        ChunkNamePathConverter, DebugInfoProvider, Evaluator, FunctionId, HookContext,
        OutputCategory, OutputSink, PathConverter, SourceDescriptor,
    },
    store::{BreakpointStore, Line, SourceBreakpointTable, SourceHandle, SourceKey},
    value::GuestValue,
};

pub mod activation_index;
mod breakpoint;
pub mod condition;
mod config;
mod engine;
mod error;
pub mod function_cache;
mod host;
pub mod log_template;
pub mod store;
#[cfg(test)]
mod testing;
mod value;
