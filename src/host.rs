//! Interfaces to the VM that the engine runs inside of.
//!
//! A hook dispatcher wraps the VM's current frame (for Lua, the `lua_State`
//! plus its activation record) in a type implementing [`HookContext`] and
//! hands it to the engine.

use crate::{
    error::EvaluationError,
    store::{Line, SourceHandle},
    value::GuestValue,
};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum::EnumString;

pub trait Evaluator {
    /// Runs `script` as a chunk in the scope of the current frame and returns
    /// all of its results in order.
    ///
    /// The script may execute arbitrary guest code, including code that calls
    /// back into the engine.
    fn evaluate(&mut self, script: &str) -> Result<Vec<GuestValue>, EvaluationError>;

    /// The guest's string conversion (`tostring` and the like).
    fn to_display_text(&mut self, value: &GuestValue) -> Result<String, EvaluationError> {
        Ok(value.to_string())
    }
}

pub trait OutputSink {
    /// Implementations append the trailing newline if the client expects one.
    fn emit(&mut self, category: OutputCategory, text: &str);
}

/// Read-only introspection of the current frame. Implementations must not run
/// guest code.
pub trait DebugInfoProvider {
    fn current_line(&mut self) -> Option<Line>;

    /// The identity of the executing function, usually its runtime address.
    fn function_identity(&mut self) -> Option<FunctionId>;
    fn source_descriptor(&mut self) -> Option<SourceDescriptor>;

    /// A token that changes whenever the guest's collector may have reclaimed
    /// function objects, making [`FunctionId`]s reusable. `None` means the
    /// host can't tell.
    fn collection_epoch(&mut self) -> Option<u64> {
        None
    }
}

pub trait HookContext: Evaluator + OutputSink + DebugInfoProvider {}
impl<T: Evaluator + OutputSink + DebugInfoProvider + ?Sized> HookContext for T {}

pub trait PathConverter {
    /// Maps a raw source descriptor of a named chunk to the path the client
    /// knows the file by.
    fn convert(&self, source: &str) -> Option<String>;
}
impl<F: Fn(&str) -> Option<String>> PathConverter for F {
    fn convert(&self, source: &str) -> Option<String> {
        self(source)
    }
}

/// Maps `@path/to/file` to `path/to/file` and nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkNamePathConverter;
impl PathConverter for ChunkNamePathConverter {
    fn convert(&self, source: &str) -> Option<String> {
        source
            .strip_prefix('@')
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, PartialEq)]
#[display(fmt = "<function {:#x}>", _0)]
pub struct FunctionId(usize);

/// What the VM's debug info says about where a function was defined.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceDescriptor {
    /// For Lua, `@file.lua` and `=name` denote named chunks. Anything else is
    /// the source code itself.
    pub source: String,

    /// Identifies the chunk for as long as it is loaded. Lua uses the address
    /// of the source string.
    pub handle: Option<SourceHandle>,
}

/// Output categories as defined by the Debug Adapter Protocol's `output`
/// event.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputCategory {
    Console,
    Important,
    #[default]
    Stdout,
    Stderr,
    Telemetry,
}
