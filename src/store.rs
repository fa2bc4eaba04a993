use crate::{
    activation_index::ActivationIndex,
    breakpoint::{Breakpoint, BreakpointDefinition},
};
use derive_more::{Display, From};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};
use tracing::debug;

pub type Line = usize;

/// Identifies a chunk of guest code that has no client-visible path, such as
/// code loaded from a string.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
#[display(fmt = "<source {}>", _0)]
pub struct SourceHandle(isize);
impl SourceHandle {
    #[must_use]
    pub const fn value(self) -> isize {
        self.0
    }
}

#[derive(Clone, Debug, Display, Eq, From, Hash, PartialEq)]
pub enum SourceKey {
    #[display(fmt = "{}", _0)]
    Path(String),
    #[display(fmt = "{}", _0)]
    Handle(SourceHandle),
}
impl SourceKey {
    /// Interprets a protocol `Source`: the path if present, otherwise a
    /// positive `sourceReference`.
    #[must_use]
    pub fn from_protocol(path: Option<String>, source_reference: Option<i64>) -> Option<Self> {
        if let Some(path) = path {
            return Some(Self::Path(path));
        }
        source_reference
            .filter(|reference| *reference > 0)
            .and_then(|reference| isize::try_from(reference).ok())
            .map(|reference| Self::Handle(SourceHandle(reference)))
    }
}
impl From<&str> for SourceKey {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// The breakpoints of one source, keyed by line.
///
/// Tables are shared between the [`BreakpointStore`] and cached function
/// bindings. Accessors copy breakpoints out instead of lending references so
/// that guest code evaluated in between can mutate the table.
#[derive(Debug, Default)]
pub struct SourceBreakpointTable {
    breakpoints: RefCell<FxHashMap<Line, Breakpoint>>,
}

impl SourceBreakpointTable {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.borrow().is_empty()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.breakpoints.borrow().len()
    }

    #[must_use]
    pub fn get(&self, line: Line) -> Option<Breakpoint> {
        self.breakpoints.borrow().get(&line).cloned()
    }
    #[must_use]
    pub fn hit_count(&self, line: Line) -> Option<u64> {
        self.breakpoints.borrow().get(&line).map(|it| it.hit_count)
    }
    #[must_use]
    pub fn entries(&self) -> Vec<(Line, Breakpoint)> {
        self.breakpoints
            .borrow()
            .iter()
            .map(|(line, breakpoint)| (*line, breakpoint.clone()))
            .sorted_by_key(|(line, _)| *line)
            .collect()
    }

    /// Returns whether the line didn't have a breakpoint before.
    fn upsert(&self, line: Line, definition: &BreakpointDefinition) -> bool {
        let mut breakpoints = self.breakpoints.borrow_mut();
        match breakpoints.get_mut(&line) {
            Some(existing) => {
                *existing = Breakpoint::new(definition, existing.hit_count);
                false
            }
            None => {
                breakpoints.insert(line, Breakpoint::new(definition, 0));
                true
            }
        }
    }

    /// Increments the hit count and returns the new value, or `None` if there
    /// is no breakpoint at that line (anymore).
    pub(crate) fn record_hit(&self, line: Line) -> Option<u64> {
        let mut breakpoints = self.breakpoints.borrow_mut();
        let breakpoint = breakpoints.get_mut(&line)?;
        breakpoint.hit_count = breakpoint.hit_count.saturating_add(1);
        Some(breakpoint.hit_count)
    }

    fn take_lines(&self) -> Vec<Line> {
        self.breakpoints
            .borrow_mut()
            .drain()
            .map(|(line, _)| line)
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn insert_without_registering(&self, line: Line, breakpoint: Breakpoint) {
        self.breakpoints.borrow_mut().insert(line, breakpoint);
    }
}

/// All breakpoints, in two keyspaces that share one [`ActivationIndex`].
#[derive(Debug, Default)]
pub struct BreakpointStore {
    by_path: FxHashMap<String, Rc<SourceBreakpointTable>>,
    by_handle: FxHashMap<SourceHandle, Rc<SourceBreakpointTable>>,
    activation_index: ActivationIndex,
}

impl BreakpointStore {
    /// Adds a breakpoint or replaces the one at the same line. A replaced
    /// breakpoint keeps its hit count.
    ///
    /// Lines too large for the [`ActivationIndex`] are ignored.
    pub fn add(&mut self, source: &SourceKey, line: Line, definition: &BreakpointDefinition) {
        if !self.activation_index.grow_to(line) {
            debug!("Ignored breakpoint at {source}:{line}, which is out of range.");
            return;
        }
        let table = self.lookup(source);
        if table.upsert(line, definition) {
            debug!("Added breakpoint at {source}:{line}.");
            self.activation_index.register(line);
        } else {
            debug!("Replaced breakpoint at {source}:{line}.");
        }
    }

    /// Removes all breakpoints of one source. The (now empty) table stays
    /// registered so that functions bound to it see future breakpoints.
    pub fn clear_source(&mut self, source: &SourceKey) {
        let Some(table) = self.get(source) else {
            return;
        };
        let lines = table.take_lines();
        debug!("Removed {} breakpoints from {source}.", lines.len());
        for line in lines {
            self.activation_index.unregister(line);
        }
    }

    /// Removes everything, including the tables themselves.
    ///
    /// Tables that are still referenced elsewhere are emptied as well, so a
    /// stale reference never reports a breakpoint.
    pub fn clear(&mut self) {
        for table in self.by_path.values().chain(self.by_handle.values()) {
            table.take_lines();
        }
        self.by_path.clear();
        self.by_handle.clear();
        self.activation_index.reset();
        debug!("Removed all breakpoints.");
    }

    /// Returns the table of a source, creating an empty one if necessary.
    pub fn lookup(&mut self, source: &SourceKey) -> Rc<SourceBreakpointTable> {
        let table = match source {
            SourceKey::Path(path) => self.by_path.entry(path.clone()).or_default(),
            SourceKey::Handle(handle) => self.by_handle.entry(*handle).or_default(),
        };
        Rc::clone(table)
    }
    #[must_use]
    pub fn get(&self, source: &SourceKey) -> Option<&Rc<SourceBreakpointTable>> {
        match source {
            SourceKey::Path(path) => self.by_path.get(path),
            SourceKey::Handle(handle) => self.by_handle.get(handle),
        }
    }

    #[inline]
    #[must_use]
    pub fn may_have_breakpoint(&self, line: Line) -> bool {
        self.activation_index.may_have_breakpoint(line)
    }
    #[must_use]
    pub const fn activation_index(&self) -> &ActivationIndex {
        &self.activation_index
    }

    /// The number of known sources, including ones without breakpoints.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.by_path.len() + self.by_handle.len()
    }
}
