use crate::{
    host::{Evaluator, HookContext, OutputCategory},
    log_template,
    store::{BreakpointStore, Line, SourceBreakpointTable},
};
use std::cell::RefCell;
use tracing::{debug, trace};

/// Decides whether execution pauses at a line, counting hits and printing
/// logpoints along the way.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConditionEvaluator {
    log_category: OutputCategory,
}

impl ConditionEvaluator {
    #[must_use]
    pub const fn new(log_category: OutputCategory) -> Self {
        Self { log_category }
    }

    /// Guest code evaluated here may add or remove breakpoints through the
    /// engine, so neither the store nor the table is borrowed while it runs.
    /// Everything after the lookup works on a copy of the breakpoint. The hit
    /// is recorded on the live breakpoint, and if the condition removed it,
    /// nothing is recorded and we don't pause.
    pub fn should_pause<C: HookContext + ?Sized>(
        &self,
        store: &RefCell<BreakpointStore>,
        table: &SourceBreakpointTable,
        line: Line,
        context: &mut C,
    ) -> bool {
        if !store.borrow().may_have_breakpoint(line) {
            return false;
        }
        let Some(breakpoint) = table.get(line) else {
            return false;
        };

        if let Some(condition) = &breakpoint.condition {
            if !evaluate_predicate(context, condition) {
                return false;
            }
        }

        let Some(hit_count) = table.record_hit(line) else {
            trace!("The breakpoint at line {line} was removed while evaluating its condition.");
            return false;
        };

        if let Some(hit_condition) = &breakpoint.hit_condition {
            if !evaluate_predicate(context, &format!("{hit_count} {hit_condition}")) {
                return false;
            }
        }

        if let Some(log_message) = &breakpoint.log_message {
            let text = log_template::interpolate(context, log_message).unwrap_or_else(|error| {
                debug!("Log message at line {line} failed: {error}");
                error.to_string()
            });
            context.emit(self.log_category, &text);
            return false;
        }

        true
    }
}

/// Whether `return <expression>` yields the boolean `true` as its first value.
fn evaluate_predicate<E: Evaluator + ?Sized>(evaluator: &mut E, expression: &str) -> bool {
    match evaluator.evaluate(&format!("return {expression}")) {
        Ok(values) => values.first().map_or(false, |value| value.is_true()),
        Err(error) => {
            trace!("Evaluating `{expression}` failed: {error}");
            false
        }
    }
}
