//! A stand-in for a VM frame, with a tiny expression language: integer,
//! string, boolean and `nil` literals, locals, and a single comparison
//! (`==`, `~=`, `<`, `<=`, `>`, `>=`). Unknown locals are `nil`, as in Lua.

use crate::{
    error::EvaluationError,
    host::{DebugInfoProvider, Evaluator, FunctionId, OutputCategory, OutputSink, SourceDescriptor},
    store::{Line, SourceHandle},
    value::GuestValue,
};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

#[derive(Default)]
pub struct FakeFrame {
    pub line: Option<Line>,
    pub function: Option<FunctionId>,
    pub source: Option<SourceDescriptor>,
    pub epoch: Option<u64>,
    pub locals: FxHashMap<String, GuestValue>,

    /// Runs before each evaluation, like guest code with side effects.
    pub on_evaluate: Option<Box<dyn FnMut(&str)>>,

    pub scripts: Vec<String>,
    pub output: Vec<(OutputCategory, String)>,
    pub debug_info_queries: usize,
}

impl FakeFrame {
    /// A frame in a function with the given identity, defined in the named
    /// chunk `@{path}`.
    pub fn in_file(path: &str, function: usize, line: Line) -> Self {
        Self {
            line: Some(line),
            function: Some(FunctionId::from(function)),
            source: Some(SourceDescriptor {
                source: format!("@{path}"),
                handle: Some(SourceHandle::from(function as isize)),
            }),
            epoch: Some(0),
            ..Default::default()
        }
    }

    pub fn with_local(mut self, name: &str, value: GuestValue) -> Self {
        self.locals.insert(name.to_string(), value);
        self
    }

    pub fn printed(&self) -> Vec<&str> {
        self.output.iter().map(|(_, text)| text.as_str()).collect()
    }

    fn evaluate_expression(&self, expression: &str) -> Result<GuestValue, EvaluationError> {
        for (index, _) in expression.char_indices() {
            for operator in ["==", "~=", ">=", "<=", ">", "<"] {
                if expression[index..].starts_with(operator) {
                    let left = self.evaluate_operand(&expression[..index])?;
                    let right = self.evaluate_operand(&expression[index + operator.len()..])?;
                    return Self::compare(operator, &left, &right).map(GuestValue::Boolean);
                }
            }
        }
        self.evaluate_operand(expression)
    }

    fn evaluate_operand(&self, operand: &str) -> Result<GuestValue, EvaluationError> {
        let operand = operand.trim();
        if let Ok(value) = operand.parse::<i64>() {
            return Ok(GuestValue::Integer(value));
        }
        match operand {
            "nil" => return Ok(GuestValue::Nil),
            "true" => return Ok(GuestValue::Boolean(true)),
            "false" => return Ok(GuestValue::Boolean(false)),
            _ => {}
        }
        if let Some(text) = operand
            .strip_prefix('"')
            .and_then(|it| it.strip_suffix('"'))
        {
            return Ok(GuestValue::String(text.to_string()));
        }
        if !operand.is_empty() && operand.chars().all(|it| it.is_alphanumeric() || it == '_') {
            return Ok(self.locals.get(operand).cloned().unwrap_or(GuestValue::Nil));
        }
        Err(EvaluationError::Raised(format!(
            "unexpected symbol near '{operand}'",
        )))
    }

    fn compare(
        operator: &str,
        left: &GuestValue,
        right: &GuestValue,
    ) -> Result<bool, EvaluationError> {
        match operator {
            "==" => return Ok(left == right),
            "~=" => return Ok(left != right),
            _ => {}
        }
        let ordering = match (left, right) {
            (GuestValue::Integer(left), GuestValue::Integer(right)) => left.cmp(right),
            (GuestValue::String(left), GuestValue::String(right)) => left.cmp(right),
            _ => {
                return Err(EvaluationError::Raised(format!(
                    "attempt to compare {} with {}",
                    left.type_name(),
                    right.type_name(),
                )))
            }
        };
        Ok(match operator {
            "<" => ordering == Ordering::Less,
            "<=" => ordering != Ordering::Greater,
            ">" => ordering == Ordering::Greater,
            ">=" => ordering != Ordering::Less,
            _ => unreachable!(),
        })
    }
}

impl Evaluator for FakeFrame {
    fn evaluate(&mut self, script: &str) -> Result<Vec<GuestValue>, EvaluationError> {
        self.scripts.push(script.to_string());
        if let Some(on_evaluate) = &mut self.on_evaluate {
            on_evaluate(script);
        }
        let expression = script
            .strip_prefix("return ")
            .ok_or_else(|| EvaluationError::Raised("expected a return statement".to_string()))?;
        self.evaluate_expression(expression).map(|value| vec![value])
    }
}

impl OutputSink for FakeFrame {
    fn emit(&mut self, category: OutputCategory, text: &str) {
        self.output.push((category, text.to_string()));
    }
}

impl DebugInfoProvider for FakeFrame {
    fn current_line(&mut self) -> Option<Line> {
        self.line
    }

    fn function_identity(&mut self) -> Option<FunctionId> {
        self.debug_info_queries += 1;
        self.function
    }
    fn source_descriptor(&mut self) -> Option<SourceDescriptor> {
        self.debug_info_queries += 1;
        self.source.clone()
    }

    fn collection_epoch(&mut self) -> Option<u64> {
        self.epoch
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
