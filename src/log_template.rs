//! Log messages like `x = {x}, y = {y}`: literal text with `{expression}`
//! segments that are evaluated and spliced in.
//!
//! The scanner is a single pass over the template. A segment ends at the first
//! `}` after its `{`, so `{a{b}` is the expression `a{b`. A `}` outside of a
//! segment is literal text, and so is a `{` that is never closed.

use crate::{
    error::{EvaluationError, LogMessageError, TemplateError},
    host::Evaluator,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Segment<'t> {
    Literal(&'t str),
    /// `offset` is the byte offset of the opening brace.
    Expression { source: &'t str, offset: usize },
}

pub struct Segments<'t> {
    template: &'t str,
    position: usize,
    pending: Option<Segment<'t>>,
}

impl<'t> Segments<'t> {
    #[must_use]
    pub const fn new(template: &'t str) -> Self {
        Self {
            template,
            position: 0,
            pending: None,
        }
    }
}

impl<'t> Iterator for Segments<'t> {
    type Item = Result<Segment<'t>, TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(segment) = self.pending.take() {
            return Some(Ok(segment));
        }

        let rest = &self.template[self.position..];
        if rest.is_empty() {
            return None;
        }

        let Some(open) = rest.find('{') else {
            self.position = self.template.len();
            return Some(Ok(Segment::Literal(rest)));
        };
        let offset = self.position + open;
        let Some(length) = rest[open + 1..].find('}') else {
            self.position = self.template.len();
            return Some(Ok(Segment::Literal(rest)));
        };
        let source = &rest[open + 1..open + 1 + length];
        self.position = offset + length + 2;

        if source.trim().is_empty() {
            self.position = self.template.len();
            return Some(Err(TemplateError::EmptyExpression { offset }));
        }
        let expression = Segment::Expression { source, offset };
        if open == 0 {
            Some(Ok(expression))
        } else {
            self.pending = Some(expression);
            Some(Ok(Segment::Literal(&rest[..open])))
        }
    }
}

/// Renders a log message by evaluating each segment in the current frame.
///
/// Evaluation stops at the first failure.
pub fn interpolate<E: Evaluator + ?Sized>(
    evaluator: &mut E,
    template: &str,
) -> Result<String, LogMessageError> {
    let mut output = String::with_capacity(template.len());
    for segment in Segments::new(template) {
        match segment? {
            Segment::Literal(text) => output.push_str(text),
            Segment::Expression { source, .. } => {
                let script = format!("return {source}");
                let value = evaluator
                    .evaluate(&script)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| EvaluationError::NoValue {
                        expression: source.to_string(),
                    })?;
                output.push_str(&evaluator.to_display_text(&value)?);
            }
        }
    }
    Ok(output)
}
