use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A breakpoint as sent by the client in a `setBreakpoints` request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hit_condition: Option<String>,

    /// Text with `{expression}` segments. A non-empty log message turns the
    /// breakpoint into a logpoint, regardless of the other fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_message: Option<String>,
}

/// A registered breakpoint. Empty strings in the definition are stored as
/// `None`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Breakpoint {
    pub condition: Option<Rc<str>>,
    pub hit_condition: Option<Rc<str>>,
    pub log_message: Option<Rc<str>>,

    /// How often the condition held (or the line was reached, if there's no
    /// condition).
    pub hit_count: u64,
}

impl Breakpoint {
    #[must_use]
    pub fn new(definition: &BreakpointDefinition, hit_count: u64) -> Self {
        fn non_empty(text: &Option<String>) -> Option<Rc<str>> {
            text.as_deref()
                .filter(|text| !text.is_empty())
                .map(Rc::from)
        }

        Self {
            condition: non_empty(&definition.condition),
            hit_condition: non_empty(&definition.hit_condition),
            log_message: non_empty(&definition.log_message),
            hit_count,
        }
    }

    #[must_use]
    pub const fn is_logpoint(&self) -> bool {
        self.log_message.is_some()
    }
}
