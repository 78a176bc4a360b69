//! The structured form of one model completion.

use serde::{Deserialize, Serialize};

/// What the model asked for on a turn.
///
/// Either the loop ends with an answer, or a tool must be resolved and
/// invoked before the next turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedAction {
    /// The model produced an answer. No tool lookup happens.
    Final { answer: String, kind: FinalKind },

    /// The model wants to call a tool.
    Invoke { tool: String, input: String },
}

/// How a final answer was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalKind {
    /// The output carried the final-answer marker.
    Marked,
    /// Text following the last observation separator.
    AfterObservation,
    /// Nothing recognisable; the whole output is taken as the answer.
    Fallback,
}

impl ParsedAction {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final { .. })
    }

    /// The answer text for final actions, the tool input otherwise.
    pub fn input(&self) -> &str {
        match self {
            Self::Final { answer, .. } => answer,
            Self::Invoke { input, .. } => input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let action = ParsedAction::Invoke {
            tool: "get_weather".into(),
            input: "{\"city\":\"Paris\"}".into(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "invoke");
        assert_eq!(json["tool"], "get_weather");
        assert!(!action.is_final());
    }

    #[test]
    fn final_input_is_answer() {
        let action = ParsedAction::Final {
            answer: "Paris".into(),
            kind: FinalKind::Marked,
        };
        assert!(action.is_final());
        assert_eq!(action.input(), "Paris");
    }
}
