//! Action parser: free-form model output to a [`ParsedAction`].
//!
//! Model output is unreliable text, so parsing never fails. Rules, first
//! match wins:
//!
//! 1. `<final prefix>:` anywhere → final answer (text after its last occurrence)
//! 2. `Action: <name>` … `Action Input:` `<input>` → tool invocation
//! 3. observation separator present → final answer (text after its last occurrence)
//! 4. otherwise → the whole output as a final answer
//!
//! Triple-backtick fences are stripped before matching.

use plugchain_core::action::{FinalKind, ParsedAction};
use regex_lite::Regex;
use std::sync::LazyLock;

static ACTION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)Action: (.*?)[\n]*Action Input:\n?(.*)").ok());

/// Parses model completions using the session's markers.
#[derive(Debug, Clone)]
pub struct ActionParser {
    final_answer_prefix: String,
    observation_separator: String,
}

impl ActionParser {
    pub fn new(final_answer_prefix: impl Into<String>, observation_separator: impl Into<String>) -> Self {
        Self {
            final_answer_prefix: final_answer_prefix.into(),
            observation_separator: observation_separator.into(),
        }
    }

    pub fn parse(&self, output: &str) -> ParsedAction {
        let text = output.trim().replace("```", "");

        let marker = format!("{}:", self.final_answer_prefix);
        if let Some(idx) = text.rfind(&marker) {
            return ParsedAction::Final {
                answer: text[idx + marker.len()..].trim().to_string(),
                kind: FinalKind::Marked,
            };
        }

        if let Some(caps) = ACTION_RE.as_ref().and_then(|re| re.captures(&text)) {
            let tool = caps.get(1).map_or("", |m| m.as_str()).trim().replace('\'', "");
            let input = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            return ParsedAction::Invoke { tool, input };
        }

        if !self.observation_separator.is_empty() {
            if let Some(idx) = text.rfind(&self.observation_separator) {
                return ParsedAction::Final {
                    answer: text[idx + self.observation_separator.len()..].trim().to_string(),
                    kind: FinalKind::AfterObservation,
                };
            }
        }

        ParsedAction::Final {
            answer: text.trim().to_string(),
            kind: FinalKind::Fallback,
        }
    }
}

impl Default for ActionParser {
    fn default() -> Self {
        Self::new("Final Answer", "Observation:")
    }
}

/// Parse `output` with the given final-answer prefix and the default observation separator.
pub fn parse_action(output: &str, final_answer_prefix: &str) -> ParsedAction {
    ActionParser::new(final_answer_prefix, "Observation:").parse(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(tool: &str, input: &str) -> ParsedAction {
        ParsedAction::Invoke {
            tool: tool.into(),
            input: input.into(),
        }
    }

    #[test]
    fn final_answer_marker() {
        let action = parse_action("Final Answer: Paris", "Final Answer");
        assert_eq!(
            action,
            ParsedAction::Final {
                answer: "Paris".into(),
                kind: FinalKind::Marked
            }
        );
    }

    #[test]
    fn last_final_marker_wins() {
        let action = parse_action(
            "Final Answer: draft\nThought: hmm\nFinal Answer:  Lyon \n",
            "Final Answer",
        );
        assert_eq!(action.input(), "Lyon");
    }

    #[test]
    fn final_marker_beats_action() {
        let action = parse_action(
            "Action: get_weather\nAction Input:\n{}\nFinal Answer: done",
            "Final Answer",
        );
        assert!(action.is_final());
        assert_eq!(action.input(), "done");
    }

    #[test]
    fn action_with_json_input() {
        let action = parse_action(
            "Action: get_weather\nAction Input:\n{\"city\":\"Paris\"}",
            "Final Answer",
        );
        assert_eq!(action, invoke("get_weather", "{\"city\":\"Paris\"}"));
    }

    #[test]
    fn action_after_thought_with_blank_lines() {
        let output = "Thought: Do I need to use a tool? Yes\n\
                      Action: 'search_news'\n\n\
                      Action Input: {\"q\": \"rust\"}  ";
        assert_eq!(parse_action(output, "Final Answer"), invoke("search_news", "{\"q\": \"rust\"}"));
    }

    #[test]
    fn multiline_input_is_kept_whole() {
        let output = "Action: create\nAction Input:\n{\n  \"a\": 1,\n  \"b\": 2\n}\n";
        assert_eq!(
            parse_action(output, "Final Answer"),
            invoke("create", "{\n  \"a\": 1,\n  \"b\": 2\n}")
        );
    }

    #[test]
    fn code_fences_are_stripped() {
        let output = "```\nAction: get_news\nAction Input:\n{}\n```";
        assert_eq!(parse_action(output, "Final Answer"), invoke("get_news", "{}"));
    }

    #[test]
    fn text_after_observation_is_final() {
        let action = parse_action(
            "Observation: 21 degrees\nIt is 21 degrees in Paris.",
            "Final Answer",
        );
        assert_eq!(
            action,
            ParsedAction::Final {
                answer: "21 degrees\nIt is 21 degrees in Paris.".into(),
                kind: FinalKind::AfterObservation
            }
        );
    }

    #[test]
    fn garbage_falls_back_to_whole_output() {
        let action = parse_action("  I am not sure what you mean.  ", "Final Answer");
        assert_eq!(
            action,
            ParsedAction::Final {
                answer: "I am not sure what you mean.".into(),
                kind: FinalKind::Fallback
            }
        );
    }

    #[test]
    fn empty_input_never_panics() {
        for output in ["", "   ", "```", "Action:", "Action Input:", "Final Answer", "\u{0}\u{ffff}"] {
            let _ = parse_action(output, "Final Answer");
        }
        assert_eq!(parse_action("", "Final Answer").input(), "");
    }

    #[test]
    fn custom_prefix_and_separator() {
        let parser = ActionParser::new("Open Assistant", "Result:");
        assert_eq!(parser.parse("Open Assistant: hi").input(), "hi");
        assert_eq!(parser.parse("Result: 42").input(), "42");
    }
}
