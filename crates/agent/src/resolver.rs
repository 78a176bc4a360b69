//! Tool resolver: approximate matching of action names to tools.
//!
//! Models misspell tool names (`get_whether`, `/get_weather`), so names are
//! compared with a Jaro similarity and the first tool above
//! [`SIMILARITY_THRESHOLD`] in registration order is taken.

use plugchain_core::tool::{Tool, ToolSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum similarity (exclusive) for a tool name to count as a match.
pub const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Jaro similarity of two strings, in `[0, 1]`.
///
/// Identical strings score 1, strings sharing no characters (within the
/// match window) score 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    let (len1, len2) = (s1.len(), s2.len());
    if len1 == 0 || len2 == 0 {
        return 0.0;
    }

    let window = (len1.max(len2) / 2) as isize - 1;
    let mut matched1 = vec![false; len1];
    let mut matched2 = vec![false; len2];
    let mut matches = 0usize;

    for i in 0..len1 {
        let lo = (i as isize - window).max(0) as usize;
        let hi = (i as isize + window + 1).clamp(0, len2 as isize) as usize;
        for j in lo..hi {
            if s1[i] == s2[j] && !matched2[j] {
                matched1[i] = true;
                matched2[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut point = 0usize;
    for i in 0..len1 {
        if !matched1[i] {
            continue;
        }
        while !matched2[point] {
            point += 1;
        }
        if s1[i] != s2[point] {
            transpositions += 1;
        }
        point += 1;
    }

    let m = matches as f64;
    let t = transpositions as f64 / 2.0;
    (m / len1 as f64 + m / len2 as f64 + (m - t) / m) / 3.0
}

/// Find the tool the model meant by `action_name`.
///
/// Returns the *first* tool scoring above the threshold, not the best one.
pub fn resolve<'a>(action_name: &str, tools: &'a ToolSet) -> Option<&'a Arc<dyn Tool>> {
    let found = tools
        .iter()
        .find(|tool| similarity(tool.name(), action_name) > SIMILARITY_THRESHOLD);
    match found {
        Some(tool) => debug!(action = %action_name, tool = %tool.name(), "Resolved tool"),
        None => warn!(action = %action_name, "No tool matches action"),
    }
    found
}

/// Observation returned when no tool matches.
pub fn invalid_tool_observation(action_name: &str) -> String {
    format!("ERROR! {action_name} is not a valid tool. Try again with different tool!")
}

/// Resolve `action_name` and call the tool, always yielding an observation.
pub async fn use_tool(action_name: &str, input: &str, tools: &ToolSet) -> String {
    match resolve(action_name, tools) {
        Some(tool) => tool.call(input).await,
        None => invalid_tool_observation(action_name),
    }
}
