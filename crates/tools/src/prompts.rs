//! Fixed prompt fragments wrapped around a compiled plugin description.

/// Header preceding the list of tools.
pub const TOOLS_PREFIX: &str = "TOOLS:\n-----\nYou have access to the following tools:\n\n";

/// Tool-use instructions appended after the plugin description.
///
/// Tells the model the exact `Action:` / `Action Input:` format the parser
/// understands and how to finish with a final answer.
pub fn instructions(final_answer_prefix: &str, observation_separator: &str) -> String {
    format!(
        "To use a tool, please use the following format:\n\
         \n\
         ```\n\
         Thought: Do I need to use a tool? Yes\n\
         Action: the action to take, should be one of the tools above\n\
         Action Input:\n\
         the input to the action, a JSON object with the tool parameters\n\
         {observation_separator} the result of the action\n\
         ```\n\
         \n\
         When you have a response for the user, or if you do not need to use a tool, \
         you MUST use the format:\n\
         \n\
         ```\n\
         Thought: Do I need to use a tool? No\n\
         {final_answer_prefix}: [your response here]\n\
         ```\n"
    )
}
