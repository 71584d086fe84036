// Shared prompt fragments. Each feature keeps its own prompts.rs alongside it;
// only cross-cutting text lives here.

/// System prompt sent with every chat-completion call.
pub const PSYCHOLOGIST_SYSTEM: &str = "You are a psychologist analyzing personality.";

/// Appended to prompts whose answer is shown to a person verbatim.
pub const PLAIN_TEXT_INSTRUCTION: &str =
    "Respond with plain text only: no markdown, no headings, no explanations of your reasoning.";
