// Prompt fragments shared by every backend call.
// Each extraction module keeps its own prompts.rs next to it; only the
// isolation wording that must be identical everywhere lives here.

/// System message sent with every chat-endpoint call.
pub const ISOLATION_SYSTEM: &str = "You are a fresh, isolated extraction agent. \
    This is a new, independent task with no previous context. \
    Ignore any previous conversations.";

/// Preamble placed at the top of every single-shot prompt.
pub const ISOLATION_PREAMBLE: &str = "IMPORTANT: This is a FRESH, ISOLATED task. \
Ignore all prior context, memory, or previous conversations.";

/// Wraps an instruction and a bounded resume excerpt into one self-contained prompt.
pub fn with_resume(instruction: &str, excerpt: &str) -> String {
    format!("{ISOLATION_PREAMBLE}\n\n{instruction}\n\nResume Text:\n{excerpt}")
}
