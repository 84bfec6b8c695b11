// Prompt templates for remote draft reviews.
//
// The user prompt carries the selected design prompt's framing plus the
// candidate's assembled draft document, so the model reviews exactly what
// the local engine scores.

use crate::catalog::Prompt;

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Static system prompt for all remote review calls.
pub fn system_prompt() -> String {
    "You are an interview reviewer. Review system design answers. Provide: \
     (1) strengths, (2) risks/gaps, (3) top 5 improvements, (4) missing edge cases."
        .to_string()
}

// ---------------------------------------------------------------------------
// Review prompt
// ---------------------------------------------------------------------------

/// Build the user prompt for reviewing one draft against one design prompt.
pub fn build_review_prompt(prompt: &Prompt, draft_document: &str) -> String {
    let requirements = prompt
        .requirements
        .iter()
        .map(|req| format!("- {req}"))
        .collect::<Vec<_>>()
        .join("\n");

    [
        format!("Prompt: {}", prompt.title),
        format!("Summary: {}", prompt.summary),
        format!("Requirements:\n{requirements}"),
        format!("Candidate Draft:\n{draft_document}"),
    ]
    .join("\n\n")
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
