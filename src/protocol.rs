// Shared message types for the channels connecting the front end, the
// studio event loop, and spawned background tasks.

use serde_json::Value;

use crate::catalog::Difficulty;
use crate::review::ReviewResult;
use crate::session::sections::SectionId;

// ---------------------------------------------------------------------------
// User commands
// ---------------------------------------------------------------------------

/// A discrete user action delivered to the studio event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Switch the active prompt (loads or initializes its draft).
    SelectPrompt(String),
    /// Replace one section's text.
    EditSection { section: SectionId, text: String },
    /// Convenience: empty one section.
    ClearSection(SectionId),
    /// Append clipboard text to a section. The front end owns clipboard
    /// access; by the time this command arrives the text is already read.
    PasteIntoSection { section: SectionId, text: String },
    /// Request the assembled draft document (for export/copy).
    CopyDraft,
    /// The diagram widget reported an edit: raw elements plus its full
    /// (unsanitized) app state.
    BoardChanged { elements: Vec<Value>, app_state: Value },
    /// Convenience: reset the board to the default empty scene.
    ClearBoard,
    StartTimer,
    PauseTimer,
    ResetTimer,
    /// Run the deterministic local review over the current draft.
    RunLocalReview,
    /// Start a streaming remote review of the current draft.
    RunRemoteReview,
    /// Update and persist the remote reviewer credential.
    SetReviewerKey(String),
    /// Update and persist the remote reviewer model id.
    SetReviewerModel(String),
    Quit,
}

// ---------------------------------------------------------------------------
// UI updates
// ---------------------------------------------------------------------------

/// Summary of the active prompt pushed to the front end on selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptView {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub summary: String,
    pub requirements: Vec<String>,
    /// Whether the draft was restored from storage (vs freshly initialized).
    pub restored: bool,
}

/// State changes pushed from the studio loop to the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    PromptSelected(Box<PromptView>),
    /// The requested prompt id does not exist; the session is unchanged.
    PromptNotFound(String),
    /// Transient, dismissible status line (autosave problems, clipboard
    /// results, review completion notices).
    Status(String),
    /// Full draft document in response to `CopyDraft`.
    DraftDocument(String),
    LocalReview(ReviewResult),
    AiReviewStarted,
    AiReviewToken(String),
    AiReviewComplete(String),
    AiReviewError(String),
    /// One elapsed second on the running session timer.
    TimerTick(u64),
}

// ---------------------------------------------------------------------------
// LLM streaming events
// ---------------------------------------------------------------------------

/// Lifecycle of a streaming remote review, as seen by the event loop.
///
/// Every event carries the epoch of the session that spawned the request;
/// events whose epoch no longer matches the active session are discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    Token { text: String, epoch: u64 },
    Complete {
        full_text: String,
        stop_reason: Option<String>,
        epoch: u64,
    },
    Error { message: String, epoch: u64 },
}

impl LlmEvent {
    pub fn epoch(&self) -> u64 {
        match self {
            LlmEvent::Token { epoch, .. } => *epoch,
            LlmEvent::Complete { epoch, .. } => *epoch,
            LlmEvent::Error { epoch, .. } => *epoch,
        }
    }
}

/// Remote review progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Error,
}

// ---------------------------------------------------------------------------
// Persistence outcomes
// ---------------------------------------------------------------------------

/// Result of a debounced autosave write, reported by the persist task.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Saved { key: String },
    Failed { key: String, message: String },
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_event_epoch_accessor() {
        let token = LlmEvent::Token {
            text: "x".into(),
            epoch: 3,
        };
        let complete = LlmEvent::Complete {
            full_text: "done".into(),
            stop_reason: None,
            epoch: 4,
        };
        let error = LlmEvent::Error {
            message: "boom".into(),
            epoch: 5,
        };
        assert_eq!(token.epoch(), 3);
        assert_eq!(complete.epoch(), 4);
        assert_eq!(error.epoch(), 5);
    }

    #[test]
    fn llm_status_defaults_to_idle() {
        assert_eq!(LlmStatus::default(), LlmStatus::Idle);
    }
}
