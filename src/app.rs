// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the front end,
// streaming LLM events from remote reviews, autosave outcomes from persist
// tasks, and the one-second session timer tick. Maintains the complete
// studio state and pushes UI updates to the front-end render loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::catalog::PromptCatalog;
use crate::config::Config;
use crate::llm::client::{ReviewClient, ReviewerSettings};
use crate::llm::prompt;
use crate::protocol::{LlmEvent, LlmStatus, PersistOutcome, PromptView, UiUpdate, UserCommand};
use crate::review::{self, ReviewResult};
use crate::session::manager::SessionManager;
use crate::store::{DraftStore, REVIEWER_KEY_SLOT, REVIEWER_MODEL_SLOT};

// ---------------------------------------------------------------------------
// StudioState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct StudioState {
    pub catalog: PromptCatalog,
    pub session: SessionManager,
    store: Arc<dyn DraftStore>,
    /// Default model from config; restored when the user clears the model.
    default_model: String,
    pub reviewer: ReviewerSettings,
    /// Review client for streaming remote review calls. Wrapped in Arc for
    /// sharing with spawned tasks.
    review_client: Arc<ReviewClient>,
    /// Sender for LLM events; spawned tasks use a clone of this sender to
    /// stream tokens back to the main event loop.
    llm_tx: mpsc::Sender<LlmEvent>,
    pub local_review: Option<ReviewResult>,
    pub ai_review_text: String,
    pub ai_status: LlmStatus,
    current_ai_task: Option<tokio::task::JoinHandle<()>>,
}

impl StudioState {
    /// Assemble the studio state. Reviewer settings start from config
    /// (credentials file + default model) and are overridden by values the
    /// user previously persisted through the store.
    pub fn new(
        config: &Config,
        catalog: PromptCatalog,
        store: Arc<dyn DraftStore>,
        llm_tx: mpsc::Sender<LlmEvent>,
        persist_tx: mpsc::Sender<PersistOutcome>,
    ) -> Self {
        let stored_key = load_setting(store.as_ref(), REVIEWER_KEY_SLOT);
        let stored_model = load_setting(store.as_ref(), REVIEWER_MODEL_SLOT);

        let reviewer = ReviewerSettings {
            api_key: stored_key.or_else(|| config.credentials.anthropic_api_key.clone()),
            model: stored_model.unwrap_or_else(|| config.reviewer.model.clone()),
            max_tokens: config.reviewer.max_tokens,
        };

        let session = SessionManager::new(
            Arc::clone(&store),
            persist_tx,
            Duration::from_millis(config.autosave.debounce_ms),
        );

        StudioState {
            catalog,
            session,
            store,
            default_model: config.reviewer.model.clone(),
            reviewer,
            review_client: Arc::new(ReviewClient::new()),
            llm_tx,
            local_review: None,
            ai_review_text: String::new(),
            ai_status: LlmStatus::Idle,
            current_ai_task: None,
        }
    }

    /// Cancel the in-flight remote review task, if any.
    pub fn cancel_ai_task(&mut self) {
        if let Some(handle) = self.current_ai_task.take() {
            handle.abort();
            info!("Cancelled in-flight remote review task");
        }
    }

    /// Switch the active session to `prompt_id`, clearing everything scoped
    /// to the previous session. Returns the view to push, or `None` when
    /// the id is not in the catalog.
    fn select_prompt(&mut self, prompt_id: &str) -> Option<PromptView> {
        let prompt = self.catalog.get(prompt_id)?.clone();

        // Results from the old session must not bleed into the new one.
        self.cancel_ai_task();
        self.local_review = None;
        self.ai_review_text.clear();
        self.ai_status = LlmStatus::Idle;

        let restored = self.session.select_prompt(&prompt);
        info!(
            "Selected prompt {} (restored draft: {})",
            prompt.id, restored
        );

        Some(PromptView {
            id: prompt.id,
            title: prompt.title,
            difficulty: prompt.difficulty,
            summary: prompt.summary,
            requirements: prompt.requirements,
            restored,
        })
    }

    /// Run the deterministic local review over the current draft snapshot.
    fn run_local_review(&mut self) -> Option<ReviewResult> {
        let prompt_id = self.session.active_prompt_id()?;
        let prompt = self.catalog.get(prompt_id)?;
        let result = review::run_review(&prompt.requirements, &self.session.draft);
        self.local_review = Some(result.clone());
        Some(result)
    }

    /// Start a streaming remote review of the current draft.
    ///
    /// Returns an error message instead of spawning when the credential is
    /// missing (a precondition failure, not a network one) or no prompt is
    /// active.
    fn trigger_remote_review(&mut self) -> Result<(), String> {
        let prompt = self
            .session
            .active_prompt_id()
            .and_then(|id| self.catalog.get(id))
            .ok_or_else(|| "No prompt selected.".to_string())?
            .clone();

        if self.reviewer.credential().is_none() {
            return Err(crate::llm::client::MISSING_KEY_ERROR.to_string());
        }

        self.cancel_ai_task();
        self.ai_review_text.clear();
        self.ai_status = LlmStatus::Streaming;

        let system = prompt::system_prompt();
        let user_content = prompt::build_review_prompt(&prompt, &self.session.document());
        let settings = self.reviewer.clone();
        let client = Arc::clone(&self.review_client);
        let tx = self.llm_tx.clone();
        let epoch = self.session.epoch();

        let handle = tokio::spawn(async move {
            if let Err(e) = client
                .stream_review(&settings, &system, &user_content, tx, epoch)
                .await
            {
                warn!("remote review task failed: {}", e);
            }
        });

        self.current_ai_task = Some(handle);
        info!("Triggered remote review for {} (epoch: {})", prompt.id, epoch);
        Ok(())
    }

    /// Persist one reviewer setting; storage failure is reported, not fatal.
    fn save_setting(&self, slot: &str, value: &str) -> Option<String> {
        match self.store.save(slot, value) {
            Ok(()) => None,
            Err(e) => {
                warn!("failed to persist reviewer setting {slot}: {e}");
                Some(format!("Could not save setting: {e}."))
            }
        }
    }
}

fn load_setting(store: &dyn DraftStore, slot: &str) -> Option<String> {
    match store.load(slot) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!("failed to load setting {slot}: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main studio event loop.
///
/// Listens on three channels plus the timer interval using
/// `tokio::select!`:
/// 1. User commands from the front end
/// 2. LLM streaming events from remote review tasks
/// 3. Autosave outcomes from debounced persist tasks
/// 4. A one-second tick, polled only while the session timer runs
///
/// Pushes UI updates through `ui_tx` for the front-end render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    mut persist_rx: mpsc::Receiver<PersistOutcome>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: StudioState,
) -> anyhow::Result<()> {
    info!("Studio event loop started");

    // Default selection: the first catalog prompt, through the same path a
    // user-driven switch takes.
    let first_id = state.catalog.first().id.clone();
    if let Some(view) = state.select_prompt(&first_id) {
        let _ = ui_tx.send(UiUpdate::PromptSelected(Box::new(view))).await;
    }

    // Track whether the LLM channel is still open. When it closes we stop
    // polling it so tokio::select! never spins on a closed channel.
    let mut llm_open = true;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(UserCommand::StartTimer) => {
                        // Reset the interval so the first tick lands a full
                        // second from now, not on a stale schedule.
                        ticker.reset();
                        state.session.start_timer();
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- LLM events (only poll while the channel is open) ---
            llm_event = llm_rx.recv(), if llm_open => {
                match llm_event {
                    Some(event) => {
                        handle_llm_event(&mut state, event, &ui_tx).await;
                    }
                    None => {
                        info!("LLM channel closed");
                        llm_open = false;
                    }
                }
            }

            // --- Autosave outcomes ---
            outcome = persist_rx.recv() => {
                if let Some(outcome) = outcome {
                    handle_persist_outcome(&outcome, &ui_tx).await;
                }
            }

            // --- Session timer tick ---
            _ = ticker.tick(), if state.session.timer.running => {
                state.session.tick_timer();
                let _ = ui_tx
                    .send(UiUpdate::TimerTick(state.session.timer.elapsed_seconds))
                    .await;
            }
        }
    }

    // Cleanup
    state.cancel_ai_task();
    info!("Studio event loop exiting");
    Ok(())
}

/// Handle a user command from the front end.
async fn handle_user_command(
    state: &mut StudioState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::SelectPrompt(id) => match state.select_prompt(&id) {
            Some(view) => {
                let _ = ui_tx.send(UiUpdate::PromptSelected(Box::new(view))).await;
            }
            None => {
                warn!("Unknown prompt id: {}", id);
                let _ = ui_tx.send(UiUpdate::PromptNotFound(id)).await;
            }
        },
        UserCommand::EditSection { section, text } => {
            state.session.update_section(section, text);
        }
        UserCommand::ClearSection(section) => {
            state.session.clear_section(section);
        }
        UserCommand::PasteIntoSection { section, text } => {
            let status = state.session.paste_into_section(section, &text);
            let _ = ui_tx.send(UiUpdate::Status(status)).await;
        }
        UserCommand::CopyDraft => {
            let _ = ui_tx
                .send(UiUpdate::DraftDocument(state.session.document()))
                .await;
        }
        UserCommand::BoardChanged { elements, app_state } => {
            state.session.update_board(elements, &app_state);
        }
        UserCommand::ClearBoard => {
            state.session.clear_board();
            let _ = ui_tx
                .send(UiUpdate::Status("Architecture board cleared.".to_string()))
                .await;
        }
        UserCommand::StartTimer => {
            // Normally intercepted by the loop (which also resets the
            // ticker); handle it here too so direct calls behave.
            state.session.start_timer();
        }
        UserCommand::PauseTimer => {
            state.session.pause_timer();
        }
        UserCommand::ResetTimer => {
            state.session.reset_timer();
        }
        UserCommand::RunLocalReview => match state.run_local_review() {
            Some(result) => {
                let _ = ui_tx.send(UiUpdate::LocalReview(result)).await;
                let _ = ui_tx
                    .send(UiUpdate::Status("Local review completed.".to_string()))
                    .await;
            }
            None => {
                let _ = ui_tx
                    .send(UiUpdate::Status("No prompt selected.".to_string()))
                    .await;
            }
        },
        UserCommand::RunRemoteReview => match state.trigger_remote_review() {
            Ok(()) => {
                let _ = ui_tx.send(UiUpdate::AiReviewStarted).await;
            }
            Err(message) => {
                state.ai_status = LlmStatus::Error;
                let _ = ui_tx.send(UiUpdate::AiReviewError(message)).await;
            }
        },
        UserCommand::SetReviewerKey(key) => {
            state.reviewer.api_key = Some(key.clone());
            if let Some(status) = state.save_setting(REVIEWER_KEY_SLOT, &key) {
                let _ = ui_tx.send(UiUpdate::Status(status)).await;
            }
        }
        UserCommand::SetReviewerModel(model) => {
            let trimmed = model.trim();
            state.reviewer.model = if trimmed.is_empty() {
                state.default_model.clone()
            } else {
                trimmed.to_string()
            };
            if let Some(status) = state.save_setting(REVIEWER_MODEL_SLOT, trimmed) {
                let _ = ui_tx.send(UiUpdate::Status(status)).await;
            }
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

/// Handle a streaming LLM event from a remote review task.
///
/// **Epoch check**: every event carries the session epoch captured when the
/// task was spawned. If it doesn't match the current epoch the user has
/// since switched prompts, and the event is silently discarded — stale
/// feedback never attaches to the wrong prompt.
///
/// A completed or failed review leaves any prior local review untouched.
async fn handle_llm_event(
    state: &mut StudioState,
    event: LlmEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if event.epoch() != state.session.epoch() {
        debug!(
            "Discarding stale LLM event (event epoch: {}, current: {})",
            event.epoch(),
            state.session.epoch()
        );
        return;
    }

    match event {
        LlmEvent::Token { text, .. } => {
            state.ai_review_text.push_str(&text);
            state.ai_status = LlmStatus::Streaming;
            let _ = ui_tx.send(UiUpdate::AiReviewToken(text)).await;
        }
        LlmEvent::Complete {
            full_text,
            stop_reason,
            ..
        } => {
            let text = if stop_reason.as_deref() == Some("max_tokens") {
                format!("{full_text}\n\n[Response truncated due to token limit]")
            } else {
                full_text
            };
            state.ai_review_text = text.clone();
            state.ai_status = LlmStatus::Complete;
            let _ = ui_tx.send(UiUpdate::AiReviewComplete(text)).await;
            let _ = ui_tx
                .send(UiUpdate::Status("AI review completed.".to_string()))
                .await;
        }
        LlmEvent::Error { message, .. } => {
            warn!("remote review error: {}", message);
            state.ai_status = LlmStatus::Error;
            let _ = ui_tx.send(UiUpdate::AiReviewError(message)).await;
        }
    }
}

/// Handle an autosave outcome from a persist task. Successful writes are
/// silent; failures surface as a status line and nothing more.
async fn handle_persist_outcome(outcome: &PersistOutcome, ui_tx: &mpsc::Sender<UiUpdate>) {
    match outcome {
        PersistOutcome::Saved { key } => {
            debug!("autosaved {key}");
        }
        PersistOutcome::Failed { key, message } => {
            warn!("autosave failed for {key}: {message}");
            let _ = ui_tx
                .send(UiUpdate::Status(format!(
                    "Autosave skipped: {message}. Your draft is kept in memory."
                )))
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
