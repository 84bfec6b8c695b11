// Draft session lifecycle: the single source of truth for what the user
// has written for the active prompt.
//
// Owns the draft, the diagram scene, the session timer, and the debounced
// autosave machinery. Exactly one prompt is active at a time; switching
// prompts goes through `select_prompt`, which resets everything scoped to
// the session and bumps the epoch so in-flight async results from the
// previous session can be recognized and discarded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::catalog::Prompt;
use crate::protocol::PersistOutcome;
use crate::session::draft::{Draft, StoredDraft};
use crate::session::scene::DiagramScene;
use crate::session::sections::SectionId;
use crate::session::timer::SessionTimer;
use crate::store::{draft_key, DraftStore};

/// Status shown when a paste arrives with nothing in it.
pub const EMPTY_CLIPBOARD_STATUS: &str = "Clipboard is empty.";

// ---------------------------------------------------------------------------
// SessionManager
// ---------------------------------------------------------------------------

pub struct SessionManager {
    store: Arc<dyn DraftStore>,
    persist_tx: mpsc::Sender<PersistOutcome>,
    debounce: Duration,
    active_prompt_id: Option<String>,
    pub draft: Draft,
    pub scene: DiagramScene,
    pub timer: SessionTimer,
    /// Bumped on every prompt switch. Async work spawned for a session
    /// carries the epoch it started under; results are applied only if the
    /// epoch still matches.
    epoch: u64,
    /// The in-flight debounced autosave, if any. Replaced (aborted) by each
    /// new edit; detached — deliberately not aborted — on prompt switch so
    /// the final write still lands under the previous prompt's key.
    pending_persist: Option<JoinHandle<()>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn DraftStore>,
        persist_tx: mpsc::Sender<PersistOutcome>,
        debounce: Duration,
    ) -> Self {
        SessionManager {
            store,
            persist_tx,
            debounce,
            active_prompt_id: None,
            draft: Draft::default(),
            scene: DiagramScene::default(),
            timer: SessionTimer::default(),
            epoch: 0,
            pending_persist: None,
        }
    }

    pub fn active_prompt_id(&self) -> Option<&str> {
        self.active_prompt_id.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -----------------------------------------------------------------------
    // Prompt selection
    // -----------------------------------------------------------------------

    /// Make `prompt` the active session.
    ///
    /// Loads the previously persisted draft and scene for the prompt when a
    /// valid slot exists; otherwise initializes defaults (requirements
    /// section pre-filled from the prompt). Resets the timer and bumps the
    /// epoch. Persists nothing by itself.
    ///
    /// Returns `true` when a stored draft was restored.
    pub fn select_prompt(&mut self, prompt: &Prompt) -> bool {
        // Detach (don't abort) any pending autosave: it captured the
        // previous prompt's key and payload when it was scheduled, so
        // letting it finish cannot touch the new session.
        if let Some(handle) = self.pending_persist.take() {
            drop(handle);
        }

        let key = draft_key(&prompt.id);
        let mut restored = false;

        match self.store.load(&key) {
            Ok(Some(text)) => match serde_json::from_str::<StoredDraft>(&text) {
                Ok(stored) => {
                    self.draft = stored.sections;
                    self.scene = stored.board_scene.unwrap_or_default();
                    restored = true;
                }
                Err(e) => {
                    debug!("discarding malformed draft slot {key}: {e}");
                    self.draft = Draft::for_prompt(prompt);
                    self.scene = DiagramScene::default();
                }
            },
            Ok(None) => {
                self.draft = Draft::for_prompt(prompt);
                self.scene = DiagramScene::default();
            }
            Err(e) => {
                // Read failure degrades to a fresh draft, same as no slot.
                warn!("failed to load draft slot {key}: {e}");
                self.draft = Draft::for_prompt(prompt);
                self.scene = DiagramScene::default();
            }
        }

        self.active_prompt_id = Some(prompt.id.clone());
        self.timer.reset();
        self.epoch += 1;
        restored
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Replace one section's text and schedule an autosave.
    pub fn update_section(&mut self, section: SectionId, text: String) {
        self.draft.set_section(section, text);
        self.schedule_persist();
    }

    /// Empty one section (and schedule an autosave).
    pub fn clear_section(&mut self, section: SectionId) {
        self.update_section(section, String::new());
    }

    /// Append externally provided text (clipboard) to a section.
    ///
    /// Returns the status line to show. Whitespace-only input is rejected
    /// without touching the draft.
    pub fn paste_into_section(&mut self, section: SectionId, text: &str) -> String {
        if text.trim().is_empty() {
            return EMPTY_CLIPBOARD_STATUS.to_string();
        }
        let current = self.draft.section(section);
        let next = if current.is_empty() {
            text.to_string()
        } else {
            format!("{}\n{}", current.trim(), text)
        };
        self.draft.set_section(section, next);
        self.schedule_persist();
        format!("Pasted clipboard into {}.", section.title())
    }

    /// Adopt a new diagram scene from the widget (app state reduced to the
    /// whitelist) and schedule an autosave.
    pub fn update_board(&mut self, elements: Vec<serde_json::Value>, raw_app_state: &serde_json::Value) {
        self.scene = DiagramScene::from_widget(elements, raw_app_state);
        self.schedule_persist();
    }

    /// Reset the board to the default empty scene (and schedule an autosave).
    pub fn clear_board(&mut self) {
        self.scene = DiagramScene::default();
        self.schedule_persist();
    }

    /// The assembled draft document (export format and review input).
    pub fn document(&self) -> String {
        self.draft.document()
    }

    // -----------------------------------------------------------------------
    // Timer
    // -----------------------------------------------------------------------

    pub fn start_timer(&mut self) {
        self.timer.start();
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause();
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    /// One-second tick from the event loop; counts only while running.
    pub fn tick_timer(&mut self) {
        self.timer.tick();
    }

    // -----------------------------------------------------------------------
    // Autosave
    // -----------------------------------------------------------------------

    /// Trailing-edge debounce: cancel any pending write and schedule a new
    /// one carrying a snapshot of the current draft and scene. Only the
    /// last edit inside the window reaches storage.
    fn schedule_persist(&mut self) {
        let Some(prompt_id) = self.active_prompt_id.as_deref() else {
            return;
        };
        let key = draft_key(prompt_id);

        if let Some(handle) = self.pending_persist.take() {
            handle.abort();
        }

        let payload =
            match serde_json::to_string(&StoredDraft::new(self.draft.clone(), self.scene.clone())) {
                Ok(p) => p,
                Err(e) => {
                    // Draft and scene are plain data; serialization cannot
                    // realistically fail, but an autosave must never panic.
                    warn!("failed to serialize draft for {key}: {e}");
                    return;
                }
            };

        let store = Arc::clone(&self.store);
        let tx = self.persist_tx.clone();
        // Fix the debounce deadline at schedule time (the moment of the edit)
        // rather than at the spawned task's first poll, so the window is
        // deterministic under paused-time tests and matches the edit instant.
        let debounce = tokio::time::sleep(self.debounce);

        let handle = tokio::spawn(async move {
            debounce.await;
            let outcome = match store.save(&key, &payload) {
                Ok(()) => PersistOutcome::Saved { key },
                Err(e) => {
                    warn!("autosave failed for {key}: {e}");
                    PersistOutcome::Failed {
                        key,
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(outcome).await;
        });

        self.pending_persist = Some(handle);
    }

    /// Whether an autosave is currently waiting out its debounce window.
    pub fn has_pending_persist(&self) -> bool {
        self.pending_persist
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
