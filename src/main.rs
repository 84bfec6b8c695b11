// Practice studio entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the draft store
// 4. Load the prompt catalog
// 5. Create mpsc channels
// 6. Spawn the studio event loop task
// 7. Run the front end (blocking until quit)
// 8. Cleanup on exit

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use practice_studio::app;
use practice_studio::catalog::PromptCatalog;
use practice_studio::cli;
use practice_studio::config;
use practice_studio::store::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the interactive terminal)
    init_tracing()?;
    info!("Practice studio starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: catalog={}, autosave debounce {}ms",
        config.catalog.path, config.autosave.debounce_ms
    );

    // 3. Open the draft store
    let db_path = resolve_db_path(&config.storage.db_path)?;
    let store = Arc::new(
        SqliteStore::open(db_path.to_str().context("db path is not valid UTF-8")?)
            .context("failed to open draft store")?,
    );
    info!("Draft store opened at {}", db_path.display());

    // 4. Load the prompt catalog
    let catalog = PromptCatalog::load(std::path::Path::new(&config.catalog.path))
        .context("failed to load prompt catalog")?;
    info!("Loaded {} prompts", catalog.len());

    let prompt_index: Vec<cli::PromptIndexEntry> = catalog
        .list()
        .iter()
        .map(|p| (p.id.clone(), p.title.clone(), p.difficulty.label()))
        .collect();

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (persist_tx, persist_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // Assemble the studio state
    let state = app::StudioState::new(&config, catalog, store, llm_tx, persist_tx);

    // 6. Spawn the studio event loop task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, llm_rx, persist_rx, ui_tx, state).await {
            error!("Studio loop error: {}", e);
        }
    });

    // 7. Run the front end (blocks until the user quits)
    if let Err(e) = cli::run(ui_rx, cmd_tx, prompt_index).await {
        error!("Front end error: {}", e);
    }

    // 8. Cleanup: wait for the studio loop to drain (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Practice studio shut down cleanly");
    Ok(())
}

/// Resolve the draft store path: the configured path when set, otherwise a
/// per-user data directory.
fn resolve_db_path(configured: &str) -> anyhow::Result<PathBuf> {
    if !configured.is_empty() {
        return Ok(PathBuf::from(configured));
    }
    let dirs = directories::ProjectDirs::from("", "", "practice-studio")
        .context("could not determine a data directory; set storage.db_path in studio.toml")?;
    std::fs::create_dir_all(dirs.data_dir()).context("failed to create data directory")?;
    Ok(dirs.data_dir().join("practice-studio.db"))
}

/// Initialize tracing to a log file (stdout belongs to the front end).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("practice-studio.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("practice_studio=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
