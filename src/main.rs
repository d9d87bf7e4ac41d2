//! Application entry point — pocket-translate interactive console.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Open the persisted cache and history stores under the platform data
//!    directory.
//! 4. Build the live translator ([`ApiTranslator`]) from config.
//! 5. Spawn the orchestrator event loop.
//! 6. Run the read-eval loop on stdin until `:quit` or EOF.
//!
//! Any line that is not a command becomes the input text; the translation
//! appears once the debounce window closes and the request resolves.
//!
//! Commands:
//!
//! ```text
//! :src <code>    select source language
//! :tgt <code>    select target language
//! :swap          swap languages (seeds input with the previous result)
//! :now           translate immediately, skipping the debounce window
//! :clear         reset both panes
//! :offline on|off  toggle offline mode (persisted)
//! :net on|off    simulate a connectivity change
//! :langs         list supported languages
//! :history       show recent translations
//! :quit          exit
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use pocket_translate::{
    cache::TranslationCache,
    clock::{Clock, SystemClock},
    config::{AppConfig, AppPaths, OfflineModeFlag},
    connectivity::ConnectivityMonitor,
    history::HistoryStore,
    languages::SUPPORTED_LANGUAGES,
    orchestrator::{
        new_shared_state, OrchestratorEvent, SharedState, TranslationOrchestrator,
    },
    storage::{FileStorage, KvStorage},
    translate::{ApiTranslator, Translator},
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = AppPaths::new();
    let config = AppConfig::load().context("loading settings")?;
    log::info!(
        "pocket-translate starting ({} -> {}, offline mode {})",
        config.source_language,
        config.target_language,
        if config.offline_mode_enabled { "on" } else { "off" }
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache_storage: Arc<dyn KvStorage> = Arc::new(
        FileStorage::open(&paths.cache_file).context("opening translation cache")?,
    );
    let history_storage: Arc<dyn KvStorage> = Arc::new(
        FileStorage::open(&paths.history_file).context("opening translation history")?,
    );
    let cache = Arc::new(TranslationCache::new(cache_storage, Arc::clone(&clock)));
    let history = Arc::new(HistoryStore::new(history_storage, Arc::clone(&clock)));

    let translator: Arc<dyn Translator> = Arc::new(ApiTranslator::from_config(&config.translate));
    let connectivity = Arc::new(ConnectivityMonitor::new(true));
    let offline_flag = OfflineModeFlag::new(config.offline_mode_enabled);

    let state = new_shared_state(&config.source_language, &config.target_language);
    let orchestrator = TranslationOrchestrator::new(
        Arc::clone(&state),
        translator,
        cache,
        Arc::clone(&history),
        Arc::clone(&connectivity),
        offline_flag.subscribe(),
    )
    .with_debounce(Duration::from_millis(config.debounce_ms));

    let (event_tx, event_rx) = mpsc::channel(32);
    tokio::spawn(orchestrator.run(event_rx));

    run_repl(event_tx, state, connectivity, offline_flag, history, config).await
}

/// Debounce plus headroom for the live call before the result is printed.
const RESULT_WAIT: Duration = Duration::from_millis(700);

async fn run_repl(
    event_tx: mpsc::Sender<OrchestratorEvent>,
    state: SharedState,
    connectivity: Arc<ConnectivityMonitor>,
    offline_flag: OfflineModeFlag,
    history: Arc<HistoryStore>,
    mut config: AppConfig,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("pocket-translate — type text to translate, :langs for languages, :quit to exit");
    loop {
        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        let line = line.trim().to_string();

        if let Some(command) = line.strip_prefix(':') {
            let mut parts = command.split_whitespace();
            match (parts.next().unwrap_or(""), parts.next()) {
                ("quit", _) | ("q", _) => break,
                ("src", Some(code)) => {
                    event_tx
                        .send(OrchestratorEvent::SourceLanguageChanged(code.to_string()))
                        .await?;
                    config.source_language = code.to_string();
                    save_config(&config);
                }
                ("tgt", Some(code)) => {
                    event_tx
                        .send(OrchestratorEvent::TargetLanguageChanged(code.to_string()))
                        .await?;
                    config.target_language = code.to_string();
                    save_config(&config);
                }
                ("swap", _) => {
                    event_tx.send(OrchestratorEvent::SwapLanguages).await?;
                    tokio::time::sleep(RESULT_WAIT).await;
                    print_state(&state);
                }
                ("now", _) => {
                    event_tx.send(OrchestratorEvent::TranslateNow).await?;
                    tokio::time::sleep(RESULT_WAIT).await;
                    print_state(&state);
                }
                ("clear", _) => {
                    event_tx.send(OrchestratorEvent::Clear).await?;
                }
                ("offline", Some(value)) => {
                    let enabled = value == "on";
                    offline_flag.set(enabled);
                    config.offline_mode_enabled = enabled;
                    save_config(&config);
                }
                ("net", Some(value)) => {
                    connectivity.set_online(value == "on");
                }
                ("langs", _) => {
                    for lang in SUPPORTED_LANGUAGES {
                        println!("  {:6} {} ({})", lang.code, lang.label, lang.native_label);
                    }
                }
                ("history", _) => {
                    for entry in history.fetch().into_iter().take(10) {
                        println!(
                            "  [{} -> {}] {} => {}",
                            entry.source_language,
                            entry.target_language,
                            entry.source_text,
                            entry.target_text
                        );
                    }
                }
                _ => println!("unknown command: :{command}"),
            }
            continue;
        }

        event_tx
            .send(OrchestratorEvent::TextChanged(line))
            .await?;
        tokio::time::sleep(RESULT_WAIT).await;
        print_state(&state);
    }

    log::info!("pocket-translate exiting");
    Ok(())
}

fn print_state(state: &SharedState) {
    let state = state.lock().unwrap();
    if let Some(notice) = &state.notice {
        println!("! {notice}");
    } else if let Some(error) = &state.error_message {
        println!("! {error}");
    } else if !state.translated_text.is_empty() {
        println!(
            "[{} -> {}] {}",
            state.source_lang, state.target_lang, state.translated_text
        );
    } else {
        println!("({})", state.phase.label());
    }
}

fn save_config(config: &AppConfig) {
    if let Err(e) = config.save() {
        log::warn!("failed to persist settings: {e}");
    }
}
