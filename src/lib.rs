pub mod access;
pub mod avatar;
pub mod error;
pub mod models;
pub mod pet;
pub mod quiz;
pub mod random;
pub mod recorder;
pub mod report;
pub mod sensing;
pub mod settings;
pub mod store;
pub mod timer;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

use avatar::MonogramAvatar;
use quiz::QuestionBank;
use random::SharedRng;
use sensing::VirtualCamera;
use settings::{SessionSettings, SettingsStore};
use store::ProfileStore;
use timer::{SessionEvent, StudySessionController, TimerMode};

fn load_settings() -> Result<SessionSettings> {
    match std::env::var_os("FOCUSBOOST_SETTINGS") {
        Some(path) => {
            let store = SettingsStore::new(PathBuf::from(path))?;
            Ok(store.session())
        }
        None => Ok(SessionSettings::from_env()),
    }
}

/// Plays one countdown session for the first demo child on a virtual camera,
/// answering quizzes at random, then prints the record and the child's report.
async fn simulate(settings: SessionSettings, rng: SharedRng) -> Result<()> {
    let store = ProfileStore::with_demo_data(&MonogramAvatar)?;
    let controller = StudySessionController::new(
        store.clone(),
        settings,
        rng.clone(),
        Arc::new(QuestionBank::default()),
    );

    let child = store
        .list_children()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no child profiles to run a session for"))?;

    let mut events = controller.subscribe();
    controller
        .start_session(&child.id, TimerMode::Countdown)
        .await
        .with_context(|| format!("failed to start session for {}", child.name))?;

    let camera = VirtualCamera::available();
    if let Err(err) = controller.start_attention(&camera).await {
        warn!("Continuing without attention tracking: {err}");
    }

    let session = loop {
        match events.recv().await {
            Ok(SessionEvent::QuizOpened { question, .. }) => {
                let pick = rng.index(question.options.len()).unwrap_or(0);
                if let Err(err) = controller.answer(pick).await {
                    warn!("Quiz answer rejected: {err}");
                }
            }
            Ok(SessionEvent::MinuteElapsed {
                elapsed_minutes, ..
            }) => {
                let attention = controller.get_state().await.attention;
                info!(
                    "{} min in, attention {:.0}: {} {}",
                    elapsed_minutes,
                    attention,
                    pet::AttentionLevel::from_attention(attention).message(),
                    pet::PetMood::from_attention(attention).message()
                );
            }
            Ok(SessionEvent::SessionCompleted { session }) => break session,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!("Skipped {skipped} session events"),
            Err(RecvError::Closed) => return Err(anyhow!("session event stream closed")),
        }
    };

    println!("{}", serde_json::to_string_pretty(&session)?);
    let report = store.child_report(&child.id).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    tokio::time::sleep(controller.settings().end_navigation_delay()).await;
    info!("Returning to profile selection");
    controller.shutdown().await;
    store.close()?;
    Ok(())
}

pub fn run() -> Result<()> {
    // Reads RUST_LOG module directives; the base level stays at info.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("FocusBoost starting up...");

    let settings = load_settings()?;
    let rng = SharedRng::from_env();

    // Single-threaded: every timer and state change runs on this thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(simulate(settings, rng))
}
