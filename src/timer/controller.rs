use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    error::{FocusError, FocusResult},
    models::FocusSession,
    pet::PetMood,
    quiz::{AnswerOutcome, QuestionBank, QuizEngine, QuizQuestion, QuizResult, QuizView},
    random::SharedRng,
    recorder::SessionRecorder,
    sensing::{AttentionController, AttentionSample, AttentionWalk, CaptureDevice},
    settings::SessionSettings,
    store::ProfileStore,
};

use super::{SessionState, SessionStatus, TimerMode};

const EVENT_CAPACITY: usize = 256;
const SAMPLE_BUFFER: usize = 16;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    StateChanged {
        state: SessionState,
    },
    MinuteElapsed {
        elapsed_minutes: u32,
        remaining_minutes: Option<u32>,
    },
    AttentionSampled {
        sample: AttentionSample,
        mood: PetMood,
    },
    QuizOpened {
        question: QuizQuestion,
        question_number: u32,
    },
    QuizAnswered {
        outcome: AnswerOutcome,
    },
    QuizClosed {
        result: QuizResult,
    },
    QuizTriggerDropped,
    SessionCompleted {
        session: FocusSession,
    },
}

type TaskSlot = Arc<Mutex<Option<JoinHandle<()>>>>;

/// How far the minute ticker is into its current minute, so a pause keeps
/// the partial minute rather than starting it over.
#[derive(Debug, Default)]
struct MinuteProgress {
    started: Option<time::Instant>,
    banked: Duration,
}

impl MinuteProgress {
    fn mark(&mut self) {
        self.started = Some(time::Instant::now());
    }

    fn tick(&mut self) {
        self.banked = Duration::ZERO;
        self.mark();
    }

    fn bank(&mut self, minute: Duration) {
        if let Some(started) = self.started.take() {
            self.banked = (self.banked + started.elapsed()).min(minute);
        }
    }

    fn until_next_tick(&self, minute: Duration) -> Duration {
        minute.saturating_sub(self.banked)
    }
}

async fn abort_slot(slot: &TaskSlot) {
    if let Some(handle) = slot.lock().await.take() {
        handle.abort();
    }
}

/// Drives one study session at a time: the minute counter, the randomly
/// scheduled quiz, the quiz feedback delays and the attention feed. Every
/// timer lives in its own slot and is aborted when the session ends.
#[derive(Clone)]
pub struct StudySessionController {
    state: Arc<Mutex<SessionState>>,
    quiz: Arc<Mutex<QuizEngine>>,
    quiz_history: Arc<Mutex<Vec<QuizResult>>>,
    store: ProfileStore,
    recorder: SessionRecorder,
    settings: SessionSettings,
    rng: SharedRng,
    events: broadcast::Sender<SessionEvent>,
    sensing: Arc<Mutex<AttentionController>>,
    minute_progress: Arc<Mutex<MinuteProgress>>,
    minute_ticker: TaskSlot,
    quiz_trigger: TaskSlot,
    quiz_transition: TaskSlot,
    attention_pump: TaskSlot,
}

impl StudySessionController {
    pub fn new(
        store: ProfileStore,
        settings: SessionSettings,
        rng: SharedRng,
        bank: Arc<QuestionBank>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut state = SessionState::new();
        state.attention = settings.initial_attention;

        Self {
            state: Arc::new(Mutex::new(state)),
            quiz: Arc::new(Mutex::new(QuizEngine::new(bank, settings.questions_per_quiz))),
            quiz_history: Arc::new(Mutex::new(Vec::new())),
            recorder: SessionRecorder::new(store.clone()),
            store,
            settings,
            rng,
            events,
            sensing: Arc::new(Mutex::new(AttentionController::new())),
            minute_progress: Arc::new(Mutex::new(MinuteProgress::default())),
            minute_ticker: Arc::new(Mutex::new(None)),
            quiz_trigger: Arc::new(Mutex::new(None)),
            quiz_transition: Arc::new(Mutex::new(None)),
            attention_pump: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn quiz_view(&self) -> QuizView {
        self.quiz.lock().await.view()
    }

    /// Results of every quiz closed during the current session.
    pub async fn quiz_history(&self) -> Vec<QuizResult> {
        self.quiz_history.lock().await.clone()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub async fn start_session(&self, child_id: &str, mode: TimerMode) -> FocusResult<SessionState> {
        if self.state.lock().await.is_active() {
            return Err(FocusError::SessionAlreadyActive);
        }

        let child = self
            .store
            .select_child(child_id)
            .await?
            .ok_or_else(|| FocusError::child_not_found(child_id))?;

        let snapshot = {
            let mut state = self.state.lock().await;
            if state.is_active() {
                return Err(FocusError::SessionAlreadyActive);
            }
            state.begin_session(
                child.id.clone(),
                mode,
                self.settings.target_minutes,
                self.settings.initial_attention,
                Utc::now(),
            );
            *self.minute_progress.lock().await = MinuteProgress::default();
            state.clone()
        };

        self.quiz.lock().await.close();
        self.quiz_history.lock().await.clear();

        self.spawn_minute_ticker().await;
        self.schedule_quiz_trigger().await;

        info!("Study session started for {} ({:?})", child.name, mode);
        self.emit(SessionEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Holds the minute clock. Quizzes and the attention feed carry on.
    /// Pausing an already paused session changes nothing.
    pub async fn pause_session(&self) -> FocusResult<SessionState> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.is_active() {
                return Err(FocusError::NoActiveSession);
            }
            if !state.pause() {
                return Ok(state.clone());
            }
            self.minute_progress.lock().await.bank(self.settings.minute());
            abort_slot(&self.minute_ticker).await;
            state.clone()
        };

        info!("Study session paused at {} min", snapshot.elapsed_minutes);
        self.emit(SessionEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Restarts the minute clock, finishing the minute a pause interrupted.
    pub async fn resume_session(&self) -> FocusResult<SessionState> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.is_active() {
                return Err(FocusError::NoActiveSession);
            }
            if !state.resume() {
                return Ok(state.clone());
            }
            state.clone()
        };
        self.spawn_minute_ticker().await;

        info!("Study session resumed at {} min", snapshot.elapsed_minutes);
        self.emit(SessionEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Winds a countdown back to its full target and leaves it paused.
    /// Minutes already studied still count towards the recorded duration.
    pub async fn reset_countdown(&self) -> FocusResult<SessionState> {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.is_active() {
                return Err(FocusError::NoActiveSession);
            }
            if !state.rewind_countdown() {
                return Err(FocusError::Validation(
                    "only countdown sessions can be reset".into(),
                ));
            }
            *self.minute_progress.lock().await = MinuteProgress::default();
            abort_slot(&self.minute_ticker).await;
            state.clone()
        };

        info!(
            "Countdown reset to {} min",
            snapshot.remaining_minutes().unwrap_or_default()
        );
        self.emit(SessionEvent::StateChanged {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Turns on the attention feed. A refused device leaves the session
    /// running on its last known score; call again to retry.
    pub async fn start_attention(&self, device: &dyn CaptureDevice) -> FocusResult<()> {
        let start_value = {
            let state = self.state.lock().await;
            if !state.is_active() {
                return Err(FocusError::NoActiveSession);
            }
            state.attention
        };

        let (tx, mut rx) = mpsc::channel::<AttentionSample>(SAMPLE_BUFFER);
        let walk = AttentionWalk::new(
            start_value,
            self.settings.walk_min_step,
            self.settings.walk_max_step,
        );

        {
            let mut sensing = self.sensing.lock().await;
            if sensing.is_active() {
                return Ok(());
            }
            sensing.start(
                device,
                walk,
                self.rng.clone(),
                self.settings.sample_interval(),
                tx,
            )?;
        }

        let this = self.clone();
        let pump = tokio::spawn(async move {
            while let Some(sample) = rx.recv().await {
                this.apply_sample(sample).await;
            }
        });
        {
            let mut slot = self.attention_pump.lock().await;
            if let Some(old) = slot.replace(pump) {
                old.abort();
            }
        }

        let mut state = self.state.lock().await;
        state.attention_active = true;
        self.emit(SessionEvent::StateChanged {
            state: state.clone(),
        });
        Ok(())
    }

    pub async fn stop_attention(&self) {
        self.sensing.lock().await.stop().await;
        abort_slot(&self.attention_pump).await;
        self.state.lock().await.attention_active = false;
    }

    async fn apply_sample(&self, sample: AttentionSample) {
        let mut state = self.state.lock().await;
        if !state.apply_attention(sample.value) {
            return;
        }
        let sample = AttentionSample {
            value: state.attention,
            ..sample
        };
        self.emit(SessionEvent::AttentionSampled {
            mood: PetMood::from_attention(sample.value),
            sample,
        });
    }

    /// Opens a quiz sized to the current attention. `Ok(None)` when one is
    /// already on screen.
    pub async fn open_quiz(&self) -> FocusResult<Option<QuizQuestion>> {
        let state = self.state.lock().await;
        if !state.is_active() {
            return Err(FocusError::NoActiveSession);
        }

        let mut quiz = self.quiz.lock().await;
        let Some(question) = quiz.open(state.attention, &self.rng) else {
            return Ok(None);
        };

        info!(
            "Quiz opened with question {} ({:?})",
            question.id, question.difficulty
        );
        self.emit(SessionEvent::QuizOpened {
            question: question.clone(),
            question_number: quiz.view().question_number,
        });
        Ok(Some(question))
    }

    /// Records the first answer to the question on screen and starts the
    /// feedback delay. Repeat selections return `Ok(None)`.
    pub async fn answer(&self, option: usize) -> FocusResult<Option<AnswerOutcome>> {
        let state = self.state.lock().await;
        if !state.is_active() {
            return Err(FocusError::NoActiveSession);
        }

        let Some(outcome) = self.quiz.lock().await.select_option(option) else {
            debug!("Ignoring selection {option}: no question awaiting an answer");
            return Ok(None);
        };

        info!(
            "Quiz answer {} ({}/{} correct so far)",
            if outcome.correct { "correct" } else { "wrong" },
            outcome.score,
            outcome.attempted
        );
        self.emit(SessionEvent::QuizAnswered {
            outcome: outcome.clone(),
        });
        drop(state);

        let this = self.clone();
        let feedback = self.settings.feedback_delay();
        let handle = tokio::spawn(async move {
            time::sleep(feedback).await;
            this.advance_quiz().await;
        });
        if let Some(old) = self.quiz_transition.lock().await.replace(handle) {
            old.abort();
        }

        Ok(Some(outcome))
    }

    async fn advance_quiz(&self) {
        let finished = {
            let state = self.state.lock().await;
            if !state.is_active() {
                return;
            }
            let mut quiz = self.quiz.lock().await;
            if quiz.is_complete() {
                true
            } else {
                if let Some(question) = quiz.next_question(&self.rng) {
                    self.emit(SessionEvent::QuizOpened {
                        question,
                        question_number: quiz.view().question_number,
                    });
                }
                false
            }
        };

        if finished {
            time::sleep(self.settings.close_delay()).await;
            self.finish_quiz().await;
        }
    }

    async fn finish_quiz(&self) -> Option<QuizResult> {
        let result = {
            let state = self.state.lock().await;
            if !state.is_active() {
                return None;
            }
            self.quiz.lock().await.close()?
        };

        info!(
            "Quiz closed: {}/{} correct{}",
            result.score,
            result.attempted,
            if result.completed { "" } else { " (dismissed)" }
        );
        self.quiz_history.lock().await.push(result);
        self.emit(SessionEvent::QuizClosed { result });
        self.schedule_quiz_trigger().await;
        Some(result)
    }

    /// Closes the quiz immediately, dropping any pending feedback delay.
    pub async fn dismiss_quiz(&self) -> FocusResult<Option<QuizResult>> {
        if !self.state.lock().await.is_active() {
            return Err(FocusError::NoActiveSession);
        }
        abort_slot(&self.quiz_transition).await;
        Ok(self.finish_quiz().await)
    }

    async fn schedule_quiz_trigger(&self) {
        if !self.state.lock().await.is_active() {
            return;
        }

        let (lo, hi) = self.settings.quiz_delay_range();
        let delay = self.rng.duration_between(lo, hi);
        debug!("Next quiz in {:?}", delay);

        let this = self.clone();
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            this.fire_quiz_trigger().await;
        });

        if let Some(old) = self.quiz_trigger.lock().await.replace(handle) {
            old.abort();
        }
    }

    async fn fire_quiz_trigger(&self) {
        if !self.state.lock().await.is_active() {
            return;
        }
        if self.quiz.lock().await.is_open() {
            info!("Quiz trigger dropped: a quiz is already open");
            self.emit(SessionEvent::QuizTriggerDropped);
            return;
        }
        if let Err(err) = self.open_quiz().await {
            warn!("Scheduled quiz could not open: {err}");
        }
    }

    async fn spawn_minute_ticker(&self) {
        let mut ticker_guard = self.minute_ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let this = self.clone();
        let minute = self.settings.minute();
        let first_tick = {
            let mut progress = self.minute_progress.lock().await;
            progress.mark();
            progress.until_next_tick(minute)
        };

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + first_tick, minute);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;

                let (elapsed, remaining, reached) = {
                    let mut guard = this.state.lock().await;
                    if !guard.tick_minute() {
                        break;
                    }
                    this.minute_progress.lock().await.tick();
                    (
                        guard.elapsed_minutes,
                        guard.remaining_minutes(),
                        guard.target_reached(),
                    )
                };

                this.emit(SessionEvent::MinuteElapsed {
                    elapsed_minutes: elapsed,
                    remaining_minutes: remaining,
                });

                if reached {
                    info!("Countdown finished after {elapsed} min");
                    // Ending from a separate task keeps this ticker from
                    // aborting itself mid-shutdown.
                    let finisher = this.clone();
                    tokio::spawn(async move {
                        match finisher.end_session().await {
                            Ok(_) => {}
                            // Already ended explicitly.
                            Err(FocusError::NoActiveSession) => {
                                debug!("Countdown finished after the session ended")
                            }
                            Err(err) => error!("Failed to finish countdown session: {err}"),
                        }
                    });
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_timers(&self) {
        abort_slot(&self.minute_ticker).await;
        abort_slot(&self.quiz_trigger).await;
        abort_slot(&self.quiz_transition).await;
    }

    /// Stops every timer, records the session and returns the stored record.
    pub async fn end_session(&self) -> FocusResult<FocusSession> {
        let (child_id, attention, elapsed) = {
            let mut state = self.state.lock().await;
            if !state.is_active() {
                return Err(FocusError::NoActiveSession);
            }
            let child_id = state
                .child_id
                .clone()
                .ok_or(FocusError::NoActiveSession)?;
            state.end(Utc::now());
            (child_id, state.attention, state.elapsed_minutes)
        };

        self.cancel_timers().await;
        self.stop_attention().await;
        if let Some(result) = self.quiz.lock().await.close() {
            debug!("Discarding open quiz at session end ({}/{})", result.score, result.attempted);
        }

        let session = self
            .recorder
            .end_session(attention, elapsed, &child_id)
            .await?;

        self.emit(SessionEvent::StateChanged {
            state: self.get_state().await,
        });
        self.emit(SessionEvent::SessionCompleted {
            session: session.clone(),
        });
        Ok(session)
    }

    /// Tears everything down without recording anything.
    pub async fn shutdown(&self) {
        self.state.lock().await.reset();
        self.cancel_timers().await;
        self.stop_attention().await;
        self.quiz.lock().await.close();
        info!("Study session controller shut down");
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.lock().await.status
    }
}
