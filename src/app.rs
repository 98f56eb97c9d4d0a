use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use typequest::config::Config;
use typequest::engine::Millis;
use typequest::engine::learn::{LearnEngine, LearnStatus};
use typequest::engine::rescue::RescueStatus;
use typequest::session::free_play::FreePlaySession;
use typequest::session::rescue_run::RescueRun;
use typequest::store::json_store::JsonStore;
use typequest::store::schema::TypingStats;

pub enum Mode {
    Play(FreePlaySession),
    Learn(LearnEngine),
    Rescue(RescueRun),
}

/// Terminal host: owns one engine, feeds it keys and ticks, and writes
/// finished sessions to the archive.
pub struct App {
    pub mode: Mode,
    pub config: Config,
    pub stats: TypingStats,
    pub message: Option<String>,
    pub should_quit: bool,
    store: Option<JsonStore>,
    clock: Instant,
    last_tick: Millis,
    buffer: String,
}

impl App {
    pub fn new(mode: Mode, config: Config, store: Option<JsonStore>) -> Self {
        let stats = store.as_ref().map(|s| s.load_stats()).unwrap_or_default();
        Self {
            mode,
            config,
            stats,
            message: None,
            should_quit: false,
            store,
            clock: Instant::now(),
            last_tick: 0,
            buffer: String::new(),
        }
    }

    pub fn now_ms(&self) -> Millis {
        self.clock.elapsed().as_millis() as Millis
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let now = self.now_ms();
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Tab => self.restart(now),
            KeyCode::Enter => {
                if let Mode::Play(session) = &mut self.mode
                    && session.is_complete()
                {
                    session.next_sample();
                    self.buffer.clear();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                self.forward_buffer(now);
            }
            KeyCode::Char(ch) => match &mut self.mode {
                Mode::Learn(engine) => engine.press_key(ch, now),
                Mode::Play(_) | Mode::Rescue(_) => {
                    self.buffer.push(ch);
                    self.forward_buffer(now);
                }
            },
            _ => {}
        }
    }

    fn forward_buffer(&mut self, now: Millis) {
        match &mut self.mode {
            Mode::Play(session) => {
                if let Some(metrics) = session.handle_input(&self.buffer, now) {
                    self.buffer = session.input().to_string();
                    if let Some(store) = &self.store {
                        match store.record_session(&metrics) {
                            Ok(stats) => self.stats = stats,
                            Err(e) => tracing::error!("failed to save stats: {e:#}"),
                        }
                    }
                    self.message = Some(format!(
                        "{} wpm, {}% accuracy. Enter for the next sample.",
                        metrics.wpm, metrics.accuracy
                    ));
                } else {
                    self.buffer = session.input().to_string();
                }
            }
            Mode::Rescue(run) => {
                run.handle_input(&self.buffer, now);
                self.buffer = run.input().to_string();
                self.persist_rescue();
            }
            Mode::Learn(_) => {}
        }
    }

    pub fn on_tick(&mut self) {
        let now = self.now_ms();
        let delta = now.saturating_sub(self.last_tick);
        self.last_tick = now;

        match &mut self.mode {
            Mode::Play(session) => session.tick(now),
            Mode::Learn(engine) => {
                if let Some(session) = engine.tick(now) {
                    if let Some(store) = &self.store
                        && let Err(e) = store.record_learn_session(&session)
                    {
                        tracing::error!("failed to save learn session: {e:#}");
                    }
                    self.message = Some(format!(
                        "Drill complete: {} correct, {} misses. Tab to go again.",
                        session.totals.correct_targets, session.totals.wrong_key_presses
                    ));
                }
            }
            Mode::Rescue(run) => {
                run.tick(delta);
                self.persist_rescue();
            }
        }
    }

    fn persist_rescue(&mut self) {
        let Mode::Rescue(run) = &mut self.mode else {
            return;
        };
        let Some(record) = run.take_record() else {
            return;
        };
        if let Some(store) = &self.store
            && let Err(e) = store.record_rescue_session(&record)
        {
            tracing::error!("failed to save rescue session: {e:#}");
        }
        let outcome = if record.is_win() { "Rescued" } else { "Shattered" };
        self.message = Some(format!(
            "{outcome}: {}/{} words. Tab to try again.",
            record.words_completed, record.word_goal
        ));
    }

    fn restart(&mut self, now: Millis) {
        self.buffer.clear();
        self.message = None;
        match &mut self.mode {
            Mode::Play(session) => session.restart(),
            Mode::Learn(engine) => engine.reset(now),
            Mode::Rescue(run) => run.reset(),
        }
    }

    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = match &self.mode {
            Mode::Play(session) => {
                let metrics = session.metrics().copied().unwrap_or_default();
                vec![
                    format!("Free play: {}", session.pack().title),
                    String::new(),
                    session.target().to_string(),
                    session.input().to_string(),
                    String::new(),
                    format!(
                        "{} wpm  {}% acc  {:.1}s  |  best {} wpm over {} sessions",
                        metrics.wpm,
                        metrics.accuracy,
                        session.elapsed_ms() as f64 / 1000.0,
                        self.stats.best_wpm,
                        self.stats.sessions
                    ),
                ]
            }
            Mode::Learn(engine) => {
                let snap = engine.snapshot();
                let flash = match snap.feedback {
                    Some(f) if f.correct => format!("  [{}]", f.key),
                    Some(f) => format!("  x{}x", f.key),
                    None => String::new(),
                };
                let status = match snap.status {
                    LearnStatus::Idle => "press the letter to start",
                    LearnStatus::Running => "running",
                    LearnStatus::Complete => "complete",
                };
                vec![
                    format!("Learn ({}): {status}", snap.difficulty),
                    String::new(),
                    format!("    {}{flash}", snap.target.to_ascii_uppercase()),
                    format!("    {}", snap.finger),
                    String::new(),
                    format!(
                        "{}s left  segment {}  {}% acc  avg {}ms  p50 {}ms  p90 {}ms  hunt {:.2}",
                        snap.time_left_ms / 1000,
                        snap.active_segment + 1,
                        snap.accuracy,
                        snap.avg_reaction_ms,
                        snap.p50,
                        snap.p90,
                        snap.hunt_rate
                    ),
                ]
            }
            Mode::Rescue(run) => {
                let state = run.state();
                let status = match state.status {
                    RescueStatus::Idle => "start typing",
                    RescueStatus::Running => "running",
                    RescueStatus::Won => "won",
                    RescueStatus::Lost => "lost",
                };
                let filled = (state.meter_percent() / 5) as usize;
                vec![
                    format!("Rescue ({}): {status}", state.difficulty),
                    format!("[{}{}] {}%", "#".repeat(filled), ".".repeat(20 - filled), state.meter_percent()),
                    String::new(),
                    state.target.clone(),
                    run.input().to_string(),
                    String::new(),
                    format!(
                        "{}/{} words  streak {}  {}s left",
                        state.completed,
                        state.word_goal,
                        state.streak,
                        state.time_left_ms / 1000
                    ),
                ]
            }
        };
        if let Some(message) = &self.message {
            lines.push(String::new());
            lines.push(message.clone());
        }
        lines.push(String::new());
        lines.push("Tab restart  Esc quit".to_string());
        lines
    }
}
