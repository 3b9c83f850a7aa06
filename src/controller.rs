//! The real-time loop: elapsed-time accounting, pause/resume, score
//! bookkeeping, and restart on game over.

use std::time::Instant;

use winit::event::WindowEvent;

use crate::engine::{Engine, EngineSettings, Snapshot};
use crate::input::{InputSignal, InputTranslator};
use crate::store::{load_best_score, save_best_score, KeyValueStore};

/// Monotonic milliseconds since an arbitrary epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Receives each freshly advanced frame.
pub trait Presenter {
    fn show(&mut self, snapshot: &Snapshot, score: ScoreRecord);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreRecord {
    pub current: u32,
    pub best: u32,
}

/// Reset on every restart; only the controller mutates it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimingState {
    pub last_update: Option<u64>,
    pub paused: bool,
    paused_since: Option<u64>,
    /// Paused time not yet excluded from an elapsed-time computation.
    pause_accumulator: u64,
}

impl TimingState {
    fn pause(&mut self, now: u64) {
        self.paused = true;
        self.paused_since = Some(now);
    }

    fn resume(&mut self, now: u64) {
        self.paused = false;
        if let Some(since) = self.paused_since.take() {
            self.pause_accumulator += now.saturating_sub(since);
        }
    }

    /// Wall time since the last update, minus time spent paused in between.
    fn take_elapsed(&mut self, now: u64) -> Option<u64> {
        let last = self.last_update?;
        let frozen = std::mem::take(&mut self.pause_accumulator);
        Some(now.saturating_sub(last).saturating_sub(frozen))
    }

    fn set_baseline(&mut self, now: u64) {
        self.last_update = Some(now);
        self.pause_accumulator = 0;
    }
}

/// Identifies one running schedule. Firings carrying a stale handle are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The firing belonged to a stopped schedule.
    Cancelled,
    Paused,
    /// First tick after a (re)start; only the time baseline was recorded.
    Baseline,
    Restarted,
    Advanced,
}

pub type EngineFactory<E> = Box<dyn FnMut(&EngineSettings) -> E>;

pub struct LoopController<E: Engine> {
    settings: EngineSettings,
    spawn: EngineFactory<E>,
    engine: E,
    input: InputTranslator,
    timing: TimingState,
    score: ScoreRecord,
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    schedule: Option<ScheduleHandle>,
    schedules_issued: u64,
}

impl<E: Engine> LoopController<E> {
    pub fn new(
        settings: EngineSettings,
        mut spawn: EngineFactory<E>,
        store: Box<dyn KeyValueStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let engine = spawn(&settings);
        let best = load_best_score(&*store);
        Self {
            settings,
            spawn,
            engine,
            input: InputTranslator::new(),
            timing: TimingState::default(),
            score: ScoreRecord { current: 0, best },
            store,
            clock,
            schedule: None,
            schedules_issued: 0,
        }
    }

    /// Begins scheduling. While already running this returns the live handle
    /// instead of registering a second schedule.
    pub fn start(&mut self) -> ScheduleHandle {
        if let Some(handle) = self.schedule {
            log::debug!("loop already running");
            return handle;
        }
        self.schedules_issued += 1;
        let handle = ScheduleHandle(self.schedules_issued);
        self.schedule = Some(handle);
        log::info!("loop started");
        handle
    }

    /// Idempotent. Any firing already queued under the old handle becomes a no-op.
    pub fn stop(&mut self) {
        if self.schedule.take().is_some() {
            log::info!("loop stopped");
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    /// Entry point for the host's frame or timer callback.
    pub fn fire(&mut self, handle: ScheduleHandle, presenter: &mut dyn Presenter) -> TickOutcome {
        if self.schedule != Some(handle) {
            return TickOutcome::Cancelled;
        }
        self.tick(presenter)
    }

    pub fn tick(&mut self, presenter: &mut dyn Presenter) -> TickOutcome {
        if self.timing.paused {
            return TickOutcome::Paused;
        }

        let now = self.clock.now_ms();
        let Some(elapsed) = self.timing.take_elapsed(now) else {
            self.timing.set_baseline(now);
            return TickOutcome::Baseline;
        };

        self.engine.set_input_direction(self.input.direction());
        if let Err(err) = self.engine.run_for(elapsed as f64) {
            log::warn!("engine failed, restarting: {err}");
            self.restart();
            return TickOutcome::Restarted;
        }
        if self.engine.is_over() {
            // The final score still counts toward the best.
            self.update_score();
            log::info!("game over at score {}, restarting", self.score.current);
            self.restart();
            return TickOutcome::Restarted;
        }

        self.update_score();
        self.timing.last_update = Some(now);
        presenter.show(&self.engine.snapshot(), self.score);
        TickOutcome::Advanced
    }

    pub fn toggle_pause(&mut self) {
        let now = self.clock.now_ms();
        if self.timing.paused {
            self.timing.resume(now);
            log::debug!("resumed at {now} ms");
        } else {
            self.timing.pause(now);
            log::debug!("paused at {now} ms");
        }
    }

    pub fn restart(&mut self) {
        self.engine = (self.spawn)(&self.settings);
        self.timing = TimingState::default();
        self.input.clear();
        self.score.current = self.engine.score();
    }

    /// Feeds a window event to the input translator and acts on its signal.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        let now = self.clock.now_ms();
        if let Some(InputSignal::TogglePause) = self.input.handle_window_event(event, now) {
            self.toggle_pause();
        }
    }

    #[cfg(test)]
    pub fn input_mut(&mut self) -> &mut InputTranslator {
        &mut self.input
    }

    pub fn timing(&self) -> TimingState {
        self.timing
    }

    pub fn score(&self) -> ScoreRecord {
        self.score
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn update_score(&mut self) {
        self.score.current = self.engine.score();
        if self.score.current > self.score.best {
            self.score.best = self.score.current;
            match save_best_score(&mut *self.store, self.score.best) {
                Ok(()) => log::debug!("new best score {}", self.score.best),
                Err(err) => log::warn!("could not persist best score {}: {err}", self.score.best),
            }
        }
    }
}
