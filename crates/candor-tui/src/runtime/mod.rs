//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! Async handlers send their `UiEvent` into the inbox channel; the loop
//! drains it every frame alongside terminal input.

mod handlers;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use candor_core::api::ApiClient;
use candor_core::config::Config;
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Tick cadence while something is in flight (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    client: ApiClient,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
}

impl TuiRuntime {
    pub fn new(state: AppState, client: ApiClient) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state,
            client,
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs the event loop until the user quits, then restores the terminal.
    pub fn run(&mut self) -> Result<()> {
        self.execute_effect(UiEffect::LoadThread);
        let result = self.event_loop();
        let restored = terminal::restore_terminal();
        result.and(restored)
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                let marks_dirty = !matches!(&event, UiEvent::Frame { .. });
                let effects = update::update(&mut self.state, event);
                dirty |= marks_dirty;
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn busy(&self) -> bool {
        self.state.loading
            || self.state.vote_in_flight
            || self.state.composer.as_ref().is_some_and(|c| c.submitting)
    }

    /// Collects inbox results, terminal input and the next `Tick`.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let tick_interval = if self.busy() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async handler and forwards its result to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        debug!(?effect, "executing effect");
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::LoadThread => {
                let client = self.client.clone();
                let thread = self.state.thread.clone();
                self.spawn_effect(move || handlers::load_thread(client, thread));
            }
            UiEffect::PostComment { content, parent_id } => {
                let client = self.client.clone();
                let thread = self.state.thread.clone();
                self.spawn_effect(move || {
                    handlers::post_comment(client, thread, content, parent_id)
                });
            }
            UiEffect::CastVote {
                direction,
                previous,
            } => {
                let client = self.client.clone();
                let thread = self.state.thread.clone();
                self.spawn_effect(move || {
                    handlers::cast_vote(client, thread, direction, previous)
                });
            }
            UiEffect::PersistSort { mode } => {
                // Sort is already applied in state; a failed write only loses the default.
                if let Err(e) = Config::save_default_sort(mode) {
                    warn!("Failed to persist sort mode: {e:#}");
                }
            }
        }
    }
}
