//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox pattern
//!
//! Async handlers send `UiEvent`s to `inbox_tx`; the runtime drains
//! `inbox_rx` each frame. There are no per-operation receivers.

mod handlers;

use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use botdeck_core::api::ApiClient;
use botdeck_core::session::SessionManager;
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::TuiState;
use crate::{render, terminal, update};

/// Poll cadence while async work is in flight (spinner animation).
const BUSY_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(33);

/// Poll cadence when idle. Longer timeout reduces CPU usage.
const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen panel runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop and on
/// panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: TuiState,
    session: Arc<Mutex<SessionManager>>,
    api: Arc<ApiClient>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: std::time::Instant,
}

impl TuiRuntime {
    /// Creates the runtime and takes over the terminal.
    pub fn new(session: SessionManager) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let api = Arc::clone(session.api());
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            state: TuiState::new(),
            session: Arc::new(Mutex::new(session)),
            api,
            inbox_tx,
            inbox_rx,
            last_tick: std::time::Instant::now(),
        })
    }

    /// Runs the main event loop until quit.
    pub fn run(&mut self) -> Result<()> {
        // Kick off credential validation before the first frame.
        self.execute_effect(UiEffect::ResolveSession);

        let mut dirty = true;
        while !self.state.should_quit {
            let events = self.collect_events()?;
            for event in events {
                if matches!(event, UiEvent::Tick) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }
        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Drain the inbox first so async results render this frame.
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let tick_interval = if self.is_busy() {
            BUSY_POLL_DURATION
        } else {
            IDLE_POLL_DURATION
        };
        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());

        // Block until the next tick is due unless events are already queued.
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            std::time::Duration::ZERO
        };
        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = std::time::Instant::now();
        }

        Ok(events)
    }

    /// Whether async work is in flight and the spinner should animate.
    fn is_busy(&self) -> bool {
        use botdeck_core::session::SessionPhase;
        matches!(self.state.phase, SessionPhase::Checking)
            || self.state.auth.busy
            || self.state.dashboard.data.is_loading()
            || self.state.users.data.is_loading()
            || self.state.broadcast.history.is_loading()
            || self.state.logs.data.is_loading()
            || self.state.admins.data.is_loading()
            || self.state.settings.data.is_loading()
            || self.state.messages.sending
            || self.state.broadcast.sending
            || self.state.admins.busy
            || self.state.settings.saving
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async effect handler, routing its result to the inbox.
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
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::ResolveSession => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::resolve_session(session));
            }
            UiEffect::SubmitLogin { login, password } => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::submit_login(session, login, password));
            }
            UiEffect::SubmitSetup {
                login,
                password,
                display_name,
            } => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || {
                    handlers::submit_setup(session, login, password, display_name)
                });
            }
            UiEffect::Logout => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::logout(session));
            }
            UiEffect::ForceLogout => {
                let session = Arc::clone(&self.session);
                self.spawn_effect(move || handlers::force_logout(session));
            }
            UiEffect::LoadSection {
                section,
                generation,
                query,
            } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || handlers::load_section(api, section, generation, query));
            }
            UiEffect::BlockUser {
                telegram_id,
                blocked,
            } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || handlers::block_user(api, telegram_id, blocked));
            }
            UiEffect::SendBroadcast { text } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || handlers::send_broadcast(api, text));
            }
            UiEffect::SendDirectMessage { chat_id, text } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || handlers::send_direct_message(api, chat_id, text));
            }
            UiEffect::SaveSettings { settings } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || handlers::save_settings(api, settings));
            }
            UiEffect::CreateAdmin {
                login,
                password,
                display_name,
            } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || {
                    handlers::create_admin(api, login, password, display_name)
                });
            }
            UiEffect::ToggleAdmin { admin_id, active } => {
                let api = Arc::clone(&self.api);
                self.spawn_effect(move || handlers::toggle_admin(api, admin_id, active));
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
