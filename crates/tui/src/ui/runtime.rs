//! Runtime: event loop and input routing for the TUI.
//!
//! - Owns the terminal lifecycle (alternate screen, raw mode).
//! - A dedicated task reads `crossterm` events and forwards them over a
//!   channel.
//! - Keys go to `MainView`; returned `Effect`s are executed right away so a
//!   persisted API key is visible to the next submission.
//! - Background work (run calls, catalog fetches) completes through a
//!   `FuturesUnordered` of join handles and re-enters as `Msg`s.
//! - Ticks are fast (100 ms) while something is running and slow otherwise.

use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;

use actrun_api::ActionServerClient;
use actrun_engine::SubmitController;
use actrun_types::{Effect, Msg};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::task::JoinHandle;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::TuiOptions;
use crate::app::App;
use crate::cmd;
use crate::ui::main_component::MainView;
use crate::ui::theme;

/// Forward terminal input events over a Tokio channel.
///
/// `poll()` and `read()` stay on the same task to avoid lost events in some
/// terminals.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    tokio::task::spawn_blocking(move || {
        let sixteen_ms = Duration::from_millis(16);
        loop {
            match event::poll(sixteen_ms) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if sender.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!("Failed to read event: {}", error);
                        break;
                    }
                },
                Ok(false) => {
                    if sender.is_closed() {
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!("Failed to poll events: {}", error);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Resize(width, height) => main_view.handle_message(app, Msg::Resize(width, height)),
        Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Entry point for the TUI runtime: sets up the terminal, runs the event
/// loop, and restores the terminal on exit.
pub async fn run_app(options: TuiOptions) -> Result<()> {
    let TuiOptions {
        client,
        key_store,
        server_config,
        initial_selection,
    } = options;

    let controller = SubmitController::new(client.clone(), key_store, server_config);
    let mut app = App::new(theme::load_from_env(), controller, initial_selection);
    let mut main_view = MainView::default();

    let mut input_receiver = spawn_input_thread();
    let mut terminal = setup_terminal()?;
    let outcome = event_loop(&mut terminal, &mut app, &mut main_view, &mut input_receiver, &client).await;
    cleanup_terminal(&mut terminal)?;
    outcome
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    main_view: &mut MainView,
    input_receiver: &mut mpsc::Receiver<Event>,
    client: &Arc<ActionServerClient>,
) -> Result<()> {
    let mut pending: FuturesUnordered<JoinHandle<Msg>> = FuturesUnordered::new();
    if process_effects(app, client, vec![Effect::LoadCatalog], &mut pending) {
        return Ok(());
    }

    // Ticking strategy: fast while animating, very slow when idle.
    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(terminal, app, main_view)?;

    loop {
        let target_interval = if app.executing { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut effects = Vec::new();
        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else { break };
                if let Event::Key(key_event) = &event
                    && key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }
                effects.extend(handle_input_event(app, main_view, event));
                needs_render = true;
            }

            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(app, Msg::Tick));
                needs_render = app.executing;
            }

            Some(joined) = pending.next(), if !pending.is_empty() => {
                match joined {
                    Ok(msg) => effects.extend(main_view.handle_message(app, msg)),
                    Err(error) => {
                        tracing::warn!("background task failed: {}", error);
                        app.set_status(format!("Background task failed: {error}"), true);
                    }
                }
                needs_render = true;
            }

            _ = signal::ctrl_c() => break,
        }

        if process_effects(app, client, effects, &mut pending) {
            break;
        }
        app.executing = !pending.is_empty();
        if !app.executing {
            app.throbber_idx = 0;
        }

        if needs_render {
            render(terminal, app, main_view)?;
        }
    }
    Ok(())
}

/// Execute effects; returns `true` when the application should exit.
fn process_effects(
    app: &mut App,
    client: &Arc<ActionServerClient>,
    effects: Vec<Effect>,
    pending: &mut FuturesUnordered<JoinHandle<Msg>>,
) -> bool {
    if effects.is_empty() {
        return false;
    }
    let batch = cmd::run_from_effects(app, client, effects);
    pending.extend(batch.pending);
    batch.quit
}
