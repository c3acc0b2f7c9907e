//! Terminal setup and the event loop.
//!
//! Key presses, resizes and worker results all go through one queue into
//! `App::update`. Store-bound effects are sent to a worker thread that owns
//! the services; the external editor runs here with the terminal suspended.

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};

use crate::prefs::PrefsStore;
use crate::service::Services;
use crate::tui::app::App;
use crate::tui::editor;
use crate::tui::effects::{Effect, EffectRunner, Event};
use crate::tui::enums::EditorTarget;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Where an effect gets executed.
#[derive(Debug)]
enum Route {
    Worker(Effect),
    Editor { target: EditorTarget, text: String },
    Queue(Event),
}

fn route(effect: Effect) -> Route {
    if effect.is_store_bound() {
        return Route::Worker(effect);
    }
    match effect {
        Effect::OpenEditor { target, text } => Route::Editor { target, text },
        Effect::Dispatch(action) => Route::Queue(Event::ExecuteAction(action)),
        other => Route::Worker(other),
    }
}

/// Initialise the terminal, run the board until the user quits, and
/// restore the terminal even when the loop fails.
pub fn run_tui(app: App, services: Services, prefs: PrefsStore) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app, EffectRunner::new(services, prefs));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn spawn_worker(runner: EffectRunner) -> (Sender<Effect>, Receiver<Event>, thread::JoinHandle<()>) {
    let (effect_tx, effect_rx) = mpsc::channel::<Effect>();
    let (event_tx, event_rx) = mpsc::channel::<Event>();
    let handle = thread::spawn(move || {
        for effect in effect_rx {
            debug!(?effect, "running effect");
            if let Some(event) = runner.execute(effect) {
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("effect worker stopped");
    });
    (effect_tx, event_rx, handle)
}

fn event_loop(terminal: &mut Term, mut app: App, runner: EffectRunner) -> io::Result<()> {
    let (effect_tx, event_rx, worker) = spawn_worker(runner);
    let mut queue: VecDeque<Event> = VecDeque::new();

    let size = terminal.size()?;
    queue.push_back(Event::Resize {
        width: size.width,
        height: size.height,
    });
    for effect in app.init() {
        dispatch(terminal, &effect_tx, &mut queue, effect)?;
    }

    while !app.should_quit() {
        while let Ok(event) = event_rx.try_recv() {
            queue.push_back(event);
        }
        while let Some(event) = queue.pop_front() {
            for effect in app.update(event) {
                dispatch(terminal, &effect_tx, &mut queue, effect)?;
            }
            if app.should_quit() {
                break;
            }
        }
        if app.should_quit() {
            break;
        }

        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => queue.push_back(Event::Key(key)),
                TermEvent::Resize(width, height) => queue.push_back(Event::Resize { width, height }),
                _ => {}
            }
        }
    }

    info!("shutting down");
    // Closing the channel lets the worker finish queued saves before it exits.
    drop(effect_tx);
    if worker.join().is_err() {
        warn!("effect worker panicked");
    }
    Ok(())
}

fn dispatch(terminal: &mut Term, worker: &Sender<Effect>, queue: &mut VecDeque<Event>, effect: Effect) -> io::Result<()> {
    match route(effect) {
        Route::Worker(effect) => {
            if let Err(e) = worker.send(effect) {
                warn!(error = %e, "effect worker is gone");
            }
        }
        Route::Queue(event) => queue.push_back(event),
        Route::Editor { target, text } => {
            let result = suspended(terminal, || editor::edit_text(&text))?;
            queue.push_back(Event::DescriptionEdited {
                target,
                result: result.map_err(|e| e.to_string()),
            });
        }
    }
    Ok(())
}

/// Hand the terminal to `f`, then take it back and force a full redraw.
fn suspended<T>(terminal: &mut Term, f: impl FnOnce() -> T) -> io::Result<T> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    let out = f();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen, EnableMouseCapture)?;
    terminal.clear()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::service::bootstrap::ensure_default_setup;
    use crate::task::TaskFilter;
    use crate::tui::keybinds::Action;

    #[test]
    fn test_route_splits_effects() {
        assert!(matches!(
            route(Effect::Dispatch(Action::NewTask)),
            Route::Queue(Event::ExecuteAction(Action::NewTask))
        ));
        assert!(matches!(
            route(Effect::OpenEditor {
                target: EditorTarget::Form,
                text: "x".to_string()
            }),
            Route::Editor { .. }
        ));
        assert!(matches!(
            route(Effect::LoadComments {
                task_id: "t1".to_string()
            }),
            Route::Worker(_)
        ));
    }

    #[test]
    fn test_worker_round_trip() {
        let store = Store::in_memory();
        let setup = ensure_default_setup(&store).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let runner = EffectRunner::new(Services::new(store), PrefsStore::new(dir.path().join("state.json")));
        let (tx, rx, handle) = spawn_worker(runner);

        tx.send(Effect::LoadTasks(TaskFilter {
            workspace_id: setup.workspace.id.clone(),
            ..TaskFilter::default()
        }))
        .unwrap();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Event::TasksLoaded(Ok(tasks)) => assert!(tasks.is_empty()),
            other => panic!("unexpected {other:?}"),
        }

        drop(tx);
        handle.join().unwrap();
    }
}
