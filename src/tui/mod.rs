// terminal ui

mod app;
mod event;
mod theme;
mod ui;

pub use app::{Action, App, ComposeTarget, LogLevel, Mode, Panel, Popup, TextInput};
pub use event::handle_key;
pub use theme::ThemeKind;
pub use ui::render;

use crossterm::{
    cursor::SetCursorStyle,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use std::time::Duration;

use crate::{Author, CrisisDetector, Error, Store};
use event::{handle_event, poll_event};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(store: Store, detector: CrisisDetector, author: Author) -> Result<(), Error> {
    // setup terminal
    enable_raw_mode().map_err(|e| Error::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| Error::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| Error::Terminal(e.to_string()))?;

    let result = run_app(&mut terminal, store, detector, author).await;

    // restore terminal
    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        LeaveAlternateScreen
    )
    .ok();
    terminal.show_cursor().ok();

    result
}

fn draw(terminal: &mut Term, app: &mut App) -> Result<(), Error> {
    terminal
        .draw(|frame| ui::render(frame, app))
        .map_err(|e| Error::Terminal(e.to_string()))?;
    Ok(())
}

async fn run_app(
    terminal: &mut Term,
    store: Store,
    detector: CrisisDetector,
    author: Author,
) -> Result<(), Error> {
    let mut app = App::new(detector, author, store.location());
    reload(&store, &mut app).await;

    let mut last_mode = app.mode;

    loop {
        if app.mode != last_mode {
            let cursor_style = match app.mode {
                Mode::Insert => SetCursorStyle::BlinkingBar,
                Mode::Normal => SetCursorStyle::BlinkingBlock,
            };
            execute!(terminal.backend_mut(), cursor_style).ok();
            last_mode = app.mode;
        }

        draw(terminal, &mut app)?;

        let Some(event) =
            poll_event(Duration::from_millis(100)).map_err(|e| Error::Terminal(e.to_string()))?
        else {
            continue;
        };

        match handle_event(&mut app, event) {
            Action::Quit => break,
            Action::None => {}
            Action::Refresh => reload(&store, &mut app).await,
            Action::SelectionChanged => load_comments(&store, &mut app).await,

            Action::SubmitPost(new) => {
                // render saving state
                draw(terminal, &mut app)?;

                match store.create_post(new).await {
                    Ok(post) => {
                        let id = post.id;
                        let view = app.detector.view_post(post);
                        app.ack_post(&view);
                        reload(&store, &mut app).await;
                        select_post(&store, &mut app, id).await;
                    }
                    Err(e) => app.set_error(e.to_string()),
                }
            }

            Action::SubmitComment(new) => {
                draw(terminal, &mut app)?;

                match store.create_comment(new).await {
                    Ok(comment) => {
                        let view = app.detector.view_comment(comment);
                        app.ack_comment(&view);
                        load_comments(&store, &mut app).await;
                    }
                    Err(e) => app.set_error(e.to_string()),
                }
            }

            Action::Heart(id) => match store.increment_heart(id).await {
                Ok(hearts) => app.set_hearts(id, hearts),
                Err(e) => app.set_error(e.to_string()),
            },

            Action::Flag(id) => match store.set_flagged(id).await {
                Ok(()) => app.mark_flagged(id),
                Err(e) => app.set_error(e.to_string()),
            },

            Action::Delete(id) => match store.delete_post(id).await {
                Ok(()) => {
                    app.log(LogLevel::Info, format!("#{id} deleted"));
                    reload(&store, &mut app).await;
                }
                Err(e) => app.set_error(e.to_string()),
            },
        }
    }

    Ok(())
}

async fn reload(store: &Store, app: &mut App) {
    match store.list_posts(&app.filter).await {
        Ok(posts) => {
            app.set_posts(posts);
            load_comments(store, app).await;
        }
        Err(e) => app.set_error(format!("load failed: {e}")),
    }
}

async fn load_comments(store: &Store, app: &mut App) {
    let Some(id) = app.selected_id() else {
        app.set_comments(Vec::new());
        return;
    };
    match store.list_comments(id).await {
        Ok(comments) => app.set_comments(comments),
        Err(e) => app.set_error(format!("comments failed: {e}")),
    }
}

// jump to a freshly written post when the current filter shows it
async fn select_post(store: &Store, app: &mut App, id: i64) {
    if let Some(idx) = app.posts.iter().position(|p| p.id == id) {
        app.selected = idx;
        load_comments(store, app).await;
    }
}
