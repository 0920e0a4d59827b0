pub mod app;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use rollcall_core::{AttendanceService, AttendanceStatus, Config, InMemoryStore};
use tracing::{error, info};

use crate::tui::app::{App, InputMode, Route};

pub fn run(service: AttendanceService<InMemoryStore>, config: Config, today: NaiveDate) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(service, config, today);
    info!("tui started");
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "tui exited with error");
        println!("{:?}", err);
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Searching => match key.code {
                KeyCode::Enter | KeyCode::Esc => app.exit_input_mode(),
                KeyCode::Char(c) => app.input_char(c),
                KeyCode::Backspace => app.delete_char(),
                KeyCode::Left => app.move_cursor_left(),
                KeyCode::Right => app.move_cursor_right(),
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Tab => app.next_route(),
                KeyCode::BackTab => app.previous_route(),
                KeyCode::Char(c @ '1'..='4') => app.select_route(c as usize - '1' as usize),
                KeyCode::Char('r') => app.refresh(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                code => match app.route {
                    Route::Students => handle_students_key(app, code),
                    Route::Attendance => handle_attendance_key(app, code),
                    _ => {}
                },
            },
        }
    }
}

fn handle_students_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => app.clear_search(),
        _ => {}
    }
}

fn handle_attendance_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::Char('[') => app.previous_day(),
        KeyCode::Right | KeyCode::Char(']') => app.next_day(),
        KeyCode::Char('t') => app.jump_to_today(),
        KeyCode::Char('p') => app.mark_selected(AttendanceStatus::Present),
        KeyCode::Char('a') => app.mark_selected(AttendanceStatus::Absent),
        KeyCode::Char('l') => app.mark_selected(AttendanceStatus::Late),
        KeyCode::Char('e') => app.mark_selected(AttendanceStatus::Excused),
        KeyCode::Char('s') => app.save_sheet(),
        _ => {}
    }
}
