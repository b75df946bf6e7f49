use anyhow::Result;
use crossterm::event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crate::app::App;
use crate::net::{FetchMessage, SchedulerCommand};
use crate::ui;

pub fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    rx: Receiver<FetchMessage>,
    ctrl_tx: Sender<SchedulerCommand>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(50);
    loop {
        while let Ok(message) = rx.try_recv() {
            match message {
                FetchMessage::RegionCount { key, count } => app.apply_region_count(&key, count),
                FetchMessage::Cycle(outcome) => app.apply_cycle(outcome),
                FetchMessage::Fatal(err) => app.apply_fatal(err),
            }
        }

        terminal.draw(|f| ui::ui(f, &mut app))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        let _ = ctrl_tx.send(SchedulerCommand::Refresh);
                    }
                    KeyCode::Char('p') => {
                        let paused = !app.paused;
                        app.set_paused(paused);
                        let command = if paused {
                            SchedulerCommand::Pause
                        } else {
                            SchedulerCommand::Resume
                        };
                        let _ = ctrl_tx.send(command);
                    }
                    KeyCode::Down | KeyCode::Char('j') => app.next_row(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
                    KeyCode::Char(digit @ '1'..='9') => {
                        let index = digit as usize - '1' as usize;
                        if let Some(key) = app.regions.get(index).map(|r| r.key.clone()) {
                            app.toggle_region(&key);
                        }
                    }
                    _ => {}
                },
                // Terminal focus stands in for page visibility: losing
                // it pauses the refresh cadence, regaining it re-arms
                // the timer and fetches immediately.
                Event::FocusLost => {
                    app.set_paused(true);
                    let _ = ctrl_tx.send(SchedulerCommand::Pause);
                }
                Event::FocusGained => {
                    app.set_paused(false);
                    let _ = ctrl_tx.send(SchedulerCommand::Resume);
                }
                _ => {}
            }
        }
    }
}
