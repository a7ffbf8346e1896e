use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::EnableMouseCapture,
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::inputs::ListenerGuard;
use crate::panic_handler::restore_terminal;

/// The mounted view: raw mode, alternate screen, mouse capture and the
/// keyboard listener registration, all released together on drop.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    _listener: ListenerGuard,
}

impl TerminalSession {
    pub fn acquire() -> Result<Self> {
        let listener = ListenerGuard::register()?;

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            restore_terminal();
            return Err(e).context("Failed to enter alternate screen");
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(e).context("Failed to create terminal");
            }
        };
        info!("Terminal session acquired");

        Ok(Self {
            terminal,
            _listener: listener,
        })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal();
        info!("Terminal session released");
    }
}
