//! Debugger application state and logic.

use crate::controller::{ExecutionController, LineStatus};
use std::collections::HashSet;

/// Bytes shown per memory row.
pub const MEM_ROW: usize = 16;

/// Instructions executed per UI tick while running.
const RUN_BATCH: usize = 64;

/// One row of the source view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub index: usize,
    pub address: Option<u16>,
    pub text: String,
    pub is_current: bool,
    pub is_breakpoint: bool,
}

/// Debugger application state.
pub struct DebuggerApp {
    pub ctl: ExecutionController,
    /// Breakpoints (by line index).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// First memory row shown.
    pub mem_scroll: usize,
    /// Instructions executed by the current continuous run.
    run_count: u64,
}

impl DebuggerApp {
    /// Create a debugger around an assembled program.
    pub fn new(ctl: ExecutionController) -> Self {
        let mem_scroll = ctl.config().ram.start as usize / MEM_ROW;
        Self {
            ctl,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            mem_scroll,
            run_count: 0,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        let line = self.ctl.current_line();
        match self.ctl.step() {
            Ok(true) => {
                let text = self.ctl.lines().get(line).map_or("", |l| l.text.as_str());
                self.status = format!("PC=${:04X} after: {}", self.ctl.registers().pc, text);
            }
            Ok(false) => {
                self.status = "Program finished (END/SWI).".into();
                self.running = false;
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Undo the last step.
    pub fn step_back(&mut self) {
        self.running = false;
        self.status = if self.ctl.step_back() {
            format!("Stepped back to line {}", self.ctl.current_line() + 1)
        } else {
            "No history to step back into.".into()
        };
    }

    /// Start continuous execution.
    pub fn run(&mut self) {
        self.running = true;
        self.run_count = 0;
        self.status = "Running...".into();
    }

    /// Run one batch of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let limit = self.ctl.config().run_limit;

        for _ in 0..RUN_BATCH {
            if self.run_count >= limit {
                self.running = false;
                self.status = match self.ctl.status() {
                    Ok(LineStatus::Ready) => {
                        format!("Stopped after {} instructions (possible infinite loop)", limit)
                    }
                    Ok(_) => format!("Finished after {} instructions", self.run_count),
                    Err(e) => format!("Error: {}", e),
                };
                return;
            }
            match self.ctl.step() {
                Ok(true) => self.run_count += 1,
                Ok(false) => {
                    self.running = false;
                    self.status = format!("Finished after {} instructions", self.run_count);
                    return;
                }
                Err(e) => {
                    self.running = false;
                    self.status = format!("Error: {}", e);
                    return;
                }
            }
            if self.breakpoints.contains(&self.ctl.current_line()) {
                self.running = false;
                self.status = format!("Breakpoint at line {}", self.ctl.current_line() + 1);
                return;
            }
        }
    }

    /// Toggle a breakpoint on the current line.
    pub fn toggle_breakpoint(&mut self) {
        let line = self.ctl.current_line();
        if self.breakpoints.remove(&line) {
            self.status = format!("Removed breakpoint at line {}", line + 1);
        } else {
            self.breakpoints.insert(line);
            self.status = format!("Set breakpoint at line {}", line + 1);
        }
    }

    /// Reset registers and rewind to the first line.
    pub fn reset(&mut self) {
        self.ctl.reset();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    pub fn scroll_memory(&mut self, rows: isize) {
        let max = 0x10000 / MEM_ROW - 1;
        self.mem_scroll = self.mem_scroll.saturating_add_signed(rows).min(max);
    }

    /// Source rows around the current line.
    pub fn source_view(&self, rows: usize) -> Vec<SourceRow> {
        let lines = self.ctl.lines();
        let current = self.ctl.current_line();
        let start = current.saturating_sub(rows / 2);
        let addresses = self.ctl.assembly().map(|a| a.addresses.as_slice()).unwrap_or(&[]);

        lines
            .iter()
            .enumerate()
            .skip(start)
            .take(rows)
            .map(|(index, line)| SourceRow {
                index,
                address: addresses.get(index).copied(),
                text: line.text.clone(),
                is_current: index == current,
                is_breakpoint: self.breakpoints.contains(&index),
            })
            .collect()
    }
}

/// Run the debugger on an assembled program.
pub fn run_debugger(ctl: ExecutionController) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(ctl);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('u') => app.step_back(),
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_memory(-1),
                        KeyCode::Down => app.scroll_memory(1),
                        KeyCode::PageUp => app.scroll_memory(-16),
                        KeyCode::PageDown => app.scroll_memory(16),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
