use crate::TermInt;
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, KeyEventKind, read, poll};

/// A full screen of characters, drawn into before being sent to the terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: TermInt,
    height: TermInt,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        Canvas { width, height, cells: vec![' '; width as usize * height as usize] }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    /// Out-of-range positions are ignored.
    pub fn put(&mut self, x: TermInt, y: TermInt, ch: char) {
        if x < self.width && y < self.height {
            self.cells[self.width as usize * y as usize + x as usize] = ch;
        }
    }

    pub fn get(&self, x: TermInt, y: TermInt) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.cells[self.width as usize * y as usize + x as usize])
        } else {
            None
        }
    }

    pub fn text(&mut self, x: TermInt, y: TermInt, text: &str) {
        for (i, ch) in text.chars().enumerate() {
            self.put(x.saturating_add(i as TermInt), y, ch);
        }
    }

    /// Text centered on column `center_x`.
    pub fn text_centered(&mut self, center_x: TermInt, y: TermInt, text: &str) {
        let len = text.chars().count() as TermInt;
        self.text(center_x.saturating_sub(len / 2), y, text);
    }

    pub fn draw_borders(&mut self) {
        if self.width < 2 || self.height < 2 {
            return;
        }
        let end_x = self.width - 1;
        let end_y = self.height - 1;

        for x in 0..self.width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.put(x, 0, ch);
            self.put(x, end_y, ch);
        }

        for y in 1..end_y {
            self.put(0, y, '|');
            self.put(end_x, y, '|');
        }
    }

    /// Centered box of lines padded by one blank row and column on each side.
    pub fn message(&mut self, lines: &[&str]) {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        for y_diff in 0..msg_height {
            for x_diff in 0..msg_width {
                self.put(top_left.0 + x_diff, top_left.1 + y_diff, ' ');
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            self.text(top_left.0, top_left.1 + i as TermInt + 1, &padded_line);
        }
    }
}

/// Owns the terminal while the game runs. Dropping it puts the terminal back.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    /// What is currently on screen
    screen: Canvas,
    active: bool,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size().context("failed to read terminal size")?;
        let stdout = stdout();
        let screen = Canvas::new(width, height);
        Ok(TermManager { width, height, stdout, screen, active: false })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        self.active = true;
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking).context("failed to hide cursor")?;
        self.clear()
    }

    /// Best effort: every step is attempted even if an earlier one fails.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("failed to disable raw mode: {}", err);
        }
        if let Err(err) = execute!(self.stdout, cursor::Show, cursor::EnableBlinking) {
            log::error!("failed to show cursor: {}", err);
        }
        if let Err(err) = execute!(self.stdout, LeaveAlternateScreen) {
            log::error!("failed to leave alternate screen: {}", err);
        }
    }

    /// Fails unless a field of `cols` x `rows` characters fits on screen.
    pub fn ensure_fits(&self, cols: TermInt, rows: TermInt) -> Result<()> {
        if cols > self.width || rows > self.height {
            bail!(
                "terminal is {}x{} but the game needs {}x{}; enlarge it or pass a smaller --width/--height",
                self.width, self.height, cols, rows
            );
        }
        Ok(())
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("failed to read terminal event")? {
                if ev.kind != KeyEventKind::Release {
                    return Ok(ev);
                }
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0)).context("failed to poll terminal events")? {
            if let Event::Key(ev) = read().context("failed to read terminal event")? {
                if ev.kind != KeyEventKind::Release {
                    events.push(ev);
                }
            }
        }

        Ok(events)
    }

    /// Sends only the cells that differ from what is already on screen.
    pub fn draw(&mut self, frame: &Canvas) -> Result<()> {
        for y in 0..frame.height().min(self.height) {
            for x in 0..frame.width().min(self.width) {
                let ch = frame.get(x, y).unwrap_or(' ');
                if self.screen.get(x, y) != Some(ch) {
                    queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch))
                        .context("failed to write to terminal")?;
                    self.screen.put(x, y, ch);
                }
            }
        }

        self.flush()
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("failed to clear terminal")?;
        self.screen = Canvas::new(self.width, self.height);
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("failed to flush terminal")
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        self.restore();
    }
}
