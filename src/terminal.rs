use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        poll, read, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
    mouse_capture: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

/// Input event delivered to a pattern's run loop.
pub enum InputEvent {
    Key(KeyCode, KeyModifiers),
    /// Left mouse button press at (column, row).
    Click(u16, u16),
}

impl Terminal {
    /// Initialize the terminal for drawing
    pub fn new(alternate_screen: bool, mouse_capture: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }
        if mouse_capture {
            execute!(stdout(), EnableMouseCapture)?;
        }

        let buffer = vec![vec![Cell::default(); width as usize]; height as usize];

        Ok(Self {
            width,
            height,
            buffer,
            alternate_screen,
            mouse_capture,
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Reallocate the back buffer after a terminal resize
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Render the entire back buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();
        queue!(out, MoveTo(0, 0))?;

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Check for a key or mouse press (non-blocking)
    pub fn check_event(&self) -> io::Result<Option<InputEvent>> {
        if poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(key_event) => {
                    return Ok(Some(InputEvent::Key(key_event.code, key_event.modifiers)))
                }
                Event::Mouse(mouse_event) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
                        return Ok(Some(InputEvent::Click(
                            mouse_event.column,
                            mouse_event.row,
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Wait for a keypress with timeout
    pub fn wait_key(&self, timeout_ms: u64) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(timeout_ms))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }

    /// Sleep for specified duration
    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds));
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.mouse_capture {
            let _ = execute!(stdout(), DisableMouseCapture);
        }
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
