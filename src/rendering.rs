use std::io::{self, Write};
use log::info;
use crossterm::{
    cursor::MoveTo,
    execute,
    style::{self, ResetColor, SetForegroundColor},
};

use crate::assets::Sprite;
use crate::types::{Color, Rect};

const FILL_GLYPH: char = '█';

/// Drawing surface in canvas pixel coordinates.
pub trait Canvas {
    fn clear(&mut self);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Draws `sprite` stretched over `rect`, rotated by `rotation` radians around the rect centre.
    fn draw_sprite(&mut self, sprite: &Sprite, rect: Rect, rotation: f64);
}

// --- ScreenBuffer for simulated rendering ---
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    #[cfg(test)]
    pub fn row(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|r| r.iter().collect())
            .unwrap_or_default()
    }

    pub fn print_to_log(&self) {
        info!("--- Screen Buffer ---");
        for row in &self.buffer {
            info!("{}", row.iter().collect::<String>());
        }
        info!("---------------------");
    }
}

impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        self.write_str(&s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn execute_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    pub fn execute_other_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => execute!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()), // Ignore in debug mode
        }
    }

    pub fn write_at(&mut self, x: u16, y: u16, text: &str) -> io::Result<()> {
        self.execute_move_to(MoveTo(x, y))?;
        write!(self, "{}", text)
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => sb.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(sb) => sb.flush(),
        }
    }
}

pub fn terminal_color(color: Color) -> style::Color {
    match color {
        Color::White => style::Color::White,
        Color::Grey => style::Color::DarkGrey,
        Color::Cyan => style::Color::Cyan,
        Color::Brown => style::Color::DarkYellow,
        Color::Yellow => style::Color::Yellow,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

const BLANK: Cell = Cell { glyph: ' ', color: Color::White };

// --- GameGrid: rasterises the canvas onto terminal cells ---
pub struct GameGrid {
    pub grid: Vec<Vec<Cell>>,
    pub width: u16,
    pub height: u16,
    scale_x: f64,
    scale_y: f64,
}

impl GameGrid {
    pub fn new(width: u16, height: u16, canvas_width: f64, canvas_height: f64) -> Self {
        GameGrid {
            grid: vec![vec![BLANK; width as usize]; height as usize],
            width,
            height,
            scale_x: width as f64 / canvas_width,
            scale_y: height as f64 / canvas_height,
        }
    }

    pub fn set_cell(&mut self, x: i64, y: i64, glyph: char, color: Color) {
        if x >= 0 && y >= 0 && y < self.height as i64 && x < self.width as i64 {
            self.grid[y as usize][x as usize] = Cell { glyph, color };
        }
    }

    #[cfg(test)]
    pub fn glyph_at(&self, x: u16, y: u16) -> char {
        self.grid
            .get(y as usize)
            .and_then(|r| r.get(x as usize))
            .map_or(' ', |c| c.glyph)
    }

    /// Cell span `[start, end)` covered by a canvas interval; never empty for a non-empty interval.
    fn span(start: f64, end: f64, scale: f64) -> (i64, i64) {
        let first = (start * scale).floor() as i64;
        let last = ((end * scale).ceil() as i64).max(first + 1);
        (first, last)
    }

    pub fn render(&self, stdout: &mut OutputTarget) -> io::Result<()> {
        for (y, row) in self.grid.iter().enumerate() {
            stdout.execute_move_to(MoveTo(0, y as u16))?;
            let mut current: Option<Color> = None;
            let mut run = String::new();
            for cell in row {
                if current != Some(cell.color) && cell.glyph != ' ' {
                    if !run.is_empty() {
                        write!(stdout, "{}", run)?;
                        run.clear();
                    }
                    stdout.execute_other_command(SetForegroundColor(terminal_color(cell.color)))?;
                    current = Some(cell.color);
                }
                run.push(cell.glyph);
            }
            write!(stdout, "{}", run)?;
        }
        stdout.execute_other_command(ResetColor)?;
        Ok(())
    }

    pub fn clear_screen_manual(&self, stdout: &mut OutputTarget, terminal_width: u16, terminal_height: u16) -> io::Result<()> {
        for y in 0..terminal_height {
            stdout.execute_move_to(MoveTo(0, y))?;
            write!(stdout, "{}", " ".repeat(terminal_width as usize))?;
        }
        stdout.execute_move_to(MoveTo(0, 0))?;
        Ok(())
    }
}

impl Canvas for GameGrid {
    fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(BLANK);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, x1) = Self::span(rect.x, rect.right(), self.scale_x);
        let (y0, y1) = Self::span(rect.y, rect.bottom(), self.scale_y);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_cell(x, y, FILL_GLYPH, color);
            }
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, rect: Rect, rotation: f64) {
        let center = rect.center();
        // A rotated sprite stays inside the circle through the rect's corners.
        let reach = if rotation == 0.0 {
            (rect.width / 2.0, rect.height / 2.0)
        } else {
            let r = rect.width.hypot(rect.height) / 2.0;
            (r, r)
        };
        let (x0, x1) = Self::span(center.x - reach.0, center.x + reach.0, self.scale_x);
        let (y0, y1) = Self::span(center.y - reach.1, center.y + reach.1, self.scale_y);
        let (sin, cos) = rotation.sin_cos();

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = (x as f64 + 0.5) / self.scale_x - center.x;
                let dy = (y as f64 + 0.5) / self.scale_y - center.y;
                // Undo the rotation to find where this cell lands on the sprite.
                let local_x = dx * cos + dy * sin;
                let local_y = -dx * sin + dy * cos;
                let u = local_x / rect.width + 0.5;
                let v = local_y / rect.height + 0.5;
                if let Some(glyph) = sprite.sample(u, v) {
                    self.set_cell(x, y, glyph, sprite.tint);
                }
            }
        }
    }
}
