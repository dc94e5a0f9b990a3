use std::io::{self, Write};

use crossterm::style::{Attribute, SetAttribute};

use crate::rendering::OutputTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Game,
    GameOver,
}

/// Presentation targets the game loop pushes state into. The loop never reads them back.
pub trait Hud {
    fn show_screen(&mut self, screen: Screen);
    fn set_score(&mut self, score: u32);
    fn set_lives(&mut self, lives: u32);
    fn set_final_score(&mut self, score: u32);
    fn set_special_enabled(&mut self, enabled: bool);
}

/// On-screen buttons along the bottom row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchButton {
    Left,
    Right,
    Shoot,
    Special,
}

const TOUCH_BUTTONS: [TouchButton; 4] = [TouchButton::Left, TouchButton::Right, TouchButton::Shoot, TouchButton::Special];

/// Which touch button, if any, sits under a terminal cell.
pub fn touch_button_at(column: u16, row: u16, width: u16, height: u16) -> Option<TouchButton> {
    if width == 0 || height == 0 || row != height - 1 || column >= width {
        return None;
    }
    let slot = column as usize * TOUCH_BUTTONS.len() / width as usize;
    TOUCH_BUTTONS.get(slot).copied()
}

const TITLE_ART: [&str; 6] = [
    r"  ____ _____  _    ____  _____ _    _     _     ",
    r" / ___|_   _|/ \  |  _ \|  ___/ \  | |   | |    ",
    r" \___ \ | | / _ \ | |_) | |_ / _ \ | |   | |    ",
    r"  ___) || |/ ___ \|  _ <|  _/ ___ \| |___| |___ ",
    r" |____/ |_/_/   \_\_| \_\_|/_/   \_\_____|_____|",
    r"",
];

const CONTROLS_TEXT: [&str; 6] = [
    "Controls:",
    "  Left / A    : Move left",
    "  Right / D   : Move right",
    "  Space       : Fire",
    "  X           : Special attack",
    "  Q / Esc     : Quit",
];

#[derive(Clone, Debug, PartialEq)]
pub struct TerminalHud {
    pub screen: Screen,
    pub score: u32,
    pub lives: u32,
    pub final_score: u32,
    pub special_enabled: bool,
}

impl Default for TerminalHud {
    fn default() -> Self {
        TerminalHud {
            screen: Screen::Menu,
            score: 0,
            lives: 0,
            final_score: 0,
            special_enabled: false,
        }
    }
}

impl Hud for TerminalHud {
    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    fn set_lives(&mut self, lives: u32) {
        self.lives = lives;
    }

    fn set_final_score(&mut self, score: u32) {
        self.final_score = score;
    }

    fn set_special_enabled(&mut self, enabled: bool) {
        self.special_enabled = enabled;
    }
}

impl TerminalHud {
    pub fn render(&self, out: &mut OutputTarget, width: u16, height: u16) -> io::Result<()> {
        match self.screen {
            Screen::Menu => self.render_menu(out, width, height),
            Screen::Game => self.render_game(out, width, height),
            Screen::GameOver => self.render_game_over(out, width, height),
        }?;
        out.flush()
    }

    fn render_menu(&self, out: &mut OutputTarget, width: u16, height: u16) -> io::Result<()> {
        let start_y = (height / 2).saturating_sub(TITLE_ART.len() as u16 + 1);
        for (i, line) in TITLE_ART.iter().enumerate() {
            write_centered(out, width, start_y + i as u16, line)?;
        }
        if let Some((row, label)) = start_prompt(Screen::Menu, height) {
            write_centered(out, width, row, label)?;
        }

        let controls_start_y = height.saturating_sub(CONTROLS_TEXT.len() as u16);
        for (i, line) in CONTROLS_TEXT.iter().enumerate() {
            out.write_at(0, controls_start_y.saturating_add(i as u16), line)?;
        }
        Ok(())
    }

    fn render_game(&self, out: &mut OutputTarget, width: u16, height: u16) -> io::Result<()> {
        let special = if self.special_enabled { "READY (X)" } else { "charging" };
        out.write_at(0, 0, &format!("Score: {}  Lives: {}  Special: {}", self.score, self.lives, special))?;
        self.render_touch_bar(out, width, height)
    }

    fn render_touch_bar(&self, out: &mut OutputTarget, width: u16, height: u16) -> io::Result<()> {
        if height == 0 {
            return Ok(());
        }
        let slot_width = width as usize / TOUCH_BUTTONS.len();
        let mut bar = String::with_capacity(width as usize);
        for button in TOUCH_BUTTONS {
            let label = match button {
                TouchButton::Left => "[ <  ]",
                TouchButton::Right => "[  > ]",
                TouchButton::Shoot => "[FIRE]",
                TouchButton::Special if self.special_enabled => "[SPEC]",
                TouchButton::Special => "(spec)",
            };
            bar.push_str(&format!("{:^slot_width$}", label));
        }
        let row = height - 1;
        if !self.special_enabled {
            out.write_at(0, row, &bar)?;
            return Ok(());
        }
        out.execute_move_to(crossterm::cursor::MoveTo(0, row))?;
        out.execute_other_command(SetAttribute(Attribute::Bold))?;
        write!(out, "{}", bar)?;
        out.execute_other_command(SetAttribute(Attribute::Reset))
    }

    fn render_game_over(&self, out: &mut OutputTarget, width: u16, height: u16) -> io::Result<()> {
        let mid = height / 2;
        write_centered(out, width, mid.saturating_sub(2), "GAME OVER!")?;
        write_centered(out, width, mid, &format!("Final Score: {}", self.final_score))?;
        if let Some((row, label)) = start_prompt(Screen::GameOver, height) {
            write_centered(out, width, row, label)?;
        }
        write_centered(out, width, mid + 4, "Q / Esc: quit")
    }
}

/// Row and label of the clickable START / RESTART prompt on the menu and game-over panels.
fn start_prompt(screen: Screen, height: u16) -> Option<(u16, &'static str)> {
    match screen {
        Screen::Menu => {
            let start_y = (height / 2).saturating_sub(TITLE_ART.len() as u16 + 1);
            Some((start_y + TITLE_ART.len() as u16, "[ START ]  Enter or click"))
        }
        Screen::GameOver => Some((height / 2 + 2, "[ RESTART ]  Enter / R or click")),
        Screen::Game => None,
    }
}

/// Whether a click at this cell lands on the START / RESTART prompt of `screen`.
pub fn start_prompt_at(screen: Screen, column: u16, row: u16, width: u16, height: u16) -> bool {
    let Some((prompt_row, label)) = start_prompt(screen, height) else {
        return false;
    };
    let x = centered_x(width, label);
    row == prompt_row && column >= x && column < x + label.chars().count() as u16
}

fn centered_x(width: u16, text: &str) -> u16 {
    (width / 2).saturating_sub(text.chars().count() as u16 / 2)
}

fn write_centered(out: &mut OutputTarget, width: u16, y: u16, text: &str) -> io::Result<()> {
    out.write_at(centered_x(width, text), y, text)
}
