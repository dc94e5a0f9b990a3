use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use log::{error, info};

use crate::audio::AudioSink;
use crate::config::GameConfig;
use crate::constants::KEY_RELEASE_FALLBACK_MS;
use crate::hud::{Screen, TerminalHud, TouchButton, start_prompt_at, touch_button_at};
use crate::input::{Control, InputSource, InputState};
use crate::rendering::{GameGrid, OutputTarget};
use crate::session::Session;
use crate::terminal_io::SimulatedInput;

/// Terminal front end: pumps crossterm events into the session and paints each frame.
pub struct Game {
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub stdout_target: OutputTarget,
    simulated_input: Option<SimulatedInput>,
    debug_mode_active: bool,
    max_frames: Option<u64>,
    frame_duration: Duration,
    reports_key_release: bool,
    key_holds: HashMap<Control, Instant>,
    pointer_holds: HashMap<MouseButton, (InputSource, Control)>,
    input: InputState,
    quit: bool,
}

impl Game {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        terminal_width: u16,
        terminal_height: u16,
        stdout_target: OutputTarget,
        simulated_input: Option<SimulatedInput>,
        debug_mode_active: bool,
        max_frames: Option<u64>,
        fps: u32,
        reports_key_release: bool,
    ) -> Self {
        Game {
            terminal_width,
            terminal_height,
            stdout_target,
            simulated_input,
            debug_mode_active,
            max_frames,
            frame_duration: Duration::from_secs(1) / fps.max(1),
            reports_key_release,
            key_holds: HashMap::new(),
            pointer_holds: HashMap::new(),
            input: InputState::default(),
            quit: false,
        }
    }

    /// Runs until the player quits, the script runs out, or `max_frames` is reached.
    /// Returns the number of frames shown.
    pub fn run<A: AudioSink>(&mut self, session: &mut Session<TerminalHud, A>, config: &GameConfig) -> io::Result<u64> {
        let started = Instant::now();
        let mut grid = GameGrid::new(self.terminal_width, self.terminal_height, config.canvas_width, config.canvas_height);
        let mut frame_count: u64 = 0;

        while !self.quit && self.max_frames.is_none_or(|max| frame_count < max) {
            let frame_start = Instant::now();

            for event in self.collect_events(frame_count, frame_start)? {
                self.handle_event(event, session);
            }
            if self.quit {
                break;
            }
            self.expire_key_holds(Instant::now());

            if grid.width != self.terminal_width || grid.height != self.terminal_height {
                grid = GameGrid::new(self.terminal_width, self.terminal_height, config.canvas_width, config.canvas_height);
            }

            if session.hud().screen == Screen::Game && session.is_running() {
                let now_ms = if self.debug_mode_active {
                    (self.frame_duration.as_nanos() * u128::from(frame_count) / 1_000_000) as u64
                } else {
                    started.elapsed().as_millis() as u64
                };
                if !session.frame(&self.input, now_ms, &mut grid) {
                    self.input.clear();
                    self.key_holds.clear();
                    self.pointer_holds.clear();
                }
                grid.render(&mut self.stdout_target).map_err(|e| { error!("Failed to render game grid: {}", e); e })?;
            } else {
                grid.clear_screen_manual(&mut self.stdout_target, self.terminal_width, self.terminal_height)?;
            }
            session
                .hud()
                .render(&mut self.stdout_target, self.terminal_width, self.terminal_height)
                .map_err(|e| { error!("Failed to render HUD: {}", e); e })?;

            if let OutputTarget::ScreenBuffer(sb) = &self.stdout_target {
                sb.print_to_log();
            }

            frame_count += 1;
            if self.simulated_input.as_ref().is_some_and(SimulatedInput::is_exhausted) && !session.is_running() {
                info!("Scripted input exhausted and no game in progress. Stopping.");
                break;
            }
        }

        info!("Front end stopped after {} frames", frame_count);
        Ok(frame_count)
    }

    fn collect_events(&mut self, frame_count: u64, frame_start: Instant) -> io::Result<Vec<Event>> {
        if let Some(script) = &mut self.simulated_input {
            return Ok(script.drain(frame_count));
        }
        let deadline = frame_start + self.frame_duration;
        let mut events = Vec::new();
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout).map_err(|e| { error!("Failed to poll event: {}", e); e })? {
                break;
            }
            events.push(event::read().map_err(|e| { error!("Failed to read event: {}", e); e })?);
        }
        Ok(events)
    }

    fn handle_event<A: AudioSink>(&mut self, event: Event, session: &mut Session<TerminalHud, A>) {
        match event {
            Event::Key(key) => self.handle_key(key, session),
            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::Down(button) => {
                        session.note_user_interaction();
                        self.handle_pointer_down(button, mouse.column, mouse.row, session);
                    }
                    MouseEventKind::Up(button) => self.handle_pointer_up(button),
                    _ => {}
                }
            }
            Event::Resize(new_width, new_height) => {
                self.terminal_width = new_width;
                self.terminal_height = new_height;
                info!("Terminal resized to {}x{}", new_width, new_height);
            }
            _ => {}
        }
    }

    fn handle_key<A: AudioSink>(&mut self, key: KeyEvent, session: &mut Session<TerminalHud, A>) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            info!("Ctrl+C pressed. Exiting.");
            self.quit = true;
            return;
        }
        if key.kind == KeyEventKind::Press {
            session.note_user_interaction();
        }

        match session.hud().screen {
            Screen::Menu | Screen::GameOver => {
                if key.kind != KeyEventKind::Press {
                    return;
                }
                match key.code {
                    KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R') => self.start(session),
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        info!("Quit key pressed. Exiting.");
                        self.quit = true;
                    }
                    _ => {}
                }
            }
            Screen::Game => {
                let control = match key.code {
                    KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Control::Left),
                    KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::Right),
                    KeyCode::Char(' ') => Some(Control::Fire),
                    _ => None,
                };
                if let Some(control) = control {
                    self.apply_key(control, key.kind);
                    return;
                }
                if key.kind != KeyEventKind::Press {
                    return;
                }
                match key.code {
                    KeyCode::Char('x') | KeyCode::Char('X') => {
                        session.trigger_special();
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        info!("Quit key pressed mid-game. Exiting.");
                        session.end();
                        self.quit = true;
                    }
                    _ => {}
                }
            }
        }
    }

    fn apply_key(&mut self, control: Control, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.input.press(InputSource::Keyboard, control);
                if !self.reports_key_release {
                    self.key_holds.insert(control, Instant::now() + Duration::from_millis(KEY_RELEASE_FALLBACK_MS));
                }
            }
            KeyEventKind::Release => {
                self.key_holds.remove(&control);
                self.input.release(InputSource::Keyboard, control);
            }
        }
    }

    /// Without release events a key counts as held until auto-repeat stops refreshing it.
    fn expire_key_holds(&mut self, now: Instant) {
        let expired: Vec<Control> = self
            .key_holds
            .iter()
            .filter(|(_, until)| **until <= now)
            .map(|(control, _)| *control)
            .collect();
        for control in expired {
            self.key_holds.remove(&control);
            self.input.release(InputSource::Keyboard, control);
        }
    }

    fn handle_pointer_down<A: AudioSink>(&mut self, button: MouseButton, column: u16, row: u16, session: &mut Session<TerminalHud, A>) {
        let source = match button {
            MouseButton::Left => InputSource::Touch,
            _ => InputSource::Mouse,
        };
        match session.hud().screen {
            screen @ (Screen::Menu | Screen::GameOver) => {
                if start_prompt_at(screen, column, row, self.terminal_width, self.terminal_height) {
                    self.start(session);
                }
            }
            Screen::Game => {
                let control = match touch_button_at(column, row, self.terminal_width, self.terminal_height) {
                    Some(TouchButton::Left) => Control::Left,
                    Some(TouchButton::Right) => Control::Right,
                    Some(TouchButton::Shoot) => Control::Fire,
                    Some(TouchButton::Special) => {
                        session.trigger_special();
                        return;
                    }
                    None => return,
                };
                self.input.press(source, control);
                if let Some((previous_source, previous)) = self.pointer_holds.insert(button, (source, control)) {
                    self.release_pointer_control(previous_source, previous);
                }
            }
        }
    }

    /// Each button releases only what it pressed; a control stays held while another button holds it.
    fn handle_pointer_up(&mut self, button: MouseButton) {
        if let Some((source, control)) = self.pointer_holds.remove(&button) {
            self.release_pointer_control(source, control);
        }
    }

    fn release_pointer_control(&mut self, source: InputSource, control: Control) {
        if !self.pointer_holds.values().any(|(_, held)| *held == control) {
            self.input.release(source, control);
        }
    }

    fn start<A: AudioSink>(&mut self, session: &mut Session<TerminalHud, A>) {
        self.input.clear();
        self.key_holds.clear();
        self.pointer_holds.clear();
        session.start();
    }
}
