use std::collections::HashMap;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

// --- SimulatedInput for debugging ---
/// Scripted terminal events keyed by the frame they should arrive on.
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// Takes every event scheduled for `frame_count`.
    pub fn drain(&mut self, frame_count: u64) -> Vec<Event> {
        self.events.remove(&frame_count).unwrap_or_default()
    }

    pub fn is_exhausted(&self) -> bool {
        self.events.is_empty()
    }

    /// Start a game, strafe right while firing, fire the special attack, then quit.
    pub fn demo() -> Self {
        let mut script: HashMap<u64, Vec<Event>> = HashMap::new();
        let mut at = |frame: u64, event: Event| script.entry(frame).or_default().push(event);

        at(1, key(KeyCode::Enter, KeyEventKind::Press));
        at(2, key(KeyCode::Right, KeyEventKind::Press));
        at(2, key(KeyCode::Char(' '), KeyEventKind::Press));
        at(30, key(KeyCode::Right, KeyEventKind::Release));
        at(31, key(KeyCode::Char('a'), KeyEventKind::Press));
        at(60, key(KeyCode::Char('a'), KeyEventKind::Release));
        at(61, key(KeyCode::Char(' '), KeyEventKind::Release));
        at(62, key(KeyCode::Char('x'), KeyEventKind::Press));
        at(63, click(MouseEventKind::Down(MouseButton::Left), 50, 23));
        at(70, click(MouseEventKind::Up(MouseButton::Left), 50, 23));
        at(120, key(KeyCode::Char('q'), KeyEventKind::Press));

        SimulatedInput::new(script)
    }
}

pub fn key(code: KeyCode, kind: KeyEventKind) -> Event {
    Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind))
}

pub fn click(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
}
