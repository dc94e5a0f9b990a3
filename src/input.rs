//! Logical controls shared by every input device.
//!
//! Keyboard, on-screen touch buttons and mouse clicks all write the same three
//! flags. A start event sets a flag and its matching end event clears it. There
//! is no per-source bookkeeping, so releasing a control on one device releases
//! it for all of them.

use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Fire,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Touch,
    Mouse,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl InputState {
    pub fn press(&mut self, source: InputSource, control: Control) {
        debug!("{:?} pressed {:?}", source, control);
        *self.flag(control) = true;
    }

    pub fn release(&mut self, source: InputSource, control: Control) {
        debug!("{:?} released {:?}", source, control);
        *self.flag(control) = false;
    }

    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Left => self.left,
            Control::Right => self.right,
            Control::Fire => self.fire,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn flag(&mut self, control: Control) -> &mut bool {
        match control {
            Control::Left => &mut self.left,
            Control::Right => &mut self.right,
            Control::Fire => &mut self.fire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_toggle_one_flag() {
        let mut input = InputState::default();
        input.press(InputSource::Keyboard, Control::Left);
        assert_eq!(input, InputState { left: true, ..InputState::default() });
        input.release(InputSource::Keyboard, Control::Left);
        assert_eq!(input, InputState::default());
    }

    #[test]
    fn sources_merge_into_one_flag() {
        let mut input = InputState::default();
        input.press(InputSource::Touch, Control::Fire);
        input.press(InputSource::Keyboard, Control::Right);
        assert!(input.is_held(Control::Fire));
        assert!(input.is_held(Control::Right));
        assert!(!input.is_held(Control::Left));
    }

    #[test]
    fn any_release_wins_over_another_sources_press() {
        let mut input = InputState::default();
        input.press(InputSource::Keyboard, Control::Fire);
        input.press(InputSource::Mouse, Control::Fire);
        input.release(InputSource::Mouse, Control::Fire);
        assert!(!input.fire);
    }

    #[test]
    fn clear_drops_everything() {
        let mut input = InputState { left: true, right: true, fire: true };
        input.clear();
        assert_eq!(input, InputState::default());
    }
}
