//! Per-tick input state for the player-controlled agent
//!
//! The input layer reports pressed/released transitions; the controller
//! reads the resulting state each tick. Interact is edge-triggered: one
//! press yields exactly one rescue attempt.

/// A bindable control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Reload,
    Interact,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    pub reload: bool,
    pub interact: bool,
    interact_queued: bool,
}

impl InputState {
    pub fn press(&mut self, button: Button) {
        match button {
            Button::Left => self.left = true,
            Button::Right => self.right = true,
            Button::Up => self.up = true,
            Button::Down => self.down = true,
            Button::Fire => self.fire = true,
            Button::Reload => self.reload = true,
            Button::Interact => {
                self.interact = true;
                self.interact_queued = true;
            }
        }
    }

    pub fn release(&mut self, button: Button) {
        match button {
            Button::Left => self.left = false,
            Button::Right => self.right = false,
            Button::Up => self.up = false,
            Button::Down => self.down = false,
            Button::Fire => self.fire = false,
            Button::Reload => self.reload = false,
            Button::Interact => self.interact = false,
        }
    }

    /// Consumes a queued interact press, if any
    pub fn take_interact(&mut self) -> bool {
        std::mem::take(&mut self.interact_queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut input = InputState::default();
        input.press(Button::Left);
        assert!(input.left);
        input.release(Button::Left);
        assert!(!input.left);
    }

    #[test]
    fn test_interact_is_edge_triggered() {
        let mut input = InputState::default();
        input.press(Button::Interact);

        assert!(input.take_interact());
        // Holding the button does not retrigger.
        assert!(!input.take_interact());

        input.release(Button::Interact);
        input.press(Button::Interact);
        assert!(input.take_interact());
    }
}
