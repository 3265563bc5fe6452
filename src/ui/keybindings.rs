// Keybindings for the shelf catalog browser
// Translates key presses into navigation input for the browser
//
// Keybindings:
// - Arrow keys / hjkl: Move the selection
// - Enter: Open the detail overlay for the selected item
// - Escape: Close the detail overlay
// - t: Toggle horizontal/vertical layout

use gdk4::Key;
use gtk4::prelude::*;
use gtk4::{EventControllerKey, PropagationPhase, Widget};
use std::cell::RefCell;
use std::rc::Rc;

use crate::nav::{Direction, NavInput};

/// Callback type for navigation input
pub type InputCallback = Box<dyn Fn(NavInput)>;

/// Map a key to its navigation input, if it has one.
pub fn input_for_key(keyval: Key) -> Option<NavInput> {
    let input = match keyval {
        // Arrow keys
        Key::Up => NavInput::Move(Direction::Up),
        Key::Down => NavInput::Move(Direction::Down),
        Key::Left => NavInput::Move(Direction::Left),
        Key::Right => NavInput::Move(Direction::Right),
        // Vim-style keys (hjkl)
        Key::k => NavInput::Move(Direction::Up),
        Key::j => NavInput::Move(Direction::Down),
        Key::h => NavInput::Move(Direction::Left),
        Key::l => NavInput::Move(Direction::Right),
        Key::Return | Key::KP_Enter => NavInput::Activate,
        Key::Escape => NavInput::Dismiss,
        Key::t | Key::T => NavInput::ToggleLayout,
        _ => return None,
    };
    Some(input)
}

/// Key controller scoped to one widget. Input stops as soon as the
/// controller is detached or dropped.
pub struct Keybindings {
    controller: EventControllerKey,
    attached_to: RefCell<Option<glib::WeakRef<Widget>>>,
    on_input: Rc<RefCell<Option<InputCallback>>>,
}

impl Keybindings {
    /// Create a new keybinding manager
    pub fn new() -> Self {
        let controller = EventControllerKey::new();
        controller.set_propagation_phase(PropagationPhase::Capture);

        let on_input: Rc<RefCell<Option<InputCallback>>> = Rc::new(RefCell::new(None));

        let on_input_clone = on_input.clone();
        controller.connect_key_pressed(move |_controller, keyval, _keycode, _state| {
            let Some(input) = input_for_key(keyval) else {
                return glib::Propagation::Proceed;
            };
            if let Some(ref callback) = *on_input_clone.borrow() {
                callback(input);
                return glib::Propagation::Stop;
            }
            glib::Propagation::Proceed
        });

        Self {
            controller,
            attached_to: RefCell::new(None),
            on_input,
        }
    }

    /// Attach keybindings to a widget (typically the main window). Any
    /// previous attachment is removed first.
    pub fn attach(&self, widget: &impl IsA<Widget>) {
        self.detach();
        widget.add_controller(self.controller.clone());
        *self.attached_to.borrow_mut() = Some(widget.upcast_ref::<Widget>().downgrade());
    }

    /// Remove the controller from its widget and drop the input callback.
    pub fn detach(&self) {
        if let Some(widget) = self.attached_to.take().and_then(|weak| weak.upgrade()) {
            widget.remove_controller(&self.controller);
        }
    }

    /// Connect callback for navigation input
    pub fn connect_input<F>(&self, callback: F)
    where
        F: Fn(NavInput) + 'static,
    {
        *self.on_input.borrow_mut() = Some(Box::new(callback));
    }

    pub fn disconnect_input(&self) {
        self.on_input.borrow_mut().take();
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Keybindings {
    fn drop(&mut self) {
        self.detach();
        self.disconnect_input();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_and_vim_keys_move() {
        assert_eq!(input_for_key(Key::Up), Some(NavInput::Move(Direction::Up)));
        assert_eq!(input_for_key(Key::j), Some(NavInput::Move(Direction::Down)));
        assert_eq!(input_for_key(Key::h), Some(NavInput::Move(Direction::Left)));
        assert_eq!(
            input_for_key(Key::Right),
            Some(NavInput::Move(Direction::Right))
        );
    }

    #[test]
    fn test_overlay_and_layout_keys() {
        assert_eq!(input_for_key(Key::Return), Some(NavInput::Activate));
        assert_eq!(input_for_key(Key::KP_Enter), Some(NavInput::Activate));
        assert_eq!(input_for_key(Key::Escape), Some(NavInput::Dismiss));
        assert_eq!(input_for_key(Key::t), Some(NavInput::ToggleLayout));
    }

    #[test]
    fn test_unbound_keys_pass_through() {
        assert_eq!(input_for_key(Key::space), None);
        assert_eq!(input_for_key(Key::f), None);
        assert_eq!(input_for_key(Key::Delete), None);
    }
}
