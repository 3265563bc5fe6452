//! Keyboard navigation: cursor movement, overlay gating and layout toggling.
//!
//! Pure state with no GTK types, so every transition is unit tested.

pub mod browser;
pub mod overlay;
pub mod selection;

pub use browser::{Browser, NavInput, Update};
pub use overlay::DetailView;
pub use selection::{Cursor, Direction, RowAlignment};
