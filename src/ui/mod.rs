mod detail_overlay;
mod image_cache;
mod keybindings;
mod list_view;
mod row_widget;
mod window;

pub use window::MainWindow;
