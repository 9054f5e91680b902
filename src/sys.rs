pub mod debounce;
pub mod geometry;
pub mod hotkey;
pub mod process;
pub mod screen;
pub mod thread;
pub mod window_buttons;
