pub mod fs;
pub mod tui;
