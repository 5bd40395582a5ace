//! Shared widgets for the Cura TUI.

mod header;

pub use header::render_header;
