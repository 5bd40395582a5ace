//! Terminal UI (TUI) module for the Cura client.

// === Submodules ===

pub mod app;
pub mod scrolling;
pub mod selection;
pub mod ui;
pub mod views;
pub mod widgets;

// === Re-exports ===

pub use ui::run_tui;
