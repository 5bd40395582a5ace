//! Screen rendering for the Cura TUI.

// === Submodules ===

pub mod admin;
pub mod appointments;
pub mod login;
pub mod meeting;
pub mod reports;
pub mod schedule;

// === Re-exports ===

pub use admin::render_admin;
pub use appointments::render_appointments;
pub use login::render_login;
pub use meeting::render_meeting;
pub use reports::render_reports;
pub use schedule::render_schedule;
