//! Google Calendar backend for ttsync.
//!
//! OAuth client credentials live in `~/.config/ttsync/google/app_config.toml`
//! and signed-in sessions under `~/.config/ttsync/google/session/`.

mod app_config;
mod auth;
mod calendar;
mod convert;
mod session;

pub use auth::authenticate;
pub use calendar::GoogleCalendar;
pub use session::Session;
