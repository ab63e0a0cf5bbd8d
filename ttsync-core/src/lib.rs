//! Reconciliation engine for mirroring a university timetable into a remote
//! calendar.
//!
//! Timetable cells are grouped into recurring [`EventSeries`], remote events
//! are decoded into the same form, and [`diff::changes`] works out the
//! creates, updates and deletes that [`sync::SyncDriver`] then applies.

pub mod address;
pub mod config;
pub mod date_range;
pub mod diff;
pub mod error;
pub mod event;
pub mod grouping;
pub mod recurrence;
pub mod remote;
pub mod sync;
pub mod timetable;

pub use event::{EncodeContext, EventInstance, EventSeries, EventView, GroupId, TimeSlot};
