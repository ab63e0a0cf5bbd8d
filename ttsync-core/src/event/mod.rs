//! Event model: slots, instances, group keys and series.

mod instance;
mod series;
mod slot;
mod view;

pub use instance::{EventInstance, GroupId};
pub use series::EventSeries;
pub use slot::TimeSlot;
pub use view::{EncodeContext, EventView, SeriesView};
