//! Computing the changes that bring a remote calendar in line with the
//! timetable. Everything here is pure.

mod changes;
mod counts;
mod diff_kind;
mod series_diff;

pub use changes::{changes, replace_all};
pub use counts::DiffCounts;
pub use diff_kind::DiffKind;
pub use series_diff::SeriesDiff;
