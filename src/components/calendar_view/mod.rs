//! Month grids, date queries and presentation helpers over decoded events.

pub mod format;
pub mod grid;
pub mod links;
pub mod query;

pub use grid::{build_month_grid, CalendarGridCell};
pub use links::google_calendar_link;
pub use query::{events_in_month, events_in_range, events_on_date, group_by_date, sort_by_date};
