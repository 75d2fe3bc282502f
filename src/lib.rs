//! Personal calendar/journal core.
//!
//! - `model`: the day-keyed calendar store and its records
//! - `recurrence`: which time blocks occur on a given date
//! - `history`: undo/redo over every calendar change, persisted through a
//!   `storage::DurableStore`

pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod recurrence;
pub mod storage;

pub use error::{Error, Result};
pub use history::History;
pub use model::{CalendarData, Category, DayData, Frequency, RecurrenceRule, TimeBlock};
pub use recurrence::{resolve_blocks_for_date, ResolvedBlock};
