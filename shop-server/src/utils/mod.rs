//! Utility modules

pub mod logger;
pub mod time;

pub use logger::{cleanup_old_logs, init_logger, init_logger_with_file};
pub use time::{CalendarDay, Clock, ManualClock, SystemClock, calendar_day, parse_timezone};
