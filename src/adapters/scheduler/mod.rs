//! Background schedulers.

pub mod weekly_scheduler;

pub use weekly_scheduler::{WeeklyScheduler, WeeklySchedulerConfig};
