//! Notification handlers for outbound email.

mod teaser_mailer;
mod weekly_report_mailer;

pub use teaser_mailer::TeaserMailer;
pub use weekly_report_mailer::{WeeklyReportMailer, WeeklyRunReport};
