//! Notification module. Email triggers and their idempotency records.
//!
//! Two emails exist: a one-time teaser when a locked-out user first has
//! findings, and a weekly report for paying users. Both are guarded by
//! the (user, kind, iso_year, iso_week) uniqueness of `EmailSendRecord`.

mod composer;
mod email;
mod errors;
mod events;

pub use composer::EmailComposer;
pub use email::{AnalysisSnapshot, EmailKind, EmailMessage, EmailSendRecord};
pub use errors::NotificationError;
pub use events::EmailSent;
