//! Email delivery adapters.

pub mod mock_sender;
pub mod resend_sender;

pub use mock_sender::MockEmailSender;
pub use resend_sender::{ResendConfig, ResendEmailSender};
