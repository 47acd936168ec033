//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: String,

    /// Default from email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// Default from name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Whether the weekly report scheduler runs
    #[serde(default = "default_weekly_reports_enabled")]
    pub weekly_reports_enabled: bool,

    /// Day of the week the report goes out
    #[serde(default = "default_send_weekday")]
    pub send_weekday: String,

    /// How often the scheduler wakes to check, in seconds
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
}

impl EmailConfig {
    /// Get formatted from header
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Parse the configured send day
    pub fn send_weekday(&self) -> Result<chrono::Weekday, ValidationError> {
        self.send_weekday
            .parse()
            .map_err(|_| ValidationError::InvalidWeekday(self.send_weekday.clone()))
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        self.send_weekday()?;
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            weekly_reports_enabled: default_weekly_reports_enabled(),
            send_weekday: default_send_weekday(),
            check_interval_secs: default_check_interval(),
        }
    }
}

fn default_from_email() -> String {
    "coach@candor.app".to_string()
}

fn default_from_name() -> String {
    "Candor".to_string()
}

fn default_weekly_reports_enabled() -> bool {
    true
}

fn default_send_weekday() -> String {
    "monday".to_string()
}

fn default_check_interval() -> u64 {
    3600
}
