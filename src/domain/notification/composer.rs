//! Email composition from analysis output.
//!
//! Pure string assembly. The composer resolves dimension keys to their
//! catalog labels; delivery, addressing headers, and retry policy all
//! belong to the sender adapter.

use crate::domain::analysis::{DimensionPattern, InsightsReport};
use crate::domain::catalog::{CriteriaRegistry, DimensionKey};
use crate::domain::foundation::Timestamp;

use super::{AnalysisSnapshot, EmailMessage};

/// Builds the two email bodies the platform sends.
#[derive(Debug, Clone)]
pub struct EmailComposer {
    registry: CriteriaRegistry,
}

impl EmailComposer {
    pub fn new(registry: CriteriaRegistry) -> Self {
        Self { registry }
    }

    /// The one-time teaser for a locked-out user.
    ///
    /// Deliberately names no dimensions; the counts are the whole pitch.
    pub fn teaser(&self, to: impl Into<String>, snapshot: &AnalysisSnapshot) -> EmailMessage {
        let spots = snapshot.blind_spot_count;
        let noun = if spots == 1 { "blind spot" } else { "blind spots" };

        let text_body = format!(
            "You've completed {} practice sessions, and your responses show {} {} \
             worth working on.\n\nUpgrade to see which skills need attention, how \
             they're trending, and what to practice next.\n",
            snapshot.sessions_completed, spots, noun
        );
        let html_body = format!(
            "<p>You've completed <strong>{}</strong> practice sessions, and your \
             responses show <strong>{} {}</strong> worth working on.</p>\
             <p>Upgrade to see which skills need attention, how they're trending, \
             and what to practice next.</p>",
            snapshot.sessions_completed, spots, noun
        );

        EmailMessage {
            to: to.into(),
            subject: "Your first insights are ready".to_string(),
            html_body,
            text_body,
        }
    }

    /// The weekly digest for an unlocked user.
    pub fn weekly_report(
        &self,
        to: impl Into<String>,
        report: &InsightsReport,
        week_of: Timestamp,
    ) -> EmailMessage {
        let (iso_year, iso_week) = week_of.iso_week();
        let subject = format!("Your weekly practice report ({}-W{:02})", iso_year, iso_week);

        let mut text = format!(
            "Practice report for week {:02}, {}.\n\nSessions completed: {}\n",
            iso_week, iso_year, report.sessions_completed
        );
        let mut html = format!(
            "<h2>Practice report for week {:02}, {}</h2>\
             <p>Sessions completed: <strong>{}</strong></p>",
            iso_week, iso_year, report.sessions_completed
        );

        self.append_section(&mut text, &mut html, "Blind spots", report.blind_spots.as_deref());
        self.append_section(&mut text, &mut html, "Slipping", report.slipping.as_deref());
        self.append_section(&mut text, &mut html, "Improving", report.improving.as_deref());

        EmailMessage {
            to: to.into(),
            subject,
            html_body: html,
            text_body: text,
        }
    }

    fn append_section(
        &self,
        text: &mut String,
        html: &mut String,
        heading: &str,
        patterns: Option<&[DimensionPattern]>,
    ) {
        let patterns = match patterns {
            Some(p) if !p.is_empty() => p,
            _ => return,
        };

        text.push_str(&format!("\n{}:\n", heading));
        html.push_str(&format!("<h3>{}</h3><ul>", heading));
        for pattern in patterns {
            let label = self.label_for(&pattern.dimension);
            let line = format!(
                "{} ({:.0}% of recent attempts below the bar)",
                label,
                pattern.recent_failure_rate * 100.0
            );
            text.push_str(&format!("  - {}\n", line));
            html.push_str(&format!("<li>{}</li>", line));
        }
        html.push_str("</ul>");
    }

    fn label_for(&self, key: &DimensionKey) -> String {
        self.registry
            .dimension(key)
            .map(|spec| spec.label.clone())
            .unwrap_or_else(|| key.as_str().to_string())
    }
}
