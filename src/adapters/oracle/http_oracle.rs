//! HTTP scoring oracle client.
//!
//! One upstream service plays both oracle roles: `/v1/coach` writes the
//! conversational reply to an answer and `/v1/judge` maps a criteria
//! list to outcomes. The client makes a single attempt per call and
//! maps transport and status failures onto `ScoringError`; retry policy
//! belongs to the scoring worker, not here.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OracleConfig::new(api_key)
//!     .with_base_url("https://oracle.internal")
//!     .with_timeout(Duration::from_secs(20));
//!
//! let oracle = HttpScoringOracle::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::catalog::{CriterionKind, CriterionSpec, CriterionValue};
use crate::domain::scoring::{CriterionOutcomes, ScoringError};
use crate::ports::{CoachReply, CoachRequest, JudgeRequest, ScoringOracle};

/// Configuration for the oracle client.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL of the oracle service.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OracleConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "http://localhost:8090".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP client behind the scoring oracle port.
pub struct HttpScoringOracle {
    config: OracleConfig,
    client: Client,
}

impl HttpScoringOracle {
    pub fn new(config: OracleConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn coach_url(&self) -> String {
        format!("{}/v1/coach", self.config.base_url)
    }

    fn judge_url(&self) -> String {
        format!("{}/v1/judge", self.config.base_url)
    }

    async fn post<T: Serialize>(&self, url: String, body: &T) -> Result<Response, ScoringError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.api_key())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScoringError::oracle(format!(
                        "Request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    ScoringError::oracle(format!("Connection failed: {}", e))
                } else {
                    ScoringError::oracle(e.to_string())
                }
            })?;

        handle_status(response).await
    }
}

#[async_trait]
impl ScoringOracle for HttpScoringOracle {
    async fn coach(&self, request: CoachRequest) -> Result<CoachReply, ScoringError> {
        let wire = CoachWireRequest {
            user_id: request.user_id.to_string(),
            session_id: request.session_id.to_string(),
            mode: request.mode.as_str().to_string(),
            drill_key: request.drill_key.clone(),
            drill_phase: request.drill_phase.as_ref().map(|p| p.as_str().to_string()),
            scenario: request.scenario.clone(),
            response: request.response.clone(),
            level: request.level,
        };

        let reply: CoachWireReply = self
            .post(self.coach_url(), &wire)
            .await?
            .json()
            .await
            .map_err(|e| {
                ScoringError::invalid_reply(format!("Failed to parse coach reply: {}", e))
            })?;

        coach_reply_from_wire(reply)
    }

    async fn judge(&self, request: JudgeRequest) -> Result<CriterionOutcomes, ScoringError> {
        let wire = JudgeWireRequest {
            drill_type: request.drill_type.as_str().to_string(),
            drill_phase: request.drill_phase.as_str().to_string(),
            scenario: request.scenario.clone(),
            response: request.response.clone(),
            criteria: request
                .criteria
                .iter()
                .map(|spec| CriterionWire {
                    key: spec.key.as_str().to_string(),
                    label: spec.label.clone(),
                    kind: spec.kind,
                })
                .collect(),
        };

        let reply: JudgeWireReply = self
            .post(self.judge_url(), &wire)
            .await?
            .json()
            .await
            .map_err(|e| {
                ScoringError::invalid_reply(format!("Failed to parse judge reply: {}", e))
            })?;

        outcomes_from_wire(reply.outcomes, &request.criteria)
    }
}

/// Maps status classes onto the retryable/terminal split.
///
/// Rate limits and server errors are worth retrying; anything else the
/// oracle refused is a contract problem a retry will not fix.
async fn handle_status(response: Response) -> Result<Response, ScoringError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 429 || status.is_server_error() {
        Err(ScoringError::oracle(format!(
            "Oracle returned {}: {}",
            status, body
        )))
    } else {
        Err(ScoringError::invalid_reply(format!(
            "Oracle rejected the request ({}): {}",
            status, body
        )))
    }
}

fn coach_reply_from_wire(wire: CoachWireReply) -> Result<CoachReply, ScoringError> {
    if wire.feedback.trim().is_empty() {
        return Err(ScoringError::invalid_reply(
            "Coach reply had no feedback text",
        ));
    }

    Ok(CoachReply {
        feedback: wire.feedback,
        retry_prompt: wire.retry_prompt.filter(|p| !p.trim().is_empty()),
    })
}

/// Types each raw outcome against the declared kind of its criterion.
///
/// Criteria absent from the reply stay absent (not judged). Keys the
/// request never asked about are ignored so oracle-side additions do
/// not break older clients.
fn outcomes_from_wire(
    values: HashMap<String, serde_json::Value>,
    criteria: &[CriterionSpec],
) -> Result<CriterionOutcomes, ScoringError> {
    let mut outcomes = CriterionOutcomes::new();

    for spec in criteria {
        let raw = match values.get(spec.key.as_str()) {
            Some(raw) => raw,
            None => continue,
        };

        let value = match (spec.kind, raw) {
            (CriterionKind::Boolean, serde_json::Value::Bool(flagged)) => {
                CriterionValue::Flag(*flagged)
            }
            (CriterionKind::Count, serde_json::Value::Number(n)) => {
                let count = n.as_u64().and_then(|n| u32::try_from(n).ok()).ok_or_else(|| {
                    ScoringError::invalid_reply(format!(
                        "Criterion '{}' count is not a non-negative integer",
                        spec.key
                    ))
                })?;
                CriterionValue::Count(count)
            }
            _ => {
                return Err(ScoringError::invalid_reply(format!(
                    "Criterion '{}' value does not match its declared kind",
                    spec.key
                )))
            }
        };

        outcomes.insert(spec.key.clone(), value);
    }

    Ok(outcomes)
}

// ----- Oracle wire types -----

#[derive(Debug, Serialize)]
struct CoachWireRequest {
    user_id: String,
    session_id: String,
    mode: String,
    drill_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    drill_phase: Option<String>,
    scenario: String,
    response: String,
    level: u32,
}

#[derive(Debug, Deserialize)]
struct CoachWireReply {
    feedback: String,
    #[serde(default)]
    retry_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct JudgeWireRequest {
    drill_type: String,
    drill_phase: String,
    scenario: String,
    response: String,
    criteria: Vec<CriterionWire>,
}

#[derive(Debug, Serialize)]
struct CriterionWire {
    key: String,
    label: String,
    kind: CriterionKind,
}

#[derive(Debug, Deserialize)]
struct JudgeWireReply {
    outcomes: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CriterionKey;
    use serde_json::json;

    fn spec(key: &str, kind: CriterionKind) -> CriterionSpec {
        CriterionSpec {
            key: CriterionKey::from(key),
            label: key.to_string(),
            kind,
            universal: false,
        }
    }

    #[test]
    fn config_builder_sets_fields() {
        let config = OracleConfig::new("key-123")
            .with_base_url("https://oracle.internal")
            .with_timeout(Duration::from_secs(20));

        assert_eq!(config.base_url, "https://oracle.internal");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.api_key(), "key-123");
    }

    #[test]
    fn coach_reply_requires_feedback_text() {
        let err = coach_reply_from_wire(CoachWireReply {
            feedback: "   ".to_string(),
            retry_prompt: None,
        })
        .unwrap_err();

        assert!(!err.is_retryable());
    }

    #[test]
    fn blank_retry_prompt_is_dropped() {
        let reply = coach_reply_from_wire(CoachWireReply {
            feedback: "Direct. Good.".to_string(),
            retry_prompt: Some("".to_string()),
        })
        .unwrap();

        assert!(!reply.wants_retry());
    }

    #[test]
    fn outcomes_are_typed_by_declared_kind() {
        let criteria = vec![
            spec("hedging", CriterionKind::Boolean),
            spec("filler_phrases", CriterionKind::Count),
        ];
        let values: HashMap<String, serde_json::Value> = [
            ("hedging".to_string(), json!(true)),
            ("filler_phrases".to_string(), json!(2)),
        ]
        .into();

        let outcomes = outcomes_from_wire(values, &criteria).unwrap();

        assert_eq!(
            outcomes.get(&CriterionKey::from("hedging")),
            Some(&CriterionValue::Flag(true))
        );
        assert_eq!(
            outcomes.get(&CriterionKey::from("filler_phrases")),
            Some(&CriterionValue::Count(2))
        );
    }

    #[test]
    fn unjudged_criteria_stay_absent() {
        let criteria = vec![
            spec("hedging", CriterionKind::Boolean),
            spec("direct_request", CriterionKind::Boolean),
        ];
        let values: HashMap<String, serde_json::Value> =
            [("hedging".to_string(), json!(false))].into();

        let outcomes = outcomes_from_wire(values, &criteria).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes.contains_key(&CriterionKey::from("direct_request")));
    }

    #[test]
    fn unknown_reply_keys_are_ignored() {
        let criteria = vec![spec("hedging", CriterionKind::Boolean)];
        let values: HashMap<String, serde_json::Value> = [
            ("hedging".to_string(), json!(true)),
            ("brand_new_criterion".to_string(), json!(true)),
        ]
        .into();

        let outcomes = outcomes_from_wire(values, &criteria).unwrap();

        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn mismatched_value_shape_is_rejected() {
        let criteria = vec![spec("hedging", CriterionKind::Boolean)];
        let values: HashMap<String, serde_json::Value> =
            [("hedging".to_string(), json!(3))].into();

        let err = outcomes_from_wire(values, &criteria).unwrap_err();

        assert!(!err.is_retryable());
    }

    #[test]
    fn count_must_be_a_non_negative_integer() {
        let criteria = vec![spec("filler_phrases", CriterionKind::Count)];

        let negative: HashMap<String, serde_json::Value> =
            [("filler_phrases".to_string(), json!(-1))].into();
        assert!(outcomes_from_wire(negative, &criteria).is_err());

        let fractional: HashMap<String, serde_json::Value> =
            [("filler_phrases".to_string(), json!(1.5))].into();
        assert!(outcomes_from_wire(fractional, &criteria).is_err());
    }
}
