//! Fraud scoring for raw engagement counters.
//!
//! [`EngagementValidator::assess_fraud`] asks the remote model first when a
//! chat client is configured and falls back to [`fallback_assessment`] on any
//! failure. Both paths go through [`FraudAssessment::bounded`] before being
//! returned.

use clout_common::Result;
use clout_config::LlmSettings;
use clout_llm::json::number_field;
use clout_llm::traits::{ChatClient, ChatRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::sync::Arc;

use crate::model::{AssessmentSource, EngagementSample, FraudAssessment};

pub const LOW_ENGAGEMENT: &str = "Unnaturally high views with low engagement";
pub const HIGH_CLICK_OFF: &str = "Very high click-off rate for short watch time";
pub const MINOR_SUSPICION: &str = "Minor suspicious activity detected";
pub const NO_FRAUD: &str = "No fraud detected";
const REMOTE_DEFAULT_REASON: &str = "Assessed by remote model";

const LOW_ENGAGEMENT_MIN_VIEWS: u64 = 10_000;
const LOW_ENGAGEMENT_RATIO: f64 = 0.005;
const SHORT_WATCH_SECS: f64 = 5.0;
const HIGH_CLICK_OFF_PERCENT: f64 = 70.0;
const MINOR_SUSPICION_PROBABILITY: f64 = 0.1;

const SYSTEM_PROMPT: &str = "You are a fraud detection analyst for a creator marketplace. \
You judge whether reported social media engagement is authentic or bot-driven. \
Respond with STRICT JSON ONLY.";

/// Score and capped view count accumulated by the fallback rules.
///
/// `validated` stays an exact `u64` copy of the raw count until a rule caps
/// it; only the caps go through floating point.
struct RuleOutcome {
    raw_views: u64,
    score: f64,
    validated: u64,
    reasons: Vec<&'static str>,
}

impl RuleOutcome {
    fn new(raw_views: u64) -> Self {
        Self {
            raw_views,
            score: 0.0,
            validated: raw_views,
            reasons: Vec::new(),
        }
    }

    /// Add `delta` to the score and cap validated views at
    /// `floor(raw_views * keep)`.
    fn flag(&mut self, delta: f64, reason: &'static str, keep: f64) {
        self.score += delta;
        self.reasons.push(reason);
        let cap = (self.raw_views as f64 * keep).floor() as u64;
        self.validated = self.validated.min(cap);
    }

    fn finish(self) -> FraudAssessment {
        let reason = if self.reasons.is_empty() {
            NO_FRAUD.to_string()
        } else {
            self.reasons.join("; ")
        };
        FraudAssessment {
            fraud_score: self.score.min(100.0),
            validated_views: self.validated,
            reason,
            source: AssessmentSource::Fallback,
        }
    }
}

/// Local heuristic used when the remote model is unavailable.
///
/// Deterministic apart from one uniform draw from `rng`: with probability 0.1
/// a minor-suspicion bump is applied.
pub fn fallback_assessment<R: Rng + ?Sized>(
    sample: &EngagementSample,
    rng: &mut R,
) -> FraudAssessment {
    let mut outcome = RuleOutcome::new(sample.raw_views);

    if sample.raw_views > LOW_ENGAGEMENT_MIN_VIEWS
        && (sample.interactions() as f64) / (sample.raw_views as f64) < LOW_ENGAGEMENT_RATIO
    {
        outcome.flag(50.0, LOW_ENGAGEMENT, 0.5);
    }

    if let (Some(watch), Some(click_off)) = (sample.watch_time, sample.click_off_rate) {
        if watch < SHORT_WATCH_SECS && click_off > HIGH_CLICK_OFF_PERCENT {
            outcome.flag(30.0, HIGH_CLICK_OFF, 0.7);
        }
    }

    if rng.gen::<f64>() < MINOR_SUSPICION_PROBABILITY {
        outcome.flag(10.0, MINOR_SUSPICION, 0.9);
    }

    outcome.finish()
}

pub fn build_prompt(sample: &EngagementSample) -> Result<ChatRequest> {
    let metrics = serde_json::to_string(sample)?;
    let user = format!(
        r#"Analyze these engagement metrics for signs of fake or bot-driven activity.

Metrics JSON:
{metrics}

Return STRICT JSON ONLY with this schema:
{{
  "fraudScore": number,      // 0 (authentic) to 100 (certainly fraudulent)
  "validatedViews": integer, // views you consider genuine, never more than rawViews
  "reason": string           // one short sentence
}}"#
    );
    Ok(ChatRequest::new(SYSTEM_PROMPT, user)
        .with_temperature(0.1)
        .with_max_tokens(200))
}

/// Ask the remote model. Any failure is returned to the caller, which
/// decides whether to fall back.
pub async fn remote_assessment(
    chat: &dyn ChatClient,
    sample: &EngagementSample,
) -> Result<FraudAssessment> {
    let reply = chat.chat_json(build_prompt(sample)?).await?;

    let fraud_score = number_field(&reply, "fraudScore")?;
    let validated = number_field(&reply, "validatedViews")?;
    let reason = match reply.get("reason") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => REMOTE_DEFAULT_REASON.to_string(),
    };

    Ok(FraudAssessment {
        fraud_score,
        validated_views: validated.max(0.0).floor() as u64,
        reason,
        source: AssessmentSource::Remote,
    })
}

/// Produces a [`FraudAssessment`] for every sample; never fails.
#[derive(Clone, Default)]
pub struct EngagementValidator {
    chat: Option<Arc<dyn ChatClient + Send + Sync>>,
}

impl EngagementValidator {
    pub fn new(chat: Option<Arc<dyn ChatClient + Send + Sync>>) -> Self {
        Self { chat }
    }

    /// A validator that only ever uses the local heuristic.
    pub fn offline() -> Self {
        Self { chat: None }
    }

    /// Use the remote model when `settings` carries a credential.
    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::new(crate::chat_or_offline(settings))
    }

    pub fn is_remote_enabled(&self) -> bool {
        self.chat.is_some()
    }

    pub async fn assess_fraud(&self, sample: &EngagementSample) -> FraudAssessment {
        let mut rng = StdRng::from_entropy();
        self.assess_fraud_with_rng(sample, &mut rng).await
    }

    /// Same as [`assess_fraud`](Self::assess_fraud) with an explicit random
    /// source for the fallback heuristic.
    pub async fn assess_fraud_with_rng<R: Rng + Send + ?Sized>(
        &self,
        sample: &EngagementSample,
        rng: &mut R,
    ) -> FraudAssessment {
        if let Some(chat) = &self.chat {
            match remote_assessment(chat.as_ref(), sample).await {
                Ok(assessment) => {
                    tracing::debug!(
                        fraud_score = assessment.fraud_score,
                        validated_views = assessment.validated_views,
                        "fraud.remote"
                    );
                    return assessment.bounded(sample.raw_views);
                }
                Err(e) => {
                    tracing::warn!(error = %e, raw_views = sample.raw_views, "fraud.remote_failed; using fallback heuristic");
                }
            }
        }

        let assessment = fallback_assessment(sample, rng).bounded(sample.raw_views);
        tracing::debug!(
            fraud_score = assessment.fraud_score,
            validated_views = assessment.validated_views,
            reason = %assessment.reason,
            "fraud.fallback"
        );
        assessment
    }
}
