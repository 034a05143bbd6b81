//! CPM recommendation with the same remote-then-fallback shape as fraud scoring.

use clout_common::Result;
use clout_config::LlmSettings;
use clout_llm::json::number_field;
use clout_llm::traits::{ChatClient, ChatRequest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::model::{
    AssessmentSource, CampaignGoal, CampaignPricingInput, CpmRecommendation,
    EngagementDifficulty, PlatformType,
};

pub const MIN_CPM: f64 = 0.5;
pub const MAX_CPM: f64 = 50.0;
const BASE_CPM: f64 = 5.0;
const FALLBACK_FLOOR: f64 = 1.0;

const SYSTEM_PROMPT: &str = "You are a pricing analyst for influencer marketing campaigns. \
You recommend a CPM (USD per 1,000 views). Respond with STRICT JSON ONLY.";

fn platform_adjustment(platform: &PlatformType) -> f64 {
    match platform {
        PlatformType::Instagram => 2.0,
        PlatformType::TikTok => 3.0,
        PlatformType::X => 1.0,
        PlatformType::Threads => 2.0,
        PlatformType::Other(_) => 0.0,
    }
}

fn goal_adjustment(goal: &CampaignGoal) -> f64 {
    match goal {
        CampaignGoal::Conversions => 3.0,
        CampaignGoal::Engagement => 1.0,
        CampaignGoal::Reach | CampaignGoal::Other(_) => 0.0,
    }
}

fn difficulty_adjustment(difficulty: &EngagementDifficulty) -> f64 {
    match difficulty {
        EngagementDifficulty::High => 2.0,
        EngagementDifficulty::Medium => 1.0,
        EngagementDifficulty::Low | EngagementDifficulty::Other(_) => 0.0,
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp to the public [0.5, 50] range and round to cents. NaN maps to the floor.
pub fn bounded_cpm(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_CPM;
    }
    round_cents(value.clamp(MIN_CPM, MAX_CPM))
}

/// Local price heuristic: additive adjustments plus uniform jitter in [-1, 1],
/// floored at 1.0 and rounded to cents.
pub fn fallback_cpm<R: Rng + ?Sized>(input: &CampaignPricingInput, rng: &mut R) -> f64 {
    let jitter = rng.gen::<f64>() * 2.0 - 1.0;
    let cpm = BASE_CPM
        + platform_adjustment(&input.platform_type)
        + goal_adjustment(&input.campaign_goals)
        + difficulty_adjustment(&input.engagement_difficulty)
        + jitter;
    round_cents(cpm.max(FALLBACK_FLOOR))
}

pub fn build_prompt(input: &CampaignPricingInput) -> Result<ChatRequest> {
    let campaign = serde_json::to_string(input)?;
    let user = format!(
        r#"Recommend a CPM for this campaign.

Campaign JSON:
{campaign}

Return STRICT JSON ONLY with this schema:
{{ "recommendedCpm": number }}  // USD per 1,000 views, between {MIN_CPM} and {MAX_CPM}"#
    );
    Ok(ChatRequest::new(SYSTEM_PROMPT, user)
        .with_temperature(0.1)
        .with_max_tokens(200))
}

/// Ask the remote model for a price; the value is not yet clamped.
pub async fn remote_cpm(chat: &dyn ChatClient, input: &CampaignPricingInput) -> Result<f64> {
    let reply = chat.chat_json(build_prompt(input)?).await?;
    number_field(&reply, "recommendedCpm")
}

/// Produces a CPM in [0.5, 50] for every input; never fails.
#[derive(Clone, Default)]
pub struct PricingRecommender {
    chat: Option<Arc<dyn ChatClient + Send + Sync>>,
}

impl PricingRecommender {
    pub fn new(chat: Option<Arc<dyn ChatClient + Send + Sync>>) -> Self {
        Self { chat }
    }

    pub fn offline() -> Self {
        Self { chat: None }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::new(crate::chat_or_offline(settings))
    }

    pub async fn recommend_cpm(&self, input: &CampaignPricingInput) -> CpmRecommendation {
        let mut rng = StdRng::from_entropy();
        self.recommend_cpm_with_rng(input, &mut rng).await
    }

    pub async fn recommend_cpm_with_rng<R: Rng + Send + ?Sized>(
        &self,
        input: &CampaignPricingInput,
        rng: &mut R,
    ) -> CpmRecommendation {
        if let Some(chat) = &self.chat {
            match remote_cpm(chat.as_ref(), input).await {
                Ok(cpm) => {
                    tracing::debug!(cpm, "pricing.remote");
                    return CpmRecommendation {
                        cpm: bounded_cpm(cpm),
                        source: AssessmentSource::Remote,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, platform = %input.platform_type, "pricing.remote_failed; using fallback heuristic");
                }
            }
        }

        let cpm = bounded_cpm(fallback_cpm(input, rng));
        tracing::debug!(cpm, "pricing.fallback");
        CpmRecommendation {
            cpm,
            source: AssessmentSource::Fallback,
        }
    }
}
