//! Engagement validation and campaign pricing for the Clout marketplace.
//!
//! Two services share one shape: try the remote model when a credential is
//! configured, otherwise (or on any failure) use a local heuristic.
//!
//! - [`EngagementValidator`]: fraud score and validated view count
//! - [`PricingRecommender`]: CPM recommendation
//!
//! Neither ever returns an error to the caller.
//!
//! ```
//! use clout_engagement::{EngagementSample, EngagementValidator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let validator = EngagementValidator::offline();
//! let sample = EngagementSample::new(20_000, 0, 0, 0);
//! let assessment = validator.assess_fraud(&sample).await;
//! assert!(assessment.fraud_score >= 50.0);
//! assert!(assessment.validated_views <= 10_000);
//! # }
//! ```
pub mod fraud;
pub mod model;
pub mod pricing;

pub use fraud::{fallback_assessment, EngagementValidator};
pub use model::{
    AssessmentSource, CampaignGoal, CampaignPricingInput, CpmRecommendation,
    EngagementDifficulty, EngagementSample, FraudAssessment, PlatformType,
};
pub use pricing::{fallback_cpm, PricingRecommender};

use clout_config::LlmSettings;
use clout_llm::traits::ChatClient;
use std::sync::Arc;

/// Build the remote client for `settings`, degrading to `None` on a bad setup.
pub(crate) fn chat_or_offline(settings: &LlmSettings) -> Option<Arc<dyn ChatClient + Send + Sync>> {
    match clout_llm::chat_client_from_settings(settings) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "remote scoring unavailable; using local heuristics");
            None
        }
    }
}
