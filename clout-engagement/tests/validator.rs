mod common;

use async_trait::async_trait;
use clout_common::{CloutError, Result};
use clout_config::LlmSettings;
use clout_engagement::{
    AssessmentSource, CampaignPricingInput, EngagementSample, EngagementValidator,
    PricingRecommender,
};
use clout_llm::traits::{ChatClient, ChatRequest};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replies with a fixed outcome and counts calls.
struct ScriptedChat {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedChat {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    async fn chat(&self, _request: ChatRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(CloutError::Remote)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn quiet_rng() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

fn validator_with(chat: &Arc<ScriptedChat>) -> EngagementValidator {
    EngagementValidator::new(Some(chat.clone() as Arc<dyn ChatClient + Send + Sync>))
}

fn recommender_with(chat: &Arc<ScriptedChat>) -> PricingRecommender {
    PricingRecommender::new(Some(chat.clone() as Arc<dyn ChatClient + Send + Sync>))
}

#[tokio::test]
async fn remote_answer_is_used_and_bounded() {
    common::init_test_tracing();
    let chat = ScriptedChat::replying(
        r#"Assessment: {"fraudScore": "130", "validatedViews": 99999, "reason": "bot farm pattern"}"#,
    );
    let validator = validator_with(&chat);
    let sample = EngagementSample::new(5000, 20, 2, 1);

    let a = validator.assess_fraud(&sample).await;
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.source, AssessmentSource::Remote);
    assert_eq!(a.fraud_score, 100.0);
    assert_eq!(a.validated_views, 5000);
    assert_eq!(a.reason, "bot farm pattern");
}

#[tokio::test]
async fn negative_remote_values_are_clamped_to_zero() {
    let sample = EngagementSample::new(5000, 20, 2, 1);
    for reply in [
        r#"{"fraudScore": -20, "validatedViews": -5, "reason": "looks organic"}"#,
        r#"{"fraudScore": "-20", "validatedViews": " -5 ", "reason": "looks organic"}"#,
    ] {
        let chat = ScriptedChat::replying(reply);
        let a = validator_with(&chat)
            .assess_fraud_with_rng(&sample, &mut quiet_rng())
            .await;
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.source, AssessmentSource::Remote, "reply: {reply}");
        assert_eq!(a.fraud_score, 0.0, "reply: {reply}");
        assert_eq!(a.validated_views, 0, "reply: {reply}");
        assert_eq!(a.reason, "looks organic");
    }
}

#[tokio::test]
async fn remote_blank_reason_is_replaced() {
    let chat = ScriptedChat::replying(r#"{"fraudScore": 12.5, "validatedViews": 800.9}"#);
    let a = validator_with(&chat)
        .assess_fraud(&EngagementSample::new(1000, 10, 1, 1))
        .await;
    assert_eq!(a.fraud_score, 12.5);
    assert_eq!(a.validated_views, 800);
    assert!(!a.reason.is_empty());
}

#[tokio::test]
async fn not_json_falls_back_without_error() {
    common::init_test_tracing();
    let chat = ScriptedChat::replying("not json");
    let sample = EngagementSample::new(20_000, 0, 0, 0);

    let a = validator_with(&chat)
        .assess_fraud_with_rng(&sample, &mut quiet_rng())
        .await;
    assert_eq!(a.source, AssessmentSource::Fallback);
    assert_eq!(a.fraud_score, 50.0);
    assert_eq!(a.validated_views, 10_000);
}

#[tokio::test]
async fn non_numeric_fields_fall_back() {
    let chat = ScriptedChat::replying(
        r#"{"fraudScore": "very high", "validatedViews": 10, "reason": "?"}"#,
    );
    let a = validator_with(&chat)
        .assess_fraud_with_rng(&EngagementSample::new(1000, 50, 10, 5), &mut quiet_rng())
        .await;
    assert_eq!(a.source, AssessmentSource::Fallback);
    assert_eq!(a.reason, "No fraud detected");
}

#[tokio::test]
async fn transport_failure_falls_back() {
    let chat = ScriptedChat::failing("connection reset");
    let sample = EngagementSample::new(1000, 0, 0, 0)
        .with_watch_time(2.0)
        .with_click_off_rate(90.0);

    let a = validator_with(&chat)
        .assess_fraud_with_rng(&sample, &mut quiet_rng())
        .await;
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.source, AssessmentSource::Fallback);
    assert!(a.fraud_score >= 30.0);
    assert!(a.validated_views <= 700);
}

#[tokio::test]
async fn offline_validator_never_calls_out() {
    let validator = EngagementValidator::from_settings(&LlmSettings::default());
    assert!(!validator.is_remote_enabled());

    let sample = EngagementSample::new(1000, 50, 10, 5);
    for _ in 0..50 {
        let a = validator.assess_fraud(&sample).await;
        assert_eq!(a.source, AssessmentSource::Fallback);
        assert!(a.fraud_score == 0.0 || a.fraud_score == 10.0);
        assert!(a.reason == "No fraud detected" || a.reason.contains("Minor suspicious activity"));
    }
}

#[tokio::test]
async fn outputs_respect_bounds_for_many_samples() {
    let validator = EngagementValidator::offline();
    let mut rng = StdRng::seed_from_u64(2024);
    let samples = [
        EngagementSample::new(0, 0, 0, 0),
        EngagementSample::new(1, 0, 0, 0).with_watch_time(0.0).with_click_off_rate(100.0),
        EngagementSample::new(10_001, 0, 0, 0),
        EngagementSample::new(u64::MAX, u64::MAX, 0, 0),
        EngagementSample::new(3_000_000, 1000, 10, 0)
            .with_watch_time(1.5)
            .with_click_off_rate(88.0),
    ];
    for sample in &samples {
        for _ in 0..20 {
            let a = validator.assess_fraud_with_rng(sample, &mut rng).await;
            assert!(a.validated_views <= sample.raw_views);
            assert!((0.0..=100.0).contains(&a.fraud_score));
            assert!(!a.reason.is_empty());
        }
    }
}

#[tokio::test]
async fn remote_cpm_is_clamped_and_rounded() {
    let chat = ScriptedChat::replying(r#"{"recommendedCpm": "72.3333"}"#);
    let rec = recommender_with(&chat)
        .recommend_cpm(&CampaignPricingInput::new("reach", "x", "low"))
        .await;
    assert_eq!(rec.source, AssessmentSource::Remote);
    assert_eq!(rec.cpm, 50.0);

    let chat = ScriptedChat::replying(r#"```json {"recommendedCpm": 8.129} ```"#);
    let rec = recommender_with(&chat)
        .recommend_cpm(&CampaignPricingInput::new("reach", "x", "low"))
        .await;
    assert_eq!(rec.cpm, 8.13);
}

#[tokio::test]
async fn cpm_parse_failure_falls_back() {
    let chat = ScriptedChat::replying("not json");
    let input = CampaignPricingInput::new("conversions", "instagram", "high");
    let rec = recommender_with(&chat)
        .recommend_cpm_with_rng(&input, &mut StepRng::new(0, 0))
        .await;
    assert_eq!(rec.source, AssessmentSource::Fallback);
    assert_eq!(rec.cpm, 11.0);
}

#[tokio::test]
async fn offline_cpm_stays_in_public_range() {
    let recommender = PricingRecommender::offline();
    for platform in ["instagram", "tiktok", "x", "threads", "bluesky"] {
        let input = CampaignPricingInput::new("conversions", platform, "high");
        for _ in 0..20 {
            let rec = recommender.recommend_cpm(&input).await;
            assert!((0.5..=50.0).contains(&rec.cpm));
            assert!(rec.cpm >= 1.0);
        }
    }
}

#[tokio::test]
async fn end_to_end_against_mock_chat_endpoint() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"fraudScore\": 42, \"validatedViews\": 640, \"reason\": \"Comment bursts\"}"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = LlmSettings {
        api_key: Some("sk-test".into()),
        endpoint: format!("{}/v1", server.uri()),
        ..LlmSettings::default()
    };
    let validator = EngagementValidator::from_settings(&settings);
    assert!(validator.is_remote_enabled());

    let a = validator
        .assess_fraud(&EngagementSample::new(1000, 30, 4, 2))
        .await;
    assert_eq!(a.source, AssessmentSource::Remote);
    assert_eq!(a.fraud_score, 42.0);
    assert_eq!(a.validated_views, 640);
    assert_eq!(a.reason, "Comment bursts");
}

#[tokio::test]
async fn end_to_end_server_error_degrades_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let settings = LlmSettings {
        api_key: Some("sk-test".into()),
        endpoint: format!("{}/v1", server.uri()),
        ..LlmSettings::default()
    };
    let rec = PricingRecommender::from_settings(&settings)
        .recommend_cpm(&CampaignPricingInput::new("engagement", "tiktok", "medium"))
        .await;
    assert_eq!(rec.source, AssessmentSource::Fallback);
    assert!((9.0..=11.0).contains(&rec.cpm));
}
