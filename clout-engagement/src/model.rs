use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw engagement counters for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementSample {
    pub raw_views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    /// Average watch time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_time: Option<f64>,
    /// Percentage of viewers who clicked away, 0–100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_off_rate: Option<f64>,
}

impl EngagementSample {
    pub fn new(raw_views: u64, likes: u64, comments: u64, shares: u64) -> Self {
        Self {
            raw_views,
            likes,
            comments,
            shares,
            watch_time: None,
            click_off_rate: None,
        }
    }

    pub fn with_watch_time(mut self, seconds: f64) -> Self {
        self.watch_time = Some(seconds);
        self
    }

    pub fn with_click_off_rate(mut self, percent: f64) -> Self {
        self.click_off_rate = Some(percent);
        self
    }

    pub fn interactions(&self) -> u64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }
}

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAssessment {
    pub fraud_score: f64,
    pub validated_views: u64,
    pub reason: String,
    pub source: AssessmentSource,
}

impl FraudAssessment {
    /// Enforce the output contract against the sample it was computed for:
    /// score in [0, 100] and validated views never above raw views.
    pub fn bounded(mut self, raw_views: u64) -> Self {
        self.fraud_score = if self.fraud_score.is_nan() {
            0.0
        } else {
            self.fraud_score.clamp(0.0, 100.0)
        };
        self.validated_views = self.validated_views.min(raw_views);
        self
    }
}

/// Declares a closed set of lowercase tags plus an `Other` catch-all.
/// Parsing is case-insensitive and never fails.
macro_rules! open_tag {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $tag,)+
                    $name::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                let trimmed = raw.trim();
                $(if trimmed.eq_ignore_ascii_case($tag) {
                    return $name::$variant;
                })+
                $name::Other(trimmed.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                $name::from(raw.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name::from(s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_tag!(
    /// What the brand wants the campaign to achieve.
    CampaignGoal {
        Reach => "reach",
        Engagement => "engagement",
        Conversions => "conversions",
    }
);

open_tag!(
    /// Where the campaign runs.
    PlatformType {
        Instagram => "instagram",
        TikTok => "tiktok",
        X => "x",
        Threads => "threads",
    }
);

open_tag!(
    EngagementDifficulty {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPricingInput {
    pub campaign_goals: CampaignGoal,
    pub platform_type: PlatformType,
    pub engagement_difficulty: EngagementDifficulty,
}

impl CampaignPricingInput {
    pub fn new(
        campaign_goals: impl Into<CampaignGoal>,
        platform_type: impl Into<PlatformType>,
        engagement_difficulty: impl Into<EngagementDifficulty>,
    ) -> Self {
        Self {
            campaign_goals: campaign_goals.into(),
            platform_type: platform_type.into(),
            engagement_difficulty: engagement_difficulty.into(),
        }
    }
}

/// Recommended cost per thousand views, in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpmRecommendation {
    pub cpm: f64,
    pub source: AssessmentSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sample_serializes_camel_case_without_absent_options() {
        let sample = EngagementSample::new(1000, 50, 10, 5).with_watch_time(12.5);
        let v = serde_json::to_value(&sample).unwrap();
        assert_eq!(
            v,
            json!({
                "rawViews": 1000,
                "likes": 50,
                "comments": 10,
                "shares": 5,
                "watchTime": 12.5
            })
        );
    }

    #[test]
    fn interactions_saturate() {
        let sample = EngagementSample::new(1, u64::MAX, 1, 1);
        assert_eq!(sample.interactions(), u64::MAX);
    }

    #[test]
    fn bounded_clamps_score_and_views() {
        let raw = FraudAssessment {
            fraud_score: 140.0,
            validated_views: 5000,
            reason: "x".into(),
            source: AssessmentSource::Remote,
        };
        let b = raw.bounded(1200);
        assert_eq!(b.fraud_score, 100.0);
        assert_eq!(b.validated_views, 1200);

        let nan = FraudAssessment {
            fraud_score: f64::NAN,
            validated_views: 0,
            reason: "x".into(),
            source: AssessmentSource::Remote,
        };
        assert_eq!(nan.bounded(10).fraud_score, 0.0);
    }

    #[test]
    fn tags_parse_case_insensitively_with_fallthrough() {
        assert_eq!(PlatformType::from("TikTok"), PlatformType::TikTok);
        assert_eq!(PlatformType::from(" x "), PlatformType::X);
        assert_eq!(
            PlatformType::from("youtube"),
            PlatformType::Other("youtube".into())
        );
        assert_eq!(CampaignGoal::from("Conversions"), CampaignGoal::Conversions);
        assert_eq!(
            "HIGH".parse::<EngagementDifficulty>().unwrap(),
            EngagementDifficulty::High
        );
    }

    #[test]
    fn pricing_input_round_trips_through_plain_strings() {
        let input = CampaignPricingInput::new("engagement", "threads", "extreme");
        let v = serde_json::to_value(&input).unwrap();
        assert_eq!(
            v,
            json!({
                "campaignGoals": "engagement",
                "platformType": "threads",
                "engagementDifficulty": "extreme"
            })
        );
        let back: CampaignPricingInput = serde_json::from_value(v).unwrap();
        assert_eq!(
            back.engagement_difficulty,
            EngagementDifficulty::Other("extreme".into())
        );
    }
}
