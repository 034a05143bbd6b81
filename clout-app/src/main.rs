use anyhow::Result;
use clap::Parser;
use clout_common::observability::{init_logging, LogConfig, LogFormat};
use clout_config::{CloutConfigLoader, LlmSettings};
use clout_engagement::{
    CampaignPricingInput, EngagementSample, EngagementValidator, PricingRecommender,
};

mod cli;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        emit_stderr: cli.verbose,
        format: LogFormat::from_env(),
        ..LogConfig::default()
    })?;

    // File first, CLOUT__ environment wins.
    let cfg = CloutConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let settings = if cli.offline {
        LlmSettings {
            api_key: None,
            ..cfg.llm
        }
    } else {
        cfg.llm
    };
    tracing::info!(
        remote = settings.credential().is_some(),
        model = %settings.model,
        "clout.start"
    );

    let output = match cli.command {
        Command::Assess(args) => {
            let validator = EngagementValidator::from_settings(&settings);
            let sample = EngagementSample::from(args);
            let assessment = validator.assess_fraud(&sample).await;
            serde_json::to_string_pretty(&assessment)?
        }
        Command::RecommendCpm(args) => {
            let recommender = PricingRecommender::from_settings(&settings);
            let input = CampaignPricingInput::from(args);
            let recommendation = recommender.recommend_cpm(&input).await;
            serde_json::to_string_pretty(&recommendation)?
        }
    };

    println!("{output}");
    Ok(())
}
