use clap::{Args, Parser, Subcommand};
use clout_engagement::{CampaignPricingInput, EngagementSample};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "clout", about = "Engagement fraud scoring and CPM recommendations")]
pub struct Cli {
    /// YAML config file; skipped when missing.
    #[arg(long, global = true, default_value = "clout.yaml")]
    pub config: PathBuf,

    /// Never call the remote model.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Mirror logs to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score engagement counters for fraud and estimate validated views.
    Assess(AssessArgs),
    /// Recommend a CPM for a campaign.
    RecommendCpm(PricingArgs),
}

#[derive(Debug, Args)]
pub struct AssessArgs {
    #[arg(long)]
    pub raw_views: u64,
    #[arg(long, default_value_t = 0)]
    pub likes: u64,
    #[arg(long, default_value_t = 0)]
    pub comments: u64,
    #[arg(long, default_value_t = 0)]
    pub shares: u64,
    /// Average watch time in seconds.
    #[arg(long)]
    pub watch_time: Option<f64>,
    /// Click-off rate as a percentage (0-100).
    #[arg(long)]
    pub click_off_rate: Option<f64>,
}

impl From<AssessArgs> for EngagementSample {
    fn from(args: AssessArgs) -> Self {
        EngagementSample {
            raw_views: args.raw_views,
            likes: args.likes,
            comments: args.comments,
            shares: args.shares,
            watch_time: args.watch_time,
            click_off_rate: args.click_off_rate,
        }
    }
}

#[derive(Debug, Args)]
pub struct PricingArgs {
    /// reach, engagement or conversions
    #[arg(long)]
    pub goal: String,
    /// instagram, tiktok, x or threads
    #[arg(long)]
    pub platform: String,
    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub difficulty: String,
}

impl From<PricingArgs> for CampaignPricingInput {
    fn from(args: PricingArgs) -> Self {
        CampaignPricingInput::new(args.goal, args.platform, args.difficulty)
    }
}
