use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "podium",
    version,
    about = "Scoring and ranking for solver competitions"
)]
pub struct Cli {
    /// log output: text|json (level via PODIUM_LOG)
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score and rank results under every configured scoring kind
    Score(ScoreArgs),
    /// Cross-division rankings (biggest lead, largest contribution)
    Rankings(RankingsArgs),
    /// List unsound solvers and benchmarks excluded for contradictory answers
    Disagreements(DisagreementsArgs),
    Init(InitArgs),
    Version,
}

/// Inputs and config overrides shared by every scoring command.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// results CSV files, or directories holding them
    #[arg(required = true)]
    pub results: Vec<PathBuf>,

    /// config file; ./podium.yaml is used when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// reject unknown config keys
    #[arg(long)]
    pub strict: bool,

    #[arg(long)]
    pub year: Option<u32>,

    /// wall-clock limit in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// family rule: top|bot
    #[arg(long)]
    pub family: Option<String>,

    #[arg(long)]
    pub use_families: bool,

    #[arg(long)]
    pub skip_unknown: bool,

    #[arg(long)]
    pub track: Option<String>,

    #[arg(long)]
    pub registrations: Option<PathBuf>,

    #[arg(long)]
    pub division_map: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// only run these scoring kinds (repeatable)
    #[arg(long = "scoring")]
    pub scorings: Vec<String>,

    #[arg(long, default_value = "podium-out")]
    pub out_dir: PathBuf,

    /// report format: json | md
    #[arg(long, default_value = "json")]
    pub format: String,

    /// skip the console summary
    #[arg(long)]
    pub quiet: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RankingsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, default_value = "sequential")]
    pub scoring: String,

    /// output format: json | md
    #[arg(long, default_value = "json")]
    pub format: String,

    /// write to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// exit 1 when no division is competitive
    #[arg(long)]
    pub fail_on_empty: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DisagreementsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "podium.yaml")]
    pub config: PathBuf,

    /// also write a sample division map and solver registration table
    #[arg(long)]
    pub with_inputs: bool,
}
