use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and transform one journey page.
    Open(OpenArgs),
    /// Open the milestone after the given page.
    Next(StepArgs),
    /// Open the milestone before the given page.
    Previous(StepArgs),
    /// Print a journey's milestone list.
    Index(IndexArgs),
    /// Print the candidate content URLs for a page.
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Documentation host (overrides `JOURNEYS_DOCS_HOST`).
    #[arg(long, global = true)]
    pub docs_host: Option<String>,

    /// Path prefix under which journeys live (overrides `JOURNEYS_JOURNEY_PREFIX`).
    #[arg(long, global = true)]
    pub journey_prefix: Option<String>,

    /// Per-request timeout in seconds (overrides `JOURNEYS_TIMEOUT_SECS`).
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Journey page URL (cover page or milestone).
    #[arg(long)]
    pub url: String,

    /// Title to show instead of the milestone or heading title.
    #[arg(long)]
    pub title: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct StepArgs {
    /// Journey page URL to step from.
    #[arg(long)]
    pub url: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Journey base URL, e.g. `https://grafana.com/docs/learning-journeys/linux/`.
    #[arg(long)]
    pub base_url: String,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Journey page URL.
    #[arg(long)]
    pub url: String,
}
