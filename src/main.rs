use anyhow::Result;
use clap::Parser;
use ghrn::commands::{
    self, Output,
    config::{ClientSettings, DEFAULT_TIMEOUT_SECS},
};
use ghrn::http::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
use ghrn::input::{DEFAULT_PAGE_LIMIT, DEFAULT_PER_PAGE, FetchForm};
use ghrn::pagination::CountMode;
use ghrn::provider::DEFAULT_API_URL;
use ghrn::render::Format;
use std::path::PathBuf;
use std::time::Duration;

/// ghrn - GitHub Release Notes
///
/// Collect the release notes of a GitHub repository, newest first, and
/// render them with a table of contents of the releases that mention
/// breaking changes.
///
/// Examples:
///   ghrn notes owner/repo                      # Latest 10 pages of release notes
///   ghrn notes owner/repo --stop-version v1.0  # Stop once v1.0 shows up
///   ghrn breaking owner/repo --format html     # Only the breaking releases
#[derive(Parser, Debug)]
#[command(author, version = env!("GHRN_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub API URL
    #[arg(
        long = "api-url",
        env = "GHRN_API_URL",
        value_name = "URL",
        default_value = DEFAULT_API_URL,
        global = true
    )]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(
        long,
        env = "GHRN_TIMEOUT",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    pub timeout: u64,

    /// Attempts per request for transient failures
    #[arg(
        long,
        env = "GHRN_ATTEMPTS",
        value_name = "N",
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        global = true
    )]
    pub attempts: usize,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the release notes with a table of breaking releases
    Notes(FetchArgs),

    /// Print only the table of releases mentioning breaking changes
    Breaking(FetchArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// The GitHub repository in the format "owner/repo"
    #[arg(value_name = "OWNER/REPO")]
    pub repo: String,

    /// Releases requested per page (1-100)
    #[arg(long, short = 'n', value_name = "N", default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: usize,

    /// Maximum number of pages to request (1-100)
    #[arg(long, short = 'p', value_name = "N", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub page_limit: usize,

    /// Stop once at least this many releases have been loaded
    #[arg(long, short = 'm', value_name = "N")]
    pub max_items: Option<usize>,

    /// Stop after the page containing this tag or release name
    #[arg(long, short = 's', value_name = "VERSION")]
    pub stop_version: Option<String>,

    /// How loaded releases are counted against --max-items
    #[arg(long, value_enum, default_value_t = CountMode::Optimistic)]
    pub count: CountMode,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = Format::Markdown)]
    pub format: Format,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl FetchArgs {
    fn form(&self) -> FetchForm {
        FetchForm {
            repo: self.repo.clone(),
            per_page: self.per_page,
            page_limit: self.page_limit,
            max_items: self.max_items,
            stop_version: self.stop_version.clone(),
            count_mode: self.count,
        }
    }

    fn output(&self) -> Output {
        Output {
            format: self.format,
            path: self.output.clone(),
        }
    }
}

impl Cli {
    fn settings(&self) -> ClientSettings {
        ClientSettings {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout),
            retry: RetryPolicy {
                max_attempts: self.attempts.max(1),
                ..RetryPolicy::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = ghrn::runtime::RealRuntime;
    let settings = cli.settings();

    match &cli.command {
        Commands::Notes(args) => {
            commands::notes(runtime, &args.form(), &args.output(), &settings).await?
        }
        Commands::Breaking(args) => {
            commands::breaking(runtime, &args.form(), &args.output(), &settings).await?
        }
    }
    Ok(())
}
