use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::ValueHint;
use url::Url;

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Path to the config file.
    ///
    /// By default, newsgrid looks for a file named `newsgrid.toml` in the following directories
    /// (in order):
    ///
    /// - `./` (the current directory)
    /// - `/etc`
    #[arg(
        short,
        long = "config",
        env = "NEWSGRID_CONFIG",
        value_hint(ValueHint::FilePath)
    )]
    pub config_path: Option<PathBuf>,

    /// Base URL of the news service.
    #[arg(long, env = "NEWSGRID_API_URL", value_hint(ValueHint::Url))]
    pub api_url: Option<Url>,

    /// Showcase server address to bind to.
    #[arg(long, env = "NEWSGRID_BIND_ADDR")]
    pub bind_addr: Option<String>,

    /// Number of news items to request.
    #[arg(long)]
    pub limit: Option<NonZeroUsize>,

    /// Path to the HTTP cache directory.
    #[arg(long, env = "NEWSGRID_CACHE_DIR", value_hint(ValueHint::DirPath))]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the news showcase over HTTP.
    Serve,

    /// Browse the news grid interactively in the terminal.
    Browse,

    /// Print the news grid once.
    List,

    /// Print a single news item.
    Show { id: i64 },

    /// Print the status of the news service.
    Status,
}

impl Args {
    pub fn parse() -> Self {
        clap::Parser::parse()
    }
}
