pub mod parser;
pub mod reader;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parser::parse_config;
use reader::read_config_file;

use crate::config::{ConfigurationError, ExistingPolicy, MirrorConfig};

#[derive(Parser, Debug)]
#[clap(
    name = "gitea-mirror",
    version,
    about = "Clone every repository a Gitea user owns into a local directory"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the account's repositories and clone them
    Fetch(FetchArgs),
    /// Print the connection type and required fields as JSON
    ConnectionInfo,
    /// Print the SVG icon
    Icon,
}

#[derive(clap::Args, Debug, Default)]
pub struct FetchArgs {
    /// YAML config file; flags override its values
    #[clap(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    #[clap(long, env = "GITEA_BASE_URL")]
    pub base_url: Option<String>,

    #[clap(long, env = "GITEA_USERNAME")]
    pub username: Option<String>,

    #[clap(long, env = "GITEA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[clap(short, long, parse(from_os_str))]
    pub target_directory: Option<PathBuf>,

    /// Only read the first page of the repository list
    #[clap(long)]
    pub no_pagination: bool,

    #[clap(long)]
    pub page_size: Option<u32>,

    /// What to do with a repository that is already cloned: skip, fail or update
    #[clap(long)]
    pub on_existing: Option<ExistingPolicy>,

    /// Number of clones to run at once
    #[clap(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Per-clone timeout in seconds
    #[clap(long)]
    pub clone_timeout: Option<u64>,

    /// Deadline for the whole clone phase in seconds
    #[clap(long)]
    pub batch_deadline: Option<u64>,

    /// HTTP timeout for API requests in seconds
    #[clap(long)]
    pub request_timeout: Option<u64>,
}

/// Resolve the mirror configuration from the optional file and the flags.
pub fn load_config(args: &FetchArgs) -> Result<MirrorConfig, ConfigurationError> {
    let file = match &args.config {
        Some(path) => read_config_file(path)?,
        None => reader::Config::default(),
    };

    parse_config(file, args)
}
