use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "dbs-server")]
#[command(about = "Supervise a single database server process")]
#[command(version)]
pub struct Cli {
    /// Directory holding config.toml (defaults to $DBS_CONFIG_DIR or ./.dbs)
    #[arg(long)]
    pub(crate) config_dir: Option<PathBuf>,

    /// Initialize the data directory before starting, unless already attempted
    #[arg(long, conflicts_with = "bootstrap_only")]
    pub(crate) bootstrap: bool,

    /// Initialize the data directory and exit without starting the server
    #[arg(long)]
    pub(crate) bootstrap_only: bool,
}
