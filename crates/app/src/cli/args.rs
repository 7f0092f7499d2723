pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "dropkey")]
#[command(about = "End-to-end encrypted, signed pastes", version)]
pub struct Args {
    /// Paste service url (defaults to the configured remote)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the dropkey state directory (defaults to ~/.dropkey)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
