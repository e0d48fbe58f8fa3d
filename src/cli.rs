// thumbpick/src/cli.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "thumbpick",
    about = "Adaptive thumbnail source selection and generation",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every configured source for an original/target size pair
    Rank {
        /// Source configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Original image size, e.g. 4000x3000
        #[arg(long)]
        original: String,

        /// Target thumbnail size, e.g. 256x256
        #[arg(long)]
        target: String,
    },

    /// Generate a thumbnail through the cheapest configured source
    Get {
        /// Source configuration file (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Input image or video
        #[arg(short, long)]
        input: PathBuf,

        /// Output thumbnail path
        #[arg(short, long)]
        output: PathBuf,

        /// Original image size, e.g. 4000x3000 (probed from the file if
        /// omitted)
        #[arg(long)]
        original: Option<String>,

        /// Target thumbnail size, e.g. 256x256
        #[arg(long, default_value = "256x256")]
        target: String,

        /// Overall request timeout
        #[arg(long, default_value = "30s")]
        timeout: String,
    },
}
