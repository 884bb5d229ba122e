use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytxd",
    about = "HTTP service serving YouTube caption transcripts",
    version,
)]
pub struct Cli {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Preferred caption languages, in order (repeat or comma-separate)
    #[arg(short, long = "lang", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Seconds allowed for each call to YouTube
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Config file (defaults to ~/.config/ytxd/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
