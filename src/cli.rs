use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory where discussion records are stored
    #[arg(short, long)]
    pub storage_dir: Option<PathBuf>,

    /// Default model for new discussions
    #[arg(short, long)]
    pub model: Option<String>,

    /// Override the chat-completion endpoint base URL
    #[arg(long)]
    pub base_url: Option<String>,
}
