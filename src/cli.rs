//! Command-line arguments for the server binary.

use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(
    name = "llm-relay",
    version,
    about = "HTTP relay for multi-provider LLM chat, vector search, and graph queries"
)]
pub struct Cli {
    /// Bind address (overrides PORT from the environment)
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// Env file loaded before configuration is read (default: ./.env)
    #[arg(long)]
    pub env_file: Option<String>,
}
