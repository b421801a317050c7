use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blobguard",
    about = "Permission-gated blob serving proxy",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Show how a request path resolves
    Resolve(ResolveArgs),
    /// Evaluate whether a user may read an object path
    Authorize(AuthorizeArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Root directory of the local blob store
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// JSON catalog of objects and documents
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Path relative to the serving route
    pub path: String,
}

#[derive(Args)]
pub struct AuthorizeArgs {
    /// Path relative to the serving route
    pub path: String,
    /// Evaluate as this user; anonymous when omitted
    #[arg(long = "as")]
    pub user: Option<String>,
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}
