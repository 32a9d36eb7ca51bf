use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
}

#[derive(Parser)]
#[command(name = "ctxb")]
#[command(
    about = "Bundle a Go function with the full source of every function it calls, resolved through gopls"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress diagnostics and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the context bundle for one function
    Bundle(BundleArgs),

    /// Initialize a ctxbundle.toml config file
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Source file declaring the function
    #[arg(short, long)]
    pub file: PathBuf,

    /// Exact declared name of the function or method
    #[arg(short = 'n', long)]
    pub function: String,

    /// Working directory for the resolution tool (defaults to the file's directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Emit JSON result instead of human text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}
