use anyhow::Result;
use clap::Parser;
use ctxbundle::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the bundle. CTXB_LOG=debug for detail
    let default_level = if cli.quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CTXB_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Bundle(args) => ctxbundle::bundle_run(args, &ctx),
        Commands::Init(args) => ctxbundle::infra::config_init(args, &ctx),
    }
}
