use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::{AppContext, InitArgs};
use crate::parsers::GrammarProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// External resolution tool settings
    pub oracle: OracleConfig,

    /// Call-site resolution behavior
    pub resolve: ResolveConfig,

    /// Structural predicates of the source grammar
    pub grammar: GrammarProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig
{
    /// Executable; `~` and `$VAR` are expanded
    pub program: String,
    pub definition_subcommand: String,
    pub folding_subcommand: String,
    /// Per-query deadline
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig
{
    /// Upper bound on concurrently running oracle queries
    pub max_parallel: usize,
    /// Fetch each defining file's folding ranges once per bundle
    pub cache_folding_ranges: bool,
    /// Re-parse the defining file when no folding range fits the anchor
    pub structural_fallback: bool,
}

impl Default for OracleConfig
{
    fn default() -> Self
    {
        Self {
            program: "gopls".to_string(),
            definition_subcommand: "definition".to_string(),
            folding_subcommand: "folding_ranges".to_string(),
            timeout_ms: 5_000,
        }
    }
}

impl OracleConfig
{
    /// Program path with shell-style expansion; raw value if expansion fails
    pub fn program_path(&self) -> String
    {
        shellexpand::full(&self.program)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| {
                self.program
                    .clone()
            })
    }
}

impl Default for ResolveConfig
{
    fn default() -> Self
    {
        Self { max_parallel: 4, cache_folding_ranges: true, structural_fallback: true }
    }
}

impl ResolveConfig
{
    pub fn parallelism(&self) -> usize
    {
        self.max_parallel
            .max(1)
    }
}

/// Layered load: first config file found, then `CTXBUNDLE__*` overrides
pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

/// Like `load_config_from`, but a broken config file is reported and the
/// defaults are used instead
pub fn load_config_or_default(dir: &Path) -> Config
{
    match load_config_from(dir)
    {
        Ok(config) => config,
        Err(e) =>
        {
            warn!("{e:#}; using default configuration");
            Config::default()
        }
    }
}

pub fn load_config_from(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_names = ["ctxbundle.toml", "ctxbundle.yaml", "ctxbundle.json", ".ctxbundle.toml"];

    for name in &config_names
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    // e.g. CTXBUNDLE__ORACLE__TIMEOUT_MS=2000
    builder = builder.add_source(
        config::Environment::with_prefix("CTXBUNDLE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("ctxbundle.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
