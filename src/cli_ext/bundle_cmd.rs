//! `ctxb bundle` command handler.
//!
//! Wires config, the gopls oracle and Ctrl+C into a bundle build, then
//! prints the result as Go-flavoured text or JSON. Skipped call sites go to
//! stderr unless `--quiet`.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use miette::Diagnostic;
use owo_colors::OwoColorize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::cli::{AppContext, BundleArgs};
use crate::core::bundle::{BuildReport, BundleBuilder, SiteDiagnostic};
use crate::infra::config::load_config_or_default;
use crate::infra::io::read_source;
use crate::infra::oracle::GoplsOracle;
use crate::infra::process::CancelToken;
use crate::parsers::SyntaxProvider;

/// Exit code after a second Ctrl+C
const INTERRUPTED: i32 = 130;

#[instrument(skip(ctx), fields(function = %args.function))]
pub fn run(
    args: BundleArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config = load_config_or_default(Path::new("."));

    let file = utf8_canonical(&args.file)?;
    let workdir = match &args.dir
    {
        Some(dir) => utf8_canonical(dir)?,
        None => file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| Utf8PathBuf::from(".")),
    };
    info!("bundling {} from {file} (workdir {workdir})", args.function);

    let source = read_source(&file)?;
    let oracle = GoplsOracle::from_config(&config.oracle).with_workdir(workdir);

    let report = BundleBuilder::new(
        &oracle,
        SyntaxProvider::go(),
        config
            .grammar
            .clone(),
        config
            .resolve
            .clone(),
    )
    .with_cancel(interrupt_token())
    .build(&file, source.as_ref(), &args.function)
    .with_context(|| format!("Failed to bundle {} from {file}", args.function))?;

    if !ctx.quiet
    {
        for d in &report.diagnostics
        {
            eprintln!("{}", render_diagnostic(d, !ctx.no_color));
        }
    }

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&render_json(&report))?);
    }
    else
    {
        print!("{}", render_text(&report, !ctx.no_color));
    }

    Ok(())
}

fn utf8_canonical(path: &Path) -> Result<Utf8PathBuf>
{
    let abs = dunce::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    Utf8PathBuf::from_path_buf(abs).map_err(|p| anyhow!("Path is not UTF-8: {}", p.display()))
}

/// First Ctrl+C cancels the build and kills running queries; the second exits
fn interrupt_token() -> CancelToken
{
    let token = CancelToken::new();
    let handler_token = token.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if handler_token.is_cancelled()
        {
            std::process::exit(INTERRUPTED);
        }
        handler_token.cancel();
        eprintln!("\nInterrupted. Stopping resolution...");
    })
    {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    token
}

/// Package clause, target, then each dependency, blank-line separated
pub fn render_text(
    report: &BuildReport,
    color: bool,
) -> String
{
    let bundle = &report.bundle;
    let mut blocks = Vec::with_capacity(
        bundle
            .dependencies
            .len()
            + 3,
    );

    if !bundle
        .namespace
        .is_empty()
    {
        blocks.push(format!("package {}", bundle.namespace));
    }
    blocks.push(
        bundle
            .target
            .reconstruct(),
    );

    if !bundle
        .dependencies
        .is_empty()
    {
        let header = format!("// --- dependencies ({}) ---", bundle.dependencies.len());
        blocks.push(if color
        {
            header
                .bright_black()
                .to_string()
        }
        else
        {
            header
        });
        blocks.extend(
            bundle
                .dependencies
                .iter()
                .cloned(),
        );
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

pub fn render_json(report: &BuildReport) -> Value
{
    let diagnostics: Vec<Value> = report
        .diagnostics
        .iter()
        .map(|d| {
            json!({
                "site": d.site,
                "code": d.error.code().map(|c| c.to_string()),
                "message": d.error.to_string(),
            })
        })
        .collect();

    json!({
        "namespace": report.bundle.namespace,
        "target": report.bundle.target,
        "dependencies": report.bundle.dependencies,
        "diagnostics": diagnostics,
    })
}

fn render_diagnostic(
    d: &SiteDiagnostic,
    color: bool,
) -> String
{
    let label = if color
    {
        "skipped"
            .yellow()
            .bold()
            .to_string()
    }
    else
    {
        "skipped".to_string()
    };

    let mut line = format!("{label} {}: {}", d.site, d.error);
    if let Some(help) = d
        .error
        .help()
    {
        line.push_str(&format!(" (help: {help})"));
    }
    line
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::core::error::BundleError;
    use crate::core::model::{ContextBundle, DeclarationMatch};

    fn report() -> BuildReport
    {
        BuildReport {
            bundle: ContextBundle {
                namespace: "main".into(),
                target: DeclarationMatch {
                    name: "main".into(),
                    comment: String::new(),
                    body_text: "func main() { sum := add(3, 4); fmt.Println(sum) }".into(),
                },
                dependencies: vec![
                    "// Adds two numbers\nfunc add(a, b int) int { return a + b }".into(),
                ],
            },
            diagnostics: vec![SiteDiagnostic {
                site: "fmt.Println".into(),
                error: BundleError::Resolution {
                    site: "fmt.Println".into(),
                    detail: "gopls definition exited with exit status: 1: no identifier found".into(),
                },
            }],
        }
    }

    #[test]
    fn text_output_reads_like_go()
    {
        insta::assert_snapshot!(render_text(&report(), false).trim_end(), @r"
        package main

        func main() { sum := add(3, 4); fmt.Println(sum) }

        // --- dependencies (1) ---

        // Adds two numbers
        func add(a, b int) int { return a + b }
        ");
    }

    #[test]
    fn json_output_carries_diagnostic_codes()
    {
        let v = render_json(&report());
        assert_eq!(v["namespace"], "main");
        assert_eq!(v["target"]["name"], "main");
        assert_eq!(v["target"]["comment"], "");
        assert_eq!(
            v["dependencies"]
                .as_array()
                .unwrap()
                .len(),
            1
        );
        assert_eq!(v["diagnostics"][0]["site"], "fmt.Println");
        assert_eq!(v["diagnostics"][0]["code"], "ctxbundle::resolution");
    }

    #[test]
    fn diagnostic_line_includes_help()
    {
        let r = report();
        let line = render_diagnostic(&r.diagnostics[0], false);
        assert!(line.starts_with("skipped fmt.Println: could not resolve fmt.Println"));
        assert!(line.contains("help: built-ins"));
    }

    #[test]
    fn bundle_without_namespace_or_dependencies()
    {
        let mut r = report();
        r.bundle
            .namespace
            .clear();
        r.bundle
            .dependencies
            .clear();
        assert_eq!(
            render_text(&r, false),
            "func main() { sum := add(3, 4); fmt.Println(sum) }\n"
        );
    }
}
