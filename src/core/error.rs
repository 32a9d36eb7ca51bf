//! Error taxonomy for bundle building.
//!
//! Whether an error is fatal depends on where it is raised: anything about
//! the target declaration aborts the request, anything about one dependency
//! call site (including a `Parse` of oracle output) only drops that site.

use camino::Utf8PathBuf;
use miette::Diagnostic;

#[derive(Debug, Clone, Diagnostic, thiserror::Error)]
pub enum BundleError
{
    /// Source could not be turned into a tree, or oracle text had the wrong shape
    #[error("parse error: {0}")]
    #[diagnostic(code(ctxbundle::parse))]
    Parse(String),

    #[error("could not find function {name:?} as a function or method declaration")]
    #[diagnostic(
        code(ctxbundle::not_found),
        help("matching is exact on the declared identifier; qualified names are not accepted")
    )]
    NotFound
    {
        name: String
    },

    /// Point oracle failed (non-zero exit, timeout) for one call site
    #[error("could not resolve {site}: {detail}")]
    #[diagnostic(
        code(ctxbundle::resolution),
        help("built-ins and symbols outside the indexed module have no definition to resolve")
    )]
    Resolution
    {
        site: String, detail: String
    },

    #[error("no foldable range starts at line {row} of {path}")]
    #[diagnostic(code(ctxbundle::range))]
    RangeReconstruction
    {
        path: Utf8PathBuf, row: usize
    },

    #[error("{path}: {detail}")]
    #[diagnostic(code(ctxbundle::io))]
    Io
    {
        path: Utf8PathBuf, detail: String
    },

    #[error("bundle building was cancelled")]
    #[diagnostic(code(ctxbundle::cancelled))]
    Cancelled,
}

impl BundleError
{
    pub fn io(
        path: impl Into<Utf8PathBuf>,
        detail: impl std::fmt::Display,
    ) -> Self
    {
        Self::Io { path: path.into(), detail: detail.to_string() }
    }
}
