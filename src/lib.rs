//! **ctxbundle** - Function-level context bundles for LLM code generation
//!
//! Locates a Go function with tree-sitter, resolves every function it calls
//! through gopls, and returns the target plus the full source of each callee.

/// Command-line interface with clap integration
pub mod cli;

/// Command handlers behind the CLI
pub mod cli_ext {
    /// `ctxb bundle`: build, render and report
    pub mod bundle_cmd;
    pub use bundle_cmd::run as bundle_run;
}

/// Bundle pipeline: locate → extract calls → resolve → reconstruct → assemble
pub mod core {
    /// Value types shared across the pipeline
    pub mod model;
    pub use model::{CallSite, ContextBundle, DeclarationMatch, Position, Range};

    /// Error taxonomy with miette diagnostics
    pub mod error;
    pub use error::BundleError;

    /// Function and method lookup by declared name
    pub mod locate;
    pub use locate::{DeclarationLocator, namespace_of};

    /// Ordered, deduplicated call sites of a declaration body
    pub mod calls;
    pub use calls::CallSiteExtractor;

    /// Point oracle requests and answers
    pub mod resolve;
    pub use resolve::DefinitionResolver;

    /// Full-span recovery from folding ranges
    pub mod ranges;
    pub use ranges::RangeReconstructor;

    /// Definition text with its leading comment lines
    pub mod assemble;
    pub use assemble::DefinitionAssembler;

    /// Orchestration with a bounded rayon pool
    pub mod bundle;
    pub use bundle::{BuildReport, BundleBuilder, SiteDiagnostic};
}

/// Language processing - tree-sitter parsing and grammar predicates
pub mod parsers {
    /// Tree-sitter Go syntax provider
    pub mod go_parser;
    pub use go_parser::{SourceTree, SyntaxProvider};

    /// Node kinds and fields the pipeline matches on
    pub mod grammar;
    pub use grammar::GrammarProfile;
}

/// Infrastructure - Configuration, I/O, and external processes
pub mod infra {
    /// Layered configuration (file + environment)
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped file I/O for large files (>1MB threshold)
    pub mod io;
    pub use io::{FileContent, read_source};

    /// CRLF/LF-robust 1-based line lookup
    pub mod line_index;
    pub use line_index::LineIndex;

    /// Subprocesses with deadlines and cancellation
    pub mod process;
    pub use process::{CancelToken, OracleError};

    /// gopls behind the oracle trait
    pub mod oracle;
    pub use oracle::{GoplsOracle, SourceOracle};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use cli_ext::bundle_run;
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::{BuildReport, BundleBuilder, BundleError, ContextBundle};
