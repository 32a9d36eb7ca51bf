//! Context bundle orchestration.
//!
//! parse → locate target → extract call sites → resolve each site →
//! assemble. Failures on the target abort the request. Failures on a single
//! call site are recorded as diagnostics and the site is dropped.

use camino::Utf8Path;
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::core::assemble::DefinitionAssembler;
use crate::core::calls::CallSiteExtractor;
use crate::core::error::BundleError;
use crate::core::locate::{DeclarationLocator, namespace_of};
use crate::core::model::{CallSite, ContextBundle, ResolvedDefinition};
use crate::core::ranges::RangeReconstructor;
use crate::core::resolve::DefinitionResolver;
use crate::infra::config::ResolveConfig;
use crate::infra::io::read_source;
use crate::infra::oracle::SourceOracle;
use crate::infra::process::CancelToken;
use crate::parsers::{GrammarProfile, SyntaxProvider};

/// A call site that contributed nothing, and why
#[derive(Debug, Clone)]
pub struct SiteDiagnostic
{
    pub site: String,
    pub error: BundleError,
}

/// Bundle plus the per-site failures absorbed while building it
#[derive(Debug, Clone)]
pub struct BuildReport
{
    pub bundle: ContextBundle,
    pub diagnostics: Vec<SiteDiagnostic>,
}

pub struct BundleBuilder<'o>
{
    oracle: &'o dyn SourceOracle,
    provider: SyntaxProvider,
    grammar: GrammarProfile,
    settings: ResolveConfig,
    cancel: CancelToken,
}

impl<'o> BundleBuilder<'o>
{
    pub fn new(
        oracle: &'o dyn SourceOracle,
        provider: SyntaxProvider,
        grammar: GrammarProfile,
        settings: ResolveConfig,
    ) -> Self
    {
        Self { oracle, provider, grammar, settings, cancel: CancelToken::new() }
    }

    /// Share a token so another thread can stop the build
    pub fn with_cancel(
        mut self,
        cancel: CancelToken,
    ) -> Self
    {
        self.cancel = cancel;
        self
    }

    /// Build the bundle for `function` declared in `source`, which was read
    /// from `source_path`
    #[instrument(skip(self, source), fields(file = %source_path))]
    pub fn build(
        &self,
        source_path: &Utf8Path,
        source: &str,
        function: &str,
    ) -> Result<BuildReport, BundleError>
    {
        let tree = self
            .provider
            .parse(source)?;

        let target = DeclarationLocator::new(&self.grammar)
            .find(&tree, function)
            .ok_or_else(|| BundleError::NotFound { name: function.to_string() })?;

        let sites = CallSiteExtractor::new(&self.grammar).extract(&tree, target.body(&self.grammar));
        debug!("{} distinct call sites in {function}", sites.len());

        let namespace = namespace_of(&tree, &self.grammar);

        let ranges = RangeReconstructor::new(self.oracle, self.settings.cache_folding_ranges);
        let outcomes = self.resolve_all(source_path, &sites, &ranges);

        let mut dependencies = Vec::with_capacity(sites.len());
        let mut diagnostics = Vec::new();

        for (site, outcome) in sites
            .iter()
            .zip(outcomes)
        {
            match outcome
            {
                Ok(text) => dependencies.push(text),
                Err(BundleError::Cancelled) => return Err(BundleError::Cancelled),
                Err(error) =>
                {
                    warn!("skipping {}: {error}", site.name);
                    diagnostics.push(SiteDiagnostic { site: site.name.clone(), error });
                }
            }
        }

        Ok(BuildReport {
            bundle: ContextBundle { namespace, target: target.matched, dependencies },
            diagnostics,
        })
    }

    /// One outcome per site, in discovery order regardless of completion order
    fn resolve_all(
        &self,
        source_path: &Utf8Path,
        sites: &[CallSite],
        ranges: &RangeReconstructor<'_>,
    ) -> Vec<Result<String, BundleError>>
    {
        let run = |site: &CallSite| -> Result<String, BundleError> {
            if self
                .cancel
                .is_cancelled()
            {
                return Err(BundleError::Cancelled);
            }
            self.resolve_site(source_path, site, ranges)
        };

        let workers = self
            .settings
            .parallelism();
        if workers == 1 || sites.len() < 2
        {
            return sites
                .iter()
                .map(run)
                .collect();
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
        {
            Ok(pool) => pool.install(|| {
                sites
                    .par_iter()
                    .map(run)
                    .collect()
            }),
            Err(e) =>
            {
                warn!("could not start {workers} workers, resolving sequentially: {e}");
                sites
                    .iter()
                    .map(run)
                    .collect()
            }
        }
    }

    /// Resolver → range reconstructor → assembler for a single site
    fn resolve_site(
        &self,
        source_path: &Utf8Path,
        site: &CallSite,
        ranges: &RangeReconstructor<'_>,
    ) -> Result<String, BundleError>
    {
        let def = DefinitionResolver::new(self.oracle).resolve(source_path, site, &self.cancel)?;

        match ranges.reconstruct(&def, &self.cancel)
        {
            Ok(range) =>
            {
                let content = read_source(&def.file_path)?;
                DefinitionAssembler::new(&self.grammar.comment_prefix).assemble(
                    &def.file_path,
                    content.as_ref(),
                    range,
                )
            }
            Err(err @ BundleError::RangeReconstruction { .. })
                if self
                    .settings
                    .structural_fallback =>
            {
                self.structural_fallback(site, &def)
                    .ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Re-parse the defining file and take the declaration named like the
    /// site whose identifier sits on the anchor row
    fn structural_fallback(
        &self,
        site: &CallSite,
        def: &ResolvedDefinition,
    ) -> Option<String>
    {
        let row = def
            .point
            .row
            .checked_sub(1)?;
        let content = read_source(&def.file_path).ok()?;
        let tree = self
            .provider
            .parse(content.as_ref())
            .ok()?;

        let found = DeclarationLocator::new(&self.grammar).find_anchored(
            &tree,
            site.trailing_name(),
            row,
        )?;
        debug!("{} recovered structurally from {}", site.name, def.file_path);
        Some(
            found
                .matched
                .reconstruct(),
        )
    }
}
