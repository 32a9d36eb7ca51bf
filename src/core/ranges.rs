//! Full-span recovery for a resolved definition.
//!
//! The point oracle only yields an anchor, so the range oracle is asked for
//! every foldable region of the defining file and the widest region starting
//! on the anchor's row is taken as the declaration.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use moka::sync::Cache;
use tracing::{debug, instrument, warn};

use crate::core::error::BundleError;
use crate::core::model::{FoldableRange, Position, Range, ResolvedDefinition};
use crate::core::resolve::oracle_failure;
use crate::infra::oracle::SourceOracle;
use crate::infra::process::CancelToken;

const CACHE_CAPACITY: u64 = 256;

pub struct RangeReconstructor<'o>
{
    oracle: &'o dyn SourceOracle,
    cache: Option<Cache<Utf8PathBuf, Arc<Vec<FoldableRange>>>>,
}

impl<'o> RangeReconstructor<'o>
{
    /// `memoize` keeps each file's ranges for the lifetime of this value
    pub fn new(
        oracle: &'o dyn SourceOracle,
        memoize: bool,
    ) -> Self
    {
        let cache = memoize.then(|| Cache::new(CACHE_CAPACITY));
        Self { oracle, cache }
    }

    /// Line range of the declaration anchored at `def.point`
    #[instrument(skip(self, cancel), fields(file = %def.file_path, row = def.point.row))]
    pub fn reconstruct(
        &self,
        def: &ResolvedDefinition,
        cancel: &CancelToken,
    ) -> Result<Range, BundleError>
    {
        let ranges = self.ranges_for(&def.file_path, cancel)?;

        let picked = select_enclosing(&ranges, def.point.row);
        if picked.is_empty()
        {
            return Err(BundleError::RangeReconstruction {
                path: def
                    .file_path
                    .clone(),
                row: def
                    .point
                    .row,
            });
        }

        debug!("picked {}-{} ({} lines)", picked.start.row, picked.end.row, picked.line_span());
        Ok(picked)
    }

    fn ranges_for(
        &self,
        path: &Utf8Path,
        cancel: &CancelToken,
    ) -> Result<Arc<Vec<FoldableRange>>, BundleError>
    {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(path)
        {
            return Ok(hit);
        }

        let raw = self
            .oracle
            .folding_ranges(path, cancel)
            .map_err(|e| oracle_failure(path.as_str(), e))?;
        let parsed = Arc::new(parse_folding_ranges(&raw));

        if let Some(cache) = &self.cache
        {
            cache.insert(path.to_path_buf(), Arc::clone(&parsed));
        }

        Ok(parsed)
    }
}

/// Parse every line of the range oracle's output, skipping malformed entries
pub fn parse_folding_ranges(raw: &str) -> Vec<FoldableRange>
{
    raw.trim()
        .lines()
        .filter(|l| {
            !l.trim()
                .is_empty()
        })
        .filter_map(|line| match parse_range_entry(line)
        {
            Ok(range) => Some(FoldableRange { range }),
            Err(e) =>
            {
                warn!("could not parse range: {e}");
                None
            }
        })
        .collect()
}

/// Parse one `rowStart:colStart-rowEnd:colEnd` entry
pub fn parse_range_entry(entry: &str) -> Result<Range, BundleError>
{
    let entry = entry.trim();
    let (start, end) = entry
        .split_once('-')
        .ok_or_else(|| BundleError::Parse(format!("invalid range string: {entry}")))?;

    let start = parse_point(start, "start", entry)?;
    let end = parse_point(end, "end", entry)?;

    if start.row > end.row
    {
        return Err(BundleError::Parse(format!("range ends before it starts: {entry}")));
    }

    Ok(Range::new(start, end))
}

fn parse_point(
    text: &str,
    which: &str,
    entry: &str,
) -> Result<Position, BundleError>
{
    let (row, col) = text
        .split_once(':')
        .ok_or_else(|| BundleError::Parse(format!("invalid {which} point in {entry}")))?;

    let row = row
        .parse()
        .map_err(|_| BundleError::Parse(format!("invalid {which} row: {row}")))?;
    let col = col
        .parse()
        .map_err(|_| BundleError::Parse(format!("invalid {which} column: {col}")))?;

    Ok(Position::new(row, col))
}

/// Widest range (largest end row) starting on `row`; later entries win ties.
/// Returns the zero range when nothing starts there.
pub fn select_enclosing(
    ranges: &[FoldableRange],
    row: usize,
) -> Range
{
    let mut best = Range::default();

    for candidate in ranges
        .iter()
        .map(|f| f.range)
        .filter(|r| r.start.row == row)
    {
        if best.is_empty() || candidate.end.row >= best.end.row
        {
            best = candidate;
        }
    }

    best
}
