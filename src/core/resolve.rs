//! Definition resolution through the point oracle.
//!
//! Formats a 1-based `<path>:<line>:<column>` request for a call site and
//! parses the oracle's `<path>:<line>:<colStart>-<colEnd>: <text>` answer.
//! The reported line is kept 1-based.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, instrument};

use crate::core::error::BundleError;
use crate::core::model::{CallSite, Position, ResolvedDefinition};
use crate::infra::oracle::SourceOracle;
use crate::infra::process::{CancelToken, OracleError};

pub struct DefinitionResolver<'o>
{
    oracle: &'o dyn SourceOracle,
}

impl<'o> DefinitionResolver<'o>
{
    pub fn new(oracle: &'o dyn SourceOracle) -> Self
    {
        Self { oracle }
    }

    /// Ask the oracle where `site` (found in `source_file`) is defined
    #[instrument(skip(self, cancel), fields(site = %site.name))]
    pub fn resolve(
        &self,
        source_file: &Utf8Path,
        site: &CallSite,
        cancel: &CancelToken,
    ) -> Result<ResolvedDefinition, BundleError>
    {
        let request = definition_request(source_file, site.position);

        let answer = self
            .oracle
            .definition(&request, cancel)
            .map_err(|e| oracle_failure(&site.name, e))?;

        let resolved = parse_definition(&answer)?;
        debug!("{} defined at {}:{}", site.name, resolved.file_path, resolved.point.row);
        Ok(resolved)
    }
}

/// Request string for a 0-based tree position
pub fn definition_request(
    file: &Utf8Path,
    position: Position,
) -> String
{
    let p = position.to_one_based();
    format!("{}:{}:{}", file, p.row, p.column)
}

/// Cancellation aborts the whole request; every other failure is per site
pub(crate) fn oracle_failure(
    site: &str,
    err: OracleError,
) -> BundleError
{
    match err
    {
        OracleError::Cancelled { .. } => BundleError::Cancelled,
        other => BundleError::Resolution { site: site.to_string(), detail: other.to_string() },
    }
}

/// Parse `<path>:<line>:<colStart>-<colEnd>: <free text>`
pub fn parse_definition(answer: &str) -> Result<ResolvedDefinition, BundleError>
{
    let answer = answer.trim();
    let location = answer
        .split(' ')
        .next()
        .unwrap_or_default()
        .trim_end_matches(':');

    let fields: Vec<&str> = location
        .split(':')
        .collect();
    if fields.len() != 3
    {
        return Err(BundleError::Parse(format!("invalid definition string: {answer}")));
    }

    let line: usize = fields[1]
        .parse()
        .map_err(|_| BundleError::Parse(format!("invalid line number: {}", fields[1])))?;

    let column_start = fields[2]
        .split('-')
        .next()
        .unwrap_or_default();
    let column: usize = column_start
        .parse()
        .map_err(|_| BundleError::Parse(format!("invalid column number: {column_start}")))?;

    Ok(ResolvedDefinition {
        file_path: Utf8PathBuf::from(fields[0]),
        point: Position::new(line, column),
    })
}
