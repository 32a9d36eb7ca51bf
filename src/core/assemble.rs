//! Definition text assembly from a reconstructed line range.
//!
//! Ranges arrive in the oracle's 1-based numbering; this is the only place
//! that converts them into line lookups.

use camino::Utf8Path;

use crate::core::error::BundleError;
use crate::core::model::Range;
use crate::infra::line_index::LineIndex;

pub struct DefinitionAssembler<'p>
{
    comment_prefix: &'p str,
}

impl<'p> DefinitionAssembler<'p>
{
    pub fn new(comment_prefix: &'p str) -> Self
    {
        Self { comment_prefix }
    }

    /// Lines `range.start.row..=range.end.row` of `text`, preceded by the
    /// contiguous comment lines directly above
    pub fn assemble(
        &self,
        path: &Utf8Path,
        text: &str,
        range: Range,
    ) -> Result<String, BundleError>
    {
        let idx = LineIndex::new(text);
        let (first, last) = (range.start.row, range.end.row);

        if first == 0 || first > last
        {
            return Err(BundleError::io(path, format!("invalid line range {first}-{last}")));
        }
        if last > idx.line_count()
        {
            return Err(BundleError::io(
                path,
                format!("file has {} lines, range ends at {last}", idx.line_count()),
            ));
        }

        let body = idx
            .lines(first, last)
            .ok_or_else(|| BundleError::io(path, format!("lines {first}-{last} are not UTF-8 aligned")))?;

        let mut parts = self.comments_above(&idx, first);
        parts.push(body);
        Ok(parts.join("\n"))
    }

    /// Comment lines ending right above `line`, top to bottom
    fn comments_above<'t>(
        &self,
        idx: &LineIndex<'t>,
        line: usize,
    ) -> Vec<&'t str>
    {
        let mut comments: Vec<&str> = (1..line)
            .rev()
            .map_while(|n| idx.line(n))
            .take_while(|l| {
                l.trim()
                    .starts_with(self.comment_prefix)
            })
            .collect();

        comments.reverse();
        comments
    }
}
