//! Value types shared by the extraction pipeline.
//!
//! Everything here is created fresh per bundle request and never mutated
//! after construction. Coordinates follow two conventions:
//! - Positions read from the syntax tree are 0-based (row and column).
//! - Positions and ranges that came back from the oracle stay in its
//!   1-based line numbering until the assembler slices the file.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// A row/column pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position
{
    pub row: usize,
    pub column: usize,
}

impl Position
{
    pub fn new(
        row: usize,
        column: usize,
    ) -> Self
    {
        Self { row, column }
    }

    /// Shift a 0-based tree position into the oracle's 1-based numbering
    pub fn to_one_based(self) -> Self
    {
        Self { row: self.row + 1, column: self.column + 1 }
    }
}

impl From<tree_sitter::Point> for Position
{
    fn from(p: tree_sitter::Point) -> Self
    {
        Self { row: p.row, column: p.column }
    }
}

/// Inclusive line span; `start.row <= end.row`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range
{
    pub start: Position,
    pub end: Position,
}

impl Range
{
    pub fn new(
        start: Position,
        end: Position,
    ) -> Self
    {
        Self { start, end }
    }

    /// The zero range doubles as "nothing matched"
    pub fn is_empty(&self) -> bool
    {
        *self == Range::default()
    }

    /// Number of lines covered, counting both ends
    pub fn line_span(&self) -> usize
    {
        self.end
            .row
            .saturating_sub(self.start.row)
            + 1
    }
}

/// A located declaration with its attached comment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationMatch
{
    /// Identifier the declaration was matched by
    pub name: String,

    /// Leading comment text; empty when none is attached
    pub comment: String,

    /// Source text of the declaration node itself
    pub body_text: String,
}

impl DeclarationMatch
{
    /// Comment (if any) on top of the declaration, newline separated.
    /// An empty comment yields the declaration text untouched.
    pub fn reconstruct(&self) -> String
    {
        if self
            .comment
            .trim()
            .is_empty()
        {
            return self
                .body_text
                .clone();
        }

        format!("{}\n{}", self.comment, self.body_text)
    }
}

/// One distinct invoked name and where to point the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite
{
    /// Bare identifier or full `receiver.member` text
    pub name: String,

    /// 0-based tree position of the identifier the resolver should target
    pub position: Position,
}

impl CallSite
{
    /// Name as it appears at its definition (`fmt.Println` → `Println`)
    pub fn trailing_name(&self) -> &str
    {
        self.name
            .rsplit('.')
            .next()
            .unwrap_or(&self.name)
    }
}

/// Where the point oracle says a symbol is defined (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDefinition
{
    pub file_path: Utf8PathBuf,
    pub point: Position,
}

/// One block boundary reported by the range oracle (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoldableRange
{
    pub range: Range,
}

/// The final artifact handed to the generation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextBundle
{
    /// Identifier from the namespace clause of the target's file
    pub namespace: String,

    /// The requested declaration
    pub target: DeclarationMatch,

    /// Dependency texts in call-site discovery order
    pub dependencies: Vec<String>,
}
