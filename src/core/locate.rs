//! Declaration lookup by name.
//!
//! Walks the tree depth-first with an explicit stack, trying the
//! free-function shape over the whole tree before falling back to the
//! method shape. A match carries the contiguous run of comment nodes sitting
//! directly above it.

use tracing::{debug, trace};
use tree_sitter::Node;

use crate::core::model::DeclarationMatch;
use crate::parsers::{GrammarProfile, SourceTree};

/// Finds function and method declarations by exact identifier text
pub struct DeclarationLocator<'g>
{
    grammar: &'g GrammarProfile,
}

impl<'g> DeclarationLocator<'g>
{
    pub fn new(grammar: &'g GrammarProfile) -> Self
    {
        Self { grammar }
    }

    /// Free function first, method as fallback; `None` when neither matches
    pub fn find<'t>(
        &self,
        tree: &'t SourceTree,
        name: &str,
    ) -> Option<LocatedDeclaration<'t>>
    {
        debug!("searching for function {name:?}");
        self.find_with(tree, name, None)
    }

    /// Like `find`, but the declared name must sit on 0-based `row`.
    /// Disambiguates same-named methods on different receivers.
    pub fn find_anchored<'t>(
        &self,
        tree: &'t SourceTree,
        name: &str,
        row: usize,
    ) -> Option<LocatedDeclaration<'t>>
    {
        debug!("searching for {name:?} declared on row {row}");
        self.find_with(tree, name, Some(row))
    }

    fn find_with<'t>(
        &self,
        tree: &'t SourceTree,
        name: &str,
        row: Option<usize>,
    ) -> Option<LocatedDeclaration<'t>>
    {
        let g = self.grammar;
        let found = self
            .find_shape(tree, name, row, &g.function_kind, &g.function_name_kind)
            .or_else(|| {
                trace!("no free function {name:?}, trying methods");
                self.find_shape(tree, name, row, &g.method_kind, &g.method_name_kind)
            })?;

        let comment = self.leading_comment(tree, found);

        Some(LocatedDeclaration {
            node: found,
            matched: DeclarationMatch {
                name: name.to_string(),
                comment,
                body_text: tree
                    .text(found)
                    .to_string(),
            },
        })
    }

    /// Pre-order walk returning the first `decl_kind` node whose name field
    /// has kind `name_kind` and text equal to `name`
    fn find_shape<'t>(
        &self,
        tree: &'t SourceTree,
        name: &str,
        row: Option<usize>,
        decl_kind: &str,
        name_kind: &str,
    ) -> Option<Node<'t>>
    {
        let mut stack = vec![tree.root()];

        while let Some(node) = stack.pop()
        {
            if node.kind() == decl_kind
                && let Some(ident) = node.child_by_field_name(
                    &self
                        .grammar
                        .name_field,
                )
                && ident.kind() == name_kind
                && tree.text(ident) == name
                && row.is_none_or(|r| {
                    ident
                        .start_position()
                        .row
                        == r
                })
            {
                return Some(node);
            }

            // Reverse push keeps document order on pop
            for i in (0..node.child_count()).rev()
            {
                if let Some(child) = node.child(i)
                {
                    stack.push(child);
                }
            }
        }

        None
    }

    /// Text of the comment nodes immediately above `decl`, in source order.
    /// Each comment must end on the line right before the next item.
    fn leading_comment(
        &self,
        tree: &SourceTree,
        decl: Node<'_>,
    ) -> String
    {
        let mut first: Option<Node<'_>> = None;
        let mut last: Option<Node<'_>> = None;
        let mut cur = decl;

        while let Some(prev) = cur.prev_sibling()
        {
            let touching = prev
                .end_position()
                .row
                + 1
                >= cur
                    .start_position()
                    .row;

            if prev.kind() != self
                .grammar
                .comment_kind
                || !touching
            {
                break;
            }

            if last.is_none()
            {
                last = Some(prev);
            }
            first = Some(prev);
            cur = prev;
        }

        match (first, last)
        {
            (Some(first), Some(last)) => tree
                .source()
                .get(first.start_byte()..last.end_byte())
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        }
    }
}

/// A declaration match plus the node it came from
pub struct LocatedDeclaration<'t>
{
    pub node: Node<'t>,
    pub matched: DeclarationMatch,
}

impl<'t> LocatedDeclaration<'t>
{
    /// Body block when the grammar exposes one, else the whole declaration
    pub fn body(
        &self,
        grammar: &GrammarProfile,
    ) -> Node<'t>
    {
        self.node
            .child_by_field_name(&grammar.body_field)
            .unwrap_or(self.node)
    }
}

/// Identifier text of the first namespace clause, empty when absent
pub fn namespace_of(
    tree: &SourceTree,
    grammar: &GrammarProfile,
) -> String
{
    let mut stack = vec![tree.root()];

    while let Some(node) = stack.pop()
    {
        if node.kind() == grammar.namespace_kind
        {
            return (0..node.named_child_count())
                .filter_map(|i| node.named_child(i))
                .find(|c| c.kind() == grammar.namespace_name_kind)
                .map(|c| {
                    tree.text(c)
                        .to_string()
                })
                .unwrap_or_default();
        }

        for i in (0..node.named_child_count()).rev()
        {
            if let Some(child) = node.named_child(i)
            {
                stack.push(child);
            }
        }
    }

    String::new()
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::parsers::SyntaxProvider;

    const SRC: &str = "package shapes

import \"fmt\"

// Area of a square
// with side s
func Area(s int) int { return s * s }

type Box struct{ w int }

func (b Box) Area() int { return b.w * b.w }

// Describe prints a box.

func (b Box) Describe() { fmt.Println(b.Area()) }

func helper() {}
";

    fn parse() -> SourceTree
    {
        SyntaxProvider::go()
            .parse(SRC)
            .unwrap()
    }

    #[test]
    fn free_function_wins_over_method_and_keeps_comment_block()
    {
        let tree = parse();
        let grammar = GrammarProfile::go();
        let found = DeclarationLocator::new(&grammar)
            .find(&tree, "Area")
            .unwrap();

        assert_eq!(
            found
                .node
                .kind(),
            "function_declaration"
        );
        assert_eq!(
            found
                .matched
                .comment,
            "// Area of a square\n// with side s"
        );
        assert_eq!(
            found
                .matched
                .reconstruct(),
            "// Area of a square\n// with side s\nfunc Area(s int) int { return s * s }"
        );
    }

    #[test]
    fn method_found_as_fallback_and_detached_comment_ignored()
    {
        let tree = parse();
        let grammar = GrammarProfile::go();
        let found = DeclarationLocator::new(&grammar)
            .find(&tree, "Describe")
            .unwrap();

        assert_eq!(
            found
                .node
                .kind(),
            "method_declaration"
        );
        // A blank line separates the comment from the method
        assert_eq!(
            found
                .matched
                .comment,
            ""
        );
        assert!(
            found
                .matched
                .body_text
                .starts_with("func (b Box) Describe()")
        );
    }

    #[test]
    fn missing_name_is_none_not_error()
    {
        let tree = parse();
        let grammar = GrammarProfile::go();
        assert!(
            DeclarationLocator::new(&grammar)
                .find(&tree, "nope")
                .is_none()
        );
        // Qualified names never match
        assert!(
            DeclarationLocator::new(&grammar)
                .find(&tree, "Box.Describe")
                .is_none()
        );
    }

    #[test]
    fn body_is_the_block()
    {
        let tree = parse();
        let grammar = GrammarProfile::go();
        let found = DeclarationLocator::new(&grammar)
            .find(&tree, "helper")
            .unwrap();
        let body = found.body(&grammar);
        assert_eq!(body.kind(), "block");
        assert_eq!(tree.text(body), "{}");
    }

    #[test]
    fn namespace_reads_package_clause()
    {
        let tree = parse();
        assert_eq!(namespace_of(&tree, &GrammarProfile::go()), "shapes");

        let bare = SyntaxProvider::go()
            .parse("func f() {}\n")
            .unwrap();
        assert_eq!(namespace_of(&bare, &GrammarProfile::go()), "");
    }

    #[test]
    fn anchored_lookup_picks_the_receiver_on_that_row()
    {
        let src = "package p

type A struct{}
type B struct{}

func (A) String() string { return \"a\" }

// B's name
func (B) String() string { return \"b\" }
";
        let tree = SyntaxProvider::go()
            .parse(src)
            .unwrap();
        let grammar = GrammarProfile::go();
        let locator = DeclarationLocator::new(&grammar);

        let b = locator
            .find_anchored(&tree, "String", 8)
            .unwrap();
        assert_eq!(
            b.matched
                .reconstruct(),
            "// B's name\nfunc (B) String() string { return \"b\" }"
        );

        assert!(
            locator
                .find_anchored(&tree, "String", 7)
                .is_none()
        );
    }
}
