//! Tree-sitter backed syntax tree provider.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::core::error::BundleError;

/// Parses raw source into concrete syntax trees for one language
pub struct SyntaxProvider {
    language: Language,
}

impl SyntaxProvider {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn go() -> Self {
        Self::new(tree_sitter_go::LANGUAGE.into())
    }

    /// Parse `source` into a tree that owns a copy of its bytes
    pub fn parse(&self, source: &str) -> Result<SourceTree, BundleError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| BundleError::Parse(format!("could not load grammar: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| BundleError::Parse("tree is nil".to_string()))?;

        Ok(SourceTree {
            tree,
            source: source.to_string(),
        })
    }
}

/// A parsed tree together with the text it was parsed from
pub struct SourceTree {
    tree: Tree,
    source: String,
}

impl SourceTree {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    /// Source text covered by `node`; empty if the span is not on char boundaries
    pub fn text(&self, node: Node<'_>) -> &str {
        node_text(node, self.bytes())
    }
}

pub(crate) fn node_text<'a>(node: Node<'_>, bytes: &'a [u8]) -> &'a str {
    node.utf8_text(bytes).unwrap_or_default()
}
