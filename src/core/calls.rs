//! Call site extraction.
//!
//! Collects every distinct invoked name under a declaration body. Two callee
//! shapes count: a bare identifier, and a member access whose full text is
//! the key while the trailing member identifier supplies the position.
//! Function literals are walked like any other subtree.

use indexmap::IndexMap;
use tracing::trace;
use tree_sitter::Node;

use crate::core::model::{CallSite, Position};
use crate::parsers::{GrammarProfile, SourceTree};

pub struct CallSiteExtractor<'g>
{
    grammar: &'g GrammarProfile,
}

impl<'g> CallSiteExtractor<'g>
{
    pub fn new(grammar: &'g GrammarProfile) -> Self
    {
        Self { grammar }
    }

    /// Distinct call sites under `body`, first occurrence wins, in walk order
    pub fn extract(
        &self,
        tree: &SourceTree,
        body: Node<'_>,
    ) -> Vec<CallSite>
    {
        let mut calls: IndexMap<String, Position> = IndexMap::new();
        let mut stack = vec![body];

        while let Some(node) = stack.pop()
        {
            if node.kind() == self
                .grammar
                .call_kind
                && let Some(site) = self.call_site(tree, node)
            {
                trace!(
                    "call {:?} at {}:{}",
                    site.name, site.position.row, site.position.column
                );
                calls
                    .entry(site.name)
                    .or_insert(site.position);
            }

            for i in (0..node.child_count()).rev()
            {
                if let Some(child) = node.child(i)
                {
                    stack.push(child);
                }
            }
        }

        calls
            .into_iter()
            .map(|(name, position)| CallSite { name, position })
            .collect()
    }

    /// Name and resolver position for one invocation, `None` for other shapes
    fn call_site(
        &self,
        tree: &SourceTree,
        call: Node<'_>,
    ) -> Option<CallSite>
    {
        let callee = call.child_by_field_name(
            &self
                .grammar
                .callee_field,
        )?;

        if callee.kind() == self
            .grammar
            .direct_callee_kind
        {
            return Some(CallSite {
                name: tree
                    .text(callee)
                    .to_string(),
                position: callee
                    .start_position()
                    .into(),
            });
        }

        if callee.kind() == self
            .grammar
            .member_callee_kind
        {
            let member = callee.child_by_field_name(
                &self
                    .grammar
                    .member_field,
            )?;
            return Some(CallSite {
                name: tree
                    .text(callee)
                    .to_string(),
                position: member
                    .start_position()
                    .into(),
            });
        }

        None
    }
}
