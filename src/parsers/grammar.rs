//! Structural predicates for one source grammar, kept as data.
//!
//! The locator and the call extractor only ever compare node kinds and
//! field names against this profile, so retargeting to another grammar means
//! swapping the tree-sitter language plus one of these.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarProfile {
    /// Free-function declaration node kind
    pub function_kind: String,
    /// Method-on-receiver declaration node kind
    pub method_kind: String,
    /// Field holding a declaration's name
    pub name_field: String,
    /// Field holding a declaration's body
    pub body_field: String,
    /// Identifier kind of a free function's name
    pub function_name_kind: String,
    /// Identifier kind of a method's name
    pub method_name_kind: String,

    /// Invocation node kind
    pub call_kind: String,
    /// Field on the invocation holding the callee
    pub callee_field: String,
    /// Callee kind for direct calls (`foo()`)
    pub direct_callee_kind: String,
    /// Callee kind for member calls (`recv.member()`)
    pub member_callee_kind: String,
    /// Field on the member access holding the trailing member
    pub member_field: String,

    /// Comment node kind
    pub comment_kind: String,
    /// Prefix recognising a comment line when scanning raw file lines
    pub comment_prefix: String,

    /// Namespace clause node kind
    pub namespace_kind: String,
    /// Identifier kind inside the namespace clause
    pub namespace_name_kind: String,
}

impl GrammarProfile {
    /// Predicates for tree-sitter-go
    pub fn go() -> Self {
        Self {
            function_kind: "function_declaration".into(),
            method_kind: "method_declaration".into(),
            name_field: "name".into(),
            body_field: "body".into(),
            function_name_kind: "identifier".into(),
            method_name_kind: "field_identifier".into(),
            call_kind: "call_expression".into(),
            callee_field: "function".into(),
            direct_callee_kind: "identifier".into(),
            member_callee_kind: "selector_expression".into(),
            member_field: "field".into(),
            comment_kind: "comment".into(),
            comment_prefix: "//".into(),
            namespace_kind: "package_clause".into(),
            namespace_name_kind: "package_identifier".into(),
        }
    }
}

impl Default for GrammarProfile {
    fn default() -> Self {
        Self::go()
    }
}
