//! Query evaluation.
//!
//! Evaluation is a left fold: the pipeline starts from the single-element
//! sequence holding the identity node (the node the query was launched on)
//! and each step maps the previous step's output to its own. Sequences are
//! lazy end to end; nothing is materialized until the caller consumes the
//! result, and a prefix can be taken without visiting the rest of the tree.

use std::iter;

use crate::query::{Query, Step};
use crate::node::{Node, Nodes};
use crate::value::Value;

/// Errors that can occur when evaluating a node's own value as a query.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// The node's value is not a query
    NotAQuery { name: String, found: String },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::NotAQuery { name, found } => {
                write!(
                    f,
                    "Cannot evaluate node '{}': its value is {}, not a query",
                    name, found
                )
            }
        }
    }
}

impl std::error::Error for EvalError {}

impl Query {
    /// Run the pipeline with `identity` as the launch node.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprig_lang::{parse_str, Query};
    ///
    /// let doc = parse_str("foo\n   bar\n   baz\n").unwrap();
    /// let query = Query::parse("../0/*").unwrap();
    /// let names: Vec<String> = query.eval(&doc).map(|n| n.name()).collect();
    /// assert_eq!(names, vec!["bar", "baz"]);
    /// ```
    pub fn eval(&self, identity: &Node) -> Nodes {
        let mut sequence: Nodes = Box::new(iter::once(identity.clone()));
        for step in self.steps() {
            sequence = step.apply(identity, sequence);
        }
        sequence
    }
}

impl Node {
    /// Evaluate this node's own value, with the node itself as identity.
    pub fn eval(&self) -> Result<Nodes, EvalError> {
        match self.value() {
            Some(Value::Query(query)) => Ok(query.eval(self)),
            Some(other) => Err(EvalError::NotAQuery {
                name: self.name(),
                found: format!("of type {}", other.type_name()),
            }),
            None => Err(EvalError::NotAQuery {
                name: self.name(),
                found: "missing".to_string(),
            }),
        }
    }
}

impl Step {
    pub(crate) fn apply(&self, identity: &Node, input: Nodes) -> Nodes {
        match self {
            Step::Root => Box::new(input.map(|n| n.root())),
            Step::Children => Box::new(input.flat_map(|n| n.children().into_iter())),
            Step::Subtree => Box::new(input.flat_map(|n| n.walk())),
            Step::Parent => Box::new(input.filter_map(|n| n.parent())),
            Step::IdentityRoot => {
                let identity = identity.clone();
                Box::new(iter::once_with(move || identity.root()))
            }
            Step::Deref => Box::new(input.flat_map(|n| -> Nodes {
                match n.value() {
                    Some(Value::Node(target)) => Box::new(iter::once(target)),
                    Some(Value::Query(query)) => query.eval(&n),
                    _ => Box::new(iter::empty()),
                }
            })),
            Step::PrevSibling(n) => {
                let offset = -(*n as isize);
                Box::new(input.filter_map(move |node| node.sibling(offset)))
            }
            Step::NextSibling(n) => {
                let offset = *n as isize;
                Box::new(input.filter_map(move |node| node.sibling(offset)))
            }
            Step::NthChild(index) => {
                let index = *index;
                Box::new(input.filter_map(move |node| node.child(index)))
            }
            Step::NamedAncestor(name) => {
                let name = name.clone();
                Box::new(input.filter_map(move |node| node.ancestor_named(&name)))
            }
            Step::Slice { start, count } => Box::new(input.skip(*start).take(*count)),
            Step::ValueEquals(lexeme) => {
                let lexeme = lexeme.clone();
                Box::new(input.filter(move |node| literal_matches(node.value(), &lexeme)))
            }
            Step::NameEquals(name) => {
                let name = name.clone();
                Box::new(input.filter(move |node| node.name() == name))
            }
            Step::Custom { run, .. } => run(identity, input),
        }
    }
}

// A value matches a literal in the literal's own terms: as an integer or a
// boolean when the literal reads as one, else lexeme for lexeme.
fn literal_matches(value: Option<Value>, lexeme: &str) -> bool {
    let Some(value) = value else {
        return false;
    };
    if let Ok(want) = lexeme.parse::<i64>() {
        return value.as_long() == Some(want);
    }
    if let Ok(want) = lexeme.parse::<bool>() {
        return value.as_bool() == Some(want);
    }
    value.to_text() == lexeme
}
