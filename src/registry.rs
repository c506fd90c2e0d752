//! Process-wide registries for custom query steps.
//!
//! Two append-only maps extend the step syntax at runtime. Static steps
//! claim an exact token; prefix steps claim a leading character and build
//! the step function from the whole token text. Both are meant to be
//! populated at startup, before any query is parsed; mutating them during
//! evaluation is not supported. Built-in syntax always wins: a prefix that
//! collides with a built-in trigger character is refused.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use crate::query::QueryError;
use crate::node::{Node, Nodes};

/// A step function: maps an input node sequence to an output sequence in
/// the context of the identity node the query was launched from.
pub type StepFn = Arc<dyn Fn(&Node, Nodes) -> Nodes + Send + Sync>;

/// Builds a [`StepFn`] from the full token text of a prefix step.
pub type StepFactory = Arc<dyn Fn(&str) -> Result<StepFn, QueryError> + Send + Sync>;

static STATIC_STEPS: LazyLock<RwLock<HashMap<String, StepFn>>> =
    LazyLock::new(Default::default);

static PREFIX_STEPS: LazyLock<RwLock<HashMap<char, StepFactory>>> =
    LazyLock::new(Default::default);

// Characters the built-in classification dispatches on.
fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '"' | '[' | '=' | '@' | '#' | '.' | '*' | '+' | '-' | '/'
    ) || ch.is_ascii_digit()
}

/// Register a step under an exact token.
///
/// Tokens that spell built-in syntax are never reached by classification,
/// so registering one has no effect.
pub fn register_step<F>(token: impl Into<String>, step: F)
where
    F: Fn(&Node, Nodes) -> Nodes + Send + Sync + 'static,
{
    STATIC_STEPS
        .write()
        .unwrap()
        .insert(token.into(), Arc::new(step));
}

/// Register a factory for every token starting with `prefix`.
///
/// Fails when `prefix` is one of the characters built-in classification
/// dispatches on.
pub fn register_prefix_step<F>(prefix: char, factory: F) -> Result<(), QueryError>
where
    F: Fn(&str) -> Result<StepFn, QueryError> + Send + Sync + 'static,
{
    if is_reserved(prefix) {
        return Err(QueryError::ReservedPrefix(prefix));
    }
    PREFIX_STEPS
        .write()
        .unwrap()
        .insert(prefix, Arc::new(factory));
    Ok(())
}

pub(crate) fn static_step(token: &str) -> Option<StepFn> {
    STATIC_STEPS.read().unwrap().get(token).cloned()
}

pub(crate) fn prefix_factory(ch: char) -> Option<StepFactory> {
    PREFIX_STEPS.read().unwrap().get(&ch).cloned()
}
