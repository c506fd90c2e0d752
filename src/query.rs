//! Path queries over indented trees.
//!
//! A query source is a `/`-separated chain of step tokens. Each token
//! classifies into one [`Step`]; evaluation feeds each step the previous
//! step's output, starting from the node the query was launched on. Tokens
//! may be double-quoted to embed `/` or to force a numeric-looking name;
//! the stored source is canonical, with quotes kept only where removing
//! them would change what the token means.
//!
//! ```text
//! inventory/*/=5        every child of inventory whose value is 5
//! ../0/**               the whole document, in document order
//! @chapter/-            the sibling before the enclosing chapter
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::registry::{self, StepFn};

/// Errors raised while parsing a query source.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The source string is empty
    EmptySource,
    /// A double quote is never closed
    UnterminatedQuote(String),
    /// A quoted token with text outside the quotes
    IllegalQuoting(String),
    /// A `[start,count]` slice that does not parse
    MalformedSlice(String),
    /// A prefix registration colliding with built-in syntax
    ReservedPrefix(char),
    /// A custom step factory rejected its token
    BadStep { token: String, reason: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::EmptySource => write!(f, "Query source is empty"),
            QueryError::UnterminatedQuote(src) => {
                write!(f, "Unclosed quote in query: {}", src)
            }
            QueryError::IllegalQuoting(token) => {
                write!(f, "Badly quoted step token: {}", token)
            }
            QueryError::MalformedSlice(token) => {
                write!(f, "Malformed slice (expected [start,count]): {}", token)
            }
            QueryError::ReservedPrefix(ch) => {
                write!(f, "Prefix '{}' is reserved by built-in step syntax", ch)
            }
            QueryError::BadStep { token, reason } => {
                write!(f, "Bad step token '{}': {}", token, reason)
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// One link in a query pipeline.
#[derive(Clone)]
pub enum Step {
    /// `` (empty token): the root ancestor of each input node
    Root,
    /// `*`: all children of each input node
    Children,
    /// `**`: each input node and its descendants, pre-order
    Subtree,
    /// `.`: the parent of each input node
    Parent,
    /// `..`: the root of the identity node, input ignored
    IdentityRoot,
    /// `#`: follow node-valued inputs, or run query-valued inputs
    Deref,
    /// `-N`: the sibling N positions earlier, wrapping
    PrevSibling(usize),
    /// `+N`: the sibling N positions later, wrapping
    NextSibling(usize),
    /// `N`: the child at position N of each input node
    NthChild(usize),
    /// `@name`: the nearest of self and ancestors named `name`
    NamedAncestor(String),
    /// `[start,count]`: a window of the input sequence as a flat list
    Slice { start: usize, count: usize },
    /// `=lexeme`: inputs whose value equals the literal after coercion
    ValueEquals(String),
    /// A bare, quoted, or `\`-escaped name: inputs with that name
    NameEquals(String),
    /// A step supplied by one of the registries
    Custom { token: String, run: StepFn },
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Root => write!(f, "Root"),
            Step::Children => write!(f, "Children"),
            Step::Subtree => write!(f, "Subtree"),
            Step::Parent => write!(f, "Parent"),
            Step::IdentityRoot => write!(f, "IdentityRoot"),
            Step::Deref => write!(f, "Deref"),
            Step::PrevSibling(n) => write!(f, "PrevSibling({})", n),
            Step::NextSibling(n) => write!(f, "NextSibling({})", n),
            Step::NthChild(n) => write!(f, "NthChild({})", n),
            Step::NamedAncestor(name) => write!(f, "NamedAncestor({:?})", name),
            Step::Slice { start, count } => write!(f, "Slice({}, {})", start, count),
            Step::ValueEquals(lexeme) => write!(f, "ValueEquals({:?})", lexeme),
            Step::NameEquals(name) => write!(f, "NameEquals({:?})", name),
            Step::Custom { token, .. } => write!(f, "Custom({:?})", token),
        }
    }
}

/// A parsed path query: the canonical source plus its step pipeline.
///
/// Two queries are equal when their canonical sources are equal; hashing
/// follows the same rule.
///
/// # Examples
///
/// ```
/// use sprig_lang::Query;
///
/// let query = Query::parse("foo/*/\"bar\"").unwrap();
/// assert_eq!(query.source(), "foo/*/bar");
///
/// let same = Query::parse("foo/*/bar").unwrap();
/// assert_eq!(query, same);
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    steps: Vec<Step>,
}

impl Query {
    pub fn parse(source: &str) -> Result<Query, QueryError> {
        if source.is_empty() {
            return Err(QueryError::EmptySource);
        }
        let raw = split_tokens(source)?;
        let mut steps = Vec::with_capacity(raw.len());
        let mut canonical = Vec::with_capacity(raw.len());
        for token in &raw {
            steps.push(classify(token)?);
            canonical.push(canonical_token(token));
        }
        Ok(Query {
            source: canonical.join("/"),
            steps,
        })
    }

    /// The canonical source string.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Query) -> bool {
        self.source == other.source
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

// Split on '/', except inside double quotes.
fn split_tokens(source: &str) -> Result<Vec<String>, QueryError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in source.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push('"');
            }
            '/' if !in_quotes => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if in_quotes {
        return Err(QueryError::UnterminatedQuote(source.to_string()));
    }
    tokens.push(current);
    Ok(tokens)
}

// One token to one step. First match wins; registries are consulted only
// after every built-in form has had its chance.
pub(crate) fn classify(token: &str) -> Result<Step, QueryError> {
    if token.is_empty() {
        return Ok(Step::Root);
    }
    if let Some(rest) = token.strip_prefix('\\') {
        return Ok(Step::NameEquals(rest.to_string()));
    }
    if token.starts_with('"') {
        if token.len() >= 2 && token.ends_with('"') {
            return Ok(Step::NameEquals(token[1..token.len() - 1].to_string()));
        }
        return Err(QueryError::IllegalQuoting(token.to_string()));
    }
    if token.starts_with('[') {
        return parse_slice(token);
    }
    if let Some(rest) = token.strip_prefix('=') {
        return Ok(Step::ValueEquals(rest.to_string()));
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(index) = token.parse::<usize>() {
            return Ok(Step::NthChild(index));
        }
    }
    if let Some(n) = sibling_offset(token, '+') {
        return Ok(Step::NextSibling(n));
    }
    if let Some(n) = sibling_offset(token, '-') {
        return Ok(Step::PrevSibling(n));
    }
    if let Some(rest) = token.strip_prefix('@') {
        return Ok(Step::NamedAncestor(rest.to_string()));
    }
    if token == "#" {
        return Ok(Step::Deref);
    }
    if token == ".." {
        return Ok(Step::IdentityRoot);
    }
    if token == "." {
        return Ok(Step::Parent);
    }
    if token == "*" {
        return Ok(Step::Children);
    }
    if token == "**" {
        return Ok(Step::Subtree);
    }
    if let Some(run) = registry::static_step(token) {
        return Ok(Step::Custom {
            token: token.to_string(),
            run,
        });
    }
    if let Some(first) = token.chars().next() {
        if let Some(factory) = registry::prefix_factory(first) {
            let run = factory(token)?;
            return Ok(Step::Custom {
                token: token.to_string(),
                run,
            });
        }
    }
    Ok(Step::NameEquals(token.to_string()))
}

// `+`/`-` alone means one position; otherwise the digits must name an
// offset of at least one, or the token is not a sibling step at all.
fn sibling_offset(token: &str, sign: char) -> Option<usize> {
    let rest = token.strip_prefix(sign)?;
    if rest.is_empty() {
        return Some(1);
    }
    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match rest.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

fn parse_slice(token: &str) -> Result<Step, QueryError> {
    let malformed = || QueryError::MalformedSlice(token.to_string());
    let body = token
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(malformed)?;
    let (start, count) = body.split_once(',').ok_or_else(malformed)?;
    let start = start.trim().parse::<usize>().map_err(|_| malformed())?;
    let count = count.trim().parse::<usize>().map_err(|_| malformed())?;
    Ok(Step::Slice { start, count })
}

// Strip quotes only when the bare text still reads as the same name.
fn canonical_token(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        let inner = &raw[1..raw.len() - 1];
        if !inner.is_empty() && !inner.contains('/') && !inner.contains('"') {
            if let Ok(Step::NameEquals(name)) = classify(inner) {
                if name == inner {
                    return inner.to_string();
                }
            }
        }
    }
    raw.to_string()
}
