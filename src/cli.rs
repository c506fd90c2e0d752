//! CLI support for sprig-lang
//!
//! Provides programmatic access to the sprig CLI operations for embedding
//! in other tools.

use std::io;

use crate::evaluator::EvalError;
use crate::query::{Query, QueryError};
use crate::node::Node;
use crate::output;
use crate::parser::{parse_str, ParseError};
use crate::value::Value;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Document parse error
    Parse(ParseError),
    /// Query syntax error
    Query(QueryError),
    /// Evaluation error
    Eval(EvalError),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Query(e) => write!(f, "Query error: {}", e),
            CliError::Eval(e) => write!(f, "Evaluation error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Pass a file or pipe a document to stdin.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Query(e) => Some(e),
            CliError::Eval(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        CliError::Query(e)
    }
}

impl From<EvalError> for CliError {
    fn from(e: EvalError) -> Self {
        CliError::Eval(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// Options for the query command
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The path query to run
    pub query: String,
    /// Document source text
    pub input: String,
    /// Emit matches as JSON instead of tree source
    pub json: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Validate a document, returning its root on success.
pub fn execute_check(input: &str) -> Result<Node, CliError> {
    Ok(parse_str(input)?)
}

/// Run a path query against a document, from its root.
pub fn execute_query(options: &QueryOptions) -> Result<String, CliError> {
    let root = parse_str(&options.input)?;
    let query = Query::parse(&options.query)?;
    let matches: Vec<Node> = query.eval(&root).collect();

    if options.json {
        let values: Vec<serde_json::Value> = matches.iter().map(tree_to_json).collect();
        let array = serde_json::Value::Array(values);
        return Ok(render_json(&array, options.pretty));
    }

    let mut out = String::new();
    for node in &matches {
        out.push_str(&output::node_source(node));
    }
    Ok(out)
}

/// Convert a document to JSON.
pub fn execute_convert(input: &str, pretty: bool) -> Result<String, CliError> {
    let root = parse_str(input)?;
    let children: Vec<serde_json::Value> = root.children().iter().map(tree_to_json).collect();
    Ok(render_json(&serde_json::Value::Array(children), pretty))
}

fn render_json(value: &serde_json::Value, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .unwrap_or_default()
}

/// One node as a JSON object: name, optional value, optional children.
pub fn tree_to_json(node: &Node) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    object.insert("name".to_string(), serde_json::Value::String(node.name()));
    if let Some(value) = node.value() {
        object.insert("value".to_string(), value_to_json(&value));
    }
    if node.child_count() > 0 {
        let children = node.children().iter().map(tree_to_json).collect();
        object.insert("children".to_string(), serde_json::Value::Array(children));
    }
    serde_json::Value::Object(object)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Long(n) => serde_json::Value::from(*n),
        Value::Float(n) => serde_json::Value::from(*n),
        // Decimals stay textual so precision survives the trip.
        Value::Decimal(d) => serde_json::Value::String(d.to_string()),
        Value::Node(n) => tree_to_json(n),
        Value::Query(q) => serde_json::Value::String(q.source().to_string()),
        Value::Custom(_) => serde_json::Value::String(value.to_text()),
    }
}
