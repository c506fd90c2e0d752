//! The process-wide type registry.
//!
//! Typed values on the wire look like `name:type:lexeme`. The registry maps
//! each type name to a parser (lexeme to value) and a printer (value back to
//! lexeme). Built-ins cover the plain scalar types plus `node` (a nested
//! tree stored as a value) and `x` (a path query). Hosts may append their
//! own entries at startup; mutating the registry while parsing or
//! evaluating is not supported.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use rust_decimal::Decimal;

use crate::query::Query;
use crate::value::Value;

/// Errors raised while parsing a typed lexeme.
#[derive(Debug, Clone)]
pub enum TypeError {
    /// The type name has no registry entry
    UnknownType(String),
    /// The lexeme does not parse under the named type
    BadLexeme {
        type_name: String,
        lexeme: String,
        reason: String,
    },
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeError::UnknownType(name) => write!(f, "Unknown value type: '{}'", name),
            TypeError::BadLexeme {
                type_name,
                lexeme,
                reason,
            } => write!(f, "'{}' is not a valid {}: {}", lexeme, type_name, reason),
        }
    }
}

impl std::error::Error for TypeError {}

pub type ParseFn = Arc<dyn Fn(&str) -> Result<Value, TypeError> + Send + Sync>;
pub type PrintFn = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// A registry entry: lexeme parser plus lexeme printer.
#[derive(Clone)]
pub struct TypeDef {
    pub parse: ParseFn,
    pub print: PrintFn,
}

static TYPES: LazyLock<RwLock<HashMap<String, TypeDef>>> =
    LazyLock::new(|| RwLock::new(builtins()));

/// Register a host type. Existing entries with the same name are replaced.
pub fn register_type<P, S>(name: impl Into<String>, parse: P, print: S)
where
    P: Fn(&str) -> Result<Value, TypeError> + Send + Sync + 'static,
    S: Fn(&Value) -> Option<String> + Send + Sync + 'static,
{
    TYPES.write().unwrap().insert(
        name.into(),
        TypeDef {
            parse: Arc::new(parse),
            print: Arc::new(print),
        },
    );
}

/// Clone a type's entry out of the registry.
///
/// The entry is detached from the lock before it is returned, so parsers
/// that re-enter the registry (nested `node:` and `x:` lexemes) are safe.
pub fn lookup(name: &str) -> Option<TypeDef> {
    TYPES.read().unwrap().get(name).cloned()
}

/// Parse `lexeme` under the named type.
pub fn parse_typed(type_name: &str, lexeme: &str) -> Result<Value, TypeError> {
    let def = lookup(type_name).ok_or_else(|| TypeError::UnknownType(type_name.to_string()))?;
    (def.parse)(lexeme)
}

/// The wire tag and lexeme for a value: `None` tag for plain strings,
/// `Some(type_name)` for everything else.
pub fn tagged_lexeme(value: &Value) -> (Option<String>, String) {
    match value {
        Value::Str(s) => (None, s.clone()),
        Value::Bool(b) => (Some("bool".to_string()), b.to_string()),
        Value::Int(n) => (Some("int".to_string()), n.to_string()),
        Value::Long(n) => (Some("long".to_string()), n.to_string()),
        Value::Float(n) => (Some("float".to_string()), n.to_string()),
        Value::Decimal(d) => (Some("decimal".to_string()), d.to_string()),
        Value::Node(n) => (Some("node".to_string()), crate::output::to_source(n)),
        Value::Query(q) => (Some("x".to_string()), q.source().to_string()),
        Value::Custom(c) => {
            let lexeme = lookup(&c.type_name)
                .and_then(|def| (def.print)(value))
                .unwrap_or_default();
            (Some(c.type_name.clone()), lexeme)
        }
    }
}

fn bad_lexeme(type_name: &str, lexeme: &str, reason: impl ToString) -> TypeError {
    TypeError::BadLexeme {
        type_name: type_name.to_string(),
        lexeme: lexeme.to_string(),
        reason: reason.to_string(),
    }
}

fn builtins() -> HashMap<String, TypeDef> {
    let mut map = HashMap::new();
    let mut add = |name: &str, parse: ParseFn, print: PrintFn| {
        map.insert(name.to_string(), TypeDef { parse, print });
    };

    add(
        "string",
        Arc::new(|s: &str| Ok(Value::Str(s.to_string()))),
        Arc::new(|v: &Value| match v {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }),
    );
    add(
        "bool",
        Arc::new(|s: &str| {
            s.parse::<bool>()
                .map(Value::Bool)
                .map_err(|e| bad_lexeme("bool", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }),
    );
    add(
        "int",
        Arc::new(|s: &str| {
            s.parse::<i32>()
                .map(Value::Int)
                .map_err(|e| bad_lexeme("int", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Int(n) => Some(n.to_string()),
            _ => None,
        }),
    );
    add(
        "long",
        Arc::new(|s: &str| {
            s.parse::<i64>()
                .map(Value::Long)
                .map_err(|e| bad_lexeme("long", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Long(n) => Some(n.to_string()),
            _ => None,
        }),
    );
    add(
        "float",
        Arc::new(|s: &str| {
            s.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| bad_lexeme("float", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Float(n) => Some(n.to_string()),
            _ => None,
        }),
    );
    add(
        "decimal",
        Arc::new(|s: &str| {
            s.parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|e| bad_lexeme("decimal", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Decimal(d) => Some(d.to_string()),
            _ => None,
        }),
    );
    add(
        "node",
        Arc::new(|s: &str| {
            crate::parser::parse_str(s)
                .map(Value::Node)
                .map_err(|e| bad_lexeme("node", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Node(n) => Some(crate::output::to_source(n)),
            _ => None,
        }),
    );
    add(
        "x",
        Arc::new(|s: &str| {
            Query::parse(s)
                .map(Value::Query)
                .map_err(|e| bad_lexeme("x", s, e))
        }),
        Arc::new(|v: &Value| match v {
            Value::Query(q) => Some(q.source().to_string()),
            _ => None,
        }),
    );

    map
}
