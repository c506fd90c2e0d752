use std::any::Any;
use std::fmt;
use std::rc::Rc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::query::Query;
use crate::node::Node;
use crate::types;

/// A node value.
///
/// Values span a small fixed universe plus whatever the host registers
/// through the type registry. Every variant has a textual lexeme form used
/// on the wire; typed variants round-trip through their registry entry so
/// that reparsing serialized output restores the same variant.
///
/// # Examples
///
/// ```
/// use sprig_lang::Value;
///
/// let count = Value::Int(42);
/// assert_eq!(count.as_long(), Some(42));
/// assert_eq!(count.to_text(), "42");
///
/// let flag = Value::Str("true".to_string());
/// assert_eq!(flag.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text, the unnamed default type
    Str(String),

    /// Boolean (`bool`)
    Bool(bool),

    /// 32-bit integer (`int`)
    Int(i32),

    /// 64-bit integer (`long`)
    Long(i64),

    /// Floating point (`float`)
    Float(f64),

    /// Exact decimal (`decimal`)
    Decimal(Decimal),

    /// A reference to another node (`node`)
    Node(Node),

    /// A parsed path query (`x`)
    Query(Query),

    /// A host-registered type, boxed opaquely with its registry name
    Custom(CustomValue),
}

/// Escape hatch for host-registered value types.
#[derive(Clone)]
pub struct CustomValue {
    pub type_name: String,
    pub data: Rc<dyn Any>,
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        if self.type_name != other.type_name {
            return false;
        }
        if Rc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        match types::lookup(&self.type_name) {
            Some(def) => {
                (def.print)(&Value::Custom(self.clone()))
                    == (def.print)(&Value::Custom(other.clone()))
            }
            None => false,
        }
    }
}

impl Value {
    /// The registry name of this value's type.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Node(_) => "node",
            Value::Query(_) => "x",
            Value::Custom(c) => &c.type_name,
        }
    }

    /// Get as a 64-bit integer, when the value converts losslessly.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n as i64),
            Value::Long(n) => Some(*n),
            Value::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            Value::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Get as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Get as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Long(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Decimal(d) => d.to_f64(),
            Value::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The lexeme form, as it appears after the last colon on a line.
    pub fn to_text(&self) -> String {
        types::tagged_lexeme(self).1
    }
}
