//! Serialization back to indented-tree source.
//!
//! The writer is the parser's dual: feeding its output back through the
//! parser reconstructs a structurally equal tree, typed values included.
//!
//! # Features
//!
//! - **Canonical layout** - `\r\n` line endings, three spaces per depth level
//! - **Minimal quoting** - names and values stay bare when the tokenizer
//!   would read them back unchanged, and are quoted otherwise
//! - **Multi-line values** - lexemes containing CR or LF use the `@"..."`
//!   form with doubled quotes
//! - **Typed values** - emitted as `name:type:lexeme` through the registry
//!   printers
//!
//! # Examples
//!
//! ```
//! use sprig_lang::{parse_str, to_source};
//!
//! let doc = parse_str("foo\n   bar:int:5\n").unwrap();
//! assert_eq!(to_source(&doc), "foo\r\n   bar:int:5\r\n");
//! ```

use crate::node::Node;
use crate::types;

struct SourceWriter {
    out: String,
}

impl SourceWriter {
    fn new() -> Self {
        SourceWriter { out: String::new() }
    }

    fn write_tree(&mut self, node: &Node, depth: usize) {
        for child in node.children() {
            self.write_line(&child, depth);
            self.write_tree(&child, depth + 1);
        }
    }

    fn write_line(&mut self, node: &Node, depth: usize) {
        for _ in 0..depth {
            self.out.push_str("   ");
        }

        let name = node.name();
        let value = node.value();

        if name.is_empty() {
            // An empty name before a value is just the leading colon; with
            // no value the line needs an explicit quoted empty string.
            if value.is_none() {
                self.out.push_str("\"\"");
            }
        } else if needs_quoting(&name) || name.starts_with(|c: char| c.is_ascii_digit()) {
            self.out.push_str(&quote(&name));
        } else {
            self.out.push_str(&name);
        }

        if let Some(value) = value {
            self.out.push(':');
            let (tag, lexeme) = types::tagged_lexeme(&value);
            let tagged = tag.is_some();
            if let Some(tag) = tag {
                self.out.push_str(&tag);
                self.out.push(':');
            }
            self.write_lexeme(&lexeme, tagged);
        }

        self.out.push_str("\r\n");
    }

    fn write_lexeme(&mut self, lexeme: &str, tagged: bool) {
        if lexeme.is_empty() {
            // A bare empty lexeme reads back fine after a name's colon, but
            // after a type tag the line would end one token short.
            if tagged {
                self.out.push_str("\"\"");
            }
        } else if lexeme.contains('\n') || lexeme.contains('\r') {
            self.out.push_str("@\"");
            self.out.push_str(&lexeme.replace('"', "\"\""));
            self.out.push('"');
        } else if needs_quoting(lexeme) {
            self.out.push_str(&quote(lexeme));
        } else {
            self.out.push_str(lexeme);
        }
    }
}

// Whether the tokenizer would read the bare text back differently.
fn needs_quoting(text: &str) -> bool {
    text.starts_with("//")
        || text.starts_with("/*")
        || text
            .chars()
            .any(|c| matches!(c, ' ' | ':' | '"' | '\'' | '\t') || c.is_control())
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\x{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Serialize the node's children as a document.
///
/// The node itself is treated as the (unwritten) synthetic root, so the
/// output of [`crate::parse_str`] feeds straight back through.
pub fn to_source(node: &Node) -> String {
    let mut writer = SourceWriter::new();
    writer.write_tree(node, 0);
    writer.out
}

/// Serialize a single node: its own line followed by its subtree.
pub fn node_source(node: &Node) -> String {
    let mut writer = SourceWriter::new();
    writer.write_line(node, 0);
    writer.write_tree(node, 1);
    writer.out
}
