// tests/format_tests.rs

use sprig_lang::node::Node;
use sprig_lang::output::{node_source, to_source};
use sprig_lang::parser::parse_str;
use sprig_lang::value::Value;

fn roundtrip(source: &str) {
    let first = parse_str(source).unwrap();
    let emitted = to_source(&first);
    let second = parse_str(&emitted).unwrap();
    assert_eq!(first, second, "Round trip changed the tree for: {}", source);
    // Emission is a fixpoint once the source is canonical.
    assert_eq!(to_source(&second), emitted);
}

// ============================================================================
// Canonical Output
// ============================================================================

#[test]
fn test_basic_layout() {
    let root = parse_str("foo\n   bar:int:5\n").unwrap();
    assert_eq!(to_source(&root), "foo\r\n   bar:int:5\r\n");
}

#[test]
fn test_lf_input_emits_crlf() {
    let root = parse_str("a\n   b\n").unwrap();
    assert_eq!(to_source(&root), "a\r\n   b\r\n");
}

#[test]
fn test_blank_lines_and_comments_vanish() {
    let root = parse_str("a\n\n// note\n   b\n").unwrap();
    assert_eq!(to_source(&root), "a\r\n   b\r\n");
}

#[test]
fn test_three_spaces_per_level() {
    let root = parse_str("a\n   b\n      c\n").unwrap();
    assert_eq!(to_source(&root), "a\r\n   b\r\n      c\r\n");
}

#[test]
fn test_node_source_includes_the_node_itself() {
    let root = parse_str("a\n   b\n").unwrap();
    let a = root.child(0).unwrap();
    assert_eq!(node_source(&a), "a\r\n   b\r\n");
}

// ============================================================================
// Quoting
// ============================================================================

#[test]
fn test_name_with_spaces_is_quoted() {
    let root = Node::new("");
    root.push(Node::new("a b"));
    assert_eq!(to_source(&root), "\"a b\"\r\n");
}

#[test]
fn test_name_with_colon_is_quoted() {
    let root = Node::new("");
    root.push(Node::new("a:b"));
    assert_eq!(to_source(&root), "\"a:b\"\r\n");
}

#[test]
fn test_digit_leading_name_is_quoted() {
    let root = Node::new("");
    root.push(Node::new("5"));
    assert_eq!(to_source(&root), "\"5\"\r\n");
}

#[test]
fn test_slash_in_name_stays_bare() {
    let root = parse_str("foo\n   how/dy\n").unwrap();
    assert_eq!(to_source(&root), "foo\r\n   how/dy\r\n");
}

#[test]
fn test_empty_name_without_value() {
    let root = Node::new("");
    root.push(Node::new(""));
    assert_eq!(to_source(&root), "\"\"\r\n");
}

#[test]
fn test_empty_name_with_value() {
    let root = parse_str(":5\n").unwrap();
    assert_eq!(to_source(&root), ":5\r\n");
}

#[test]
fn test_value_with_escapes() {
    let root = Node::new("");
    root.push(Node::with_value("a", Value::Str("tab\there".to_string())));
    assert_eq!(to_source(&root), "a:\"tab\\there\"\r\n");
}

#[test]
fn test_multiline_value_uses_raw_form() {
    let root = Node::new("");
    root.push(Node::with_value("a", Value::Str("one\ntwo".to_string())));
    assert_eq!(to_source(&root), "a:@\"one\ntwo\"\r\n");
}

#[test]
fn test_multiline_value_doubles_quotes() {
    let root = Node::new("");
    root.push(Node::with_value("a", Value::Str("say \"hi\"\nbye".to_string())));
    assert_eq!(to_source(&root), "a:@\"say \"\"hi\"\"\nbye\"\r\n");
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_roundtrip_structure() {
    roundtrip("foo\n   bar\n   xxx\n      deep\nfoo\n   bar3\n");
}

#[test]
fn test_roundtrip_typed_values() {
    roundtrip("a:int:5\nb:long:6000000000\nc:bool:false\nd:float:2.5\ne:decimal:10.01\n");
}

#[test]
fn test_roundtrip_quoted_names_and_values() {
    roundtrip("\"a b\":\"x:y\"\n\"5\"\n:\n");
}

#[test]
fn test_roundtrip_multiline_value() {
    roundtrip("a:@\"one\r\ntwo \"\"quoted\"\"\"\n");
}

#[test]
fn test_roundtrip_nested_node_value() {
    roundtrip("wrap:node:@\"inner:5\r\n   leaf\r\n\"\n");
}

#[test]
fn test_roundtrip_query_value() {
    roundtrip("q:x:../0/**\n");
}

#[test]
fn test_roundtrip_strips_redundant_query_quotes() {
    // The stored query source is canonical, so the emitted lexeme is too.
    let root = parse_str("q:x:'\"foo\"/*'\n").unwrap();
    assert_eq!(to_source(&root), "q:x:foo/*\r\n");
    roundtrip("q:x:'\"foo\"/*'\n");
}

#[test]
fn test_types_survive_roundtrips() {
    let root = parse_str("a:int:5\nb:5\n").unwrap();
    let again = parse_str(&to_source(&root)).unwrap();
    assert_eq!(again.child(0).unwrap().value(), Some(Value::Int(5)));
    assert_eq!(
        again.child(1).unwrap().value(),
        Some(Value::Str("5".to_string()))
    );
}
