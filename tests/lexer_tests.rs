// tests/lexer_tests.rs

use sprig_lang::lexer::{LexError, Lexer};
use sprig_lang::source::StrSource;
use sprig_lang::token::Token;

fn lexer(input: &str) -> Lexer<StrSource> {
    Lexer::new(StrSource::new(input))
}

fn literal(text: &str) -> Token {
    Token::Literal(text.to_string())
}

fn all_tokens(input: &str) -> Vec<Token> {
    let mut lexer = lexer(input);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token().unwrap();
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

// ============================================================================
// Basic Lines
// ============================================================================

#[test]
fn test_name_only() {
    assert_eq!(all_tokens("foo"), vec![literal("foo"), Token::Eof]);
}

#[test]
fn test_name_and_value() {
    assert_eq!(
        all_tokens("foo:bar"),
        vec![literal("foo"), Token::Colon, literal("bar"), Token::Eof]
    );
}

#[test]
fn test_typed_value() {
    assert_eq!(
        all_tokens("bar1:int:5"),
        vec![
            literal("bar1"),
            Token::Colon,
            literal("int"),
            Token::Colon,
            literal("5"),
            Token::Eof
        ]
    );
}

#[test]
fn test_colon_flushes_buffer() {
    let mut lexer = lexer("ab:cd");
    assert_eq!(lexer.next_token(), Ok(literal("ab")));
    assert_eq!(lexer.next_token(), Ok(Token::Colon));
    assert_eq!(lexer.next_token(), Ok(literal("cd")));
}

#[test]
fn test_leading_colon() {
    assert_eq!(
        all_tokens(":5"),
        vec![Token::Colon, literal("5"), Token::Eof]
    );
}

// ============================================================================
// Newlines
// ============================================================================

#[test]
fn test_lf_newline() {
    assert_eq!(
        all_tokens("a\nb"),
        vec![literal("a"), Token::Newline, literal("b"), Token::Eof]
    );
}

#[test]
fn test_crlf_newline() {
    assert_eq!(
        all_tokens("a\r\nb"),
        vec![literal("a"), Token::Newline, literal("b"), Token::Eof]
    );
}

#[test]
fn test_newline_flushes_buffer_first() {
    let mut lexer = lexer("abc\n");
    assert_eq!(lexer.next_token(), Ok(literal("abc")));
    assert_eq!(lexer.next_token(), Ok(Token::Newline));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_bare_carriage_return_is_invalid() {
    let mut lexer = lexer("\rx");
    assert_eq!(lexer.next_token(), Err(LexError::BareCarriageReturn));
}

#[test]
fn test_carriage_return_after_text() {
    // The CR first flushes the buffer, then fails on its own.
    let mut lexer = lexer("abc\rx");
    assert_eq!(lexer.next_token(), Ok(literal("abc")));
    assert_eq!(lexer.next_token(), Err(LexError::BareCarriageReturn));
}

// ============================================================================
// Indentation
// ============================================================================

#[test]
fn test_indent_levels() {
    assert_eq!(
        all_tokens("a\n   b\n      c"),
        vec![
            literal("a"),
            Token::Newline,
            Token::Indent(3),
            literal("b"),
            Token::Newline,
            Token::Indent(6),
            literal("c"),
            Token::Eof
        ]
    );
}

#[test]
fn test_ragged_indent_is_invalid() {
    let mut lexer = lexer("a\n  b");
    assert_eq!(lexer.next_token(), Ok(literal("a")));
    assert_eq!(lexer.next_token(), Ok(Token::Newline));
    assert_eq!(lexer.next_token(), Err(LexError::RaggedIndent(2)));
}

#[test]
fn test_ragged_indent_at_eof_is_tolerated() {
    let mut lexer = lexer("a\n  ");
    assert_eq!(lexer.next_token(), Ok(literal("a")));
    assert_eq!(lexer.next_token(), Ok(Token::Newline));
    assert_eq!(lexer.next_token(), Ok(Token::Indent(2)));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_spaces_inside_value_join_the_literal() {
    assert_eq!(
        all_tokens("a:b c"),
        vec![literal("a"), Token::Colon, literal("b c"), Token::Eof]
    );
}

// ============================================================================
// Quoted Strings
// ============================================================================

#[test]
fn test_double_quoted() {
    assert_eq!(all_tokens("\"a b\""), vec![literal("a b"), Token::Eof]);
}

#[test]
fn test_single_quoted() {
    assert_eq!(all_tokens("'a b'"), vec![literal("a b"), Token::Eof]);
}

#[test]
fn test_quoted_keeps_separators() {
    assert_eq!(
        all_tokens("\"a:b/c\""),
        vec![literal("a:b/c"), Token::Eof]
    );
}

#[test]
fn test_escapes() {
    let cases = vec![
        ("\"a\\nb\"", "a\nb"),
        ("\"a\\rb\"", "a\rb"),
        ("\"a\\tb\"", "a\tb"),
        ("\"a\\\\b\"", "a\\b"),
        ("\"a\\\"b\"", "a\"b"),
        ("'a\\'b'", "a'b"),
        ("\"\\x0041\"", "A"),
        ("\"\\x00e9\"", "\u{e9}"),
    ];
    for (input, expected) in cases {
        assert_eq!(
            all_tokens(input),
            vec![literal(expected), Token::Eof],
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_unknown_escape_is_invalid() {
    let mut lexer = lexer("\"a\\qb\"");
    assert_eq!(lexer.next_token(), Err(LexError::UnknownEscape('q')));
}

#[test]
fn test_double_quote_escape_is_unknown_when_single_quoted() {
    let mut lexer = lexer("'a\\\"b'");
    assert_eq!(lexer.next_token(), Err(LexError::UnknownEscape('"')));
}

#[test]
fn test_bad_unicode_escape() {
    let mut lexer = lexer("\"\\x00zz\"");
    assert!(matches!(
        lexer.next_token(),
        Err(LexError::BadUnicodeEscape(_))
    ));
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        lexer("\"abc").next_token(),
        Err(LexError::UnterminatedString)
    );
}

#[test]
fn test_string_does_not_cross_lines() {
    assert_eq!(
        lexer("\"abc\ndef\"").next_token(),
        Err(LexError::UnterminatedString)
    );
}

#[test]
fn test_quote_after_text_is_ordinary() {
    assert_eq!(all_tokens("ab\"cd"), vec![literal("ab\"cd"), Token::Eof]);
}

// ============================================================================
// Multi-line Strings
// ============================================================================

#[test]
fn test_multiline_string() {
    assert_eq!(
        all_tokens("@\"a\nb\""),
        vec![literal("a\nb"), Token::Eof]
    );
}

#[test]
fn test_multiline_preserves_crlf() {
    assert_eq!(
        all_tokens("@\"a\r\nb\""),
        vec![literal("a\r\nb"), Token::Eof]
    );
}

#[test]
fn test_multiline_doubled_quote() {
    assert_eq!(
        all_tokens("@\"say \"\"hi\"\"\""),
        vec![literal("say \"hi\""), Token::Eof]
    );
}

#[test]
fn test_multiline_unterminated() {
    assert_eq!(
        lexer("@\"abc").next_token(),
        Err(LexError::UnterminatedString)
    );
}

#[test]
fn test_at_without_quote_is_ordinary() {
    assert_eq!(all_tokens("@name"), vec![literal("@name"), Token::Eof]);
}

#[test]
fn test_at_after_text_is_ordinary() {
    assert_eq!(all_tokens("a@b"), vec![literal("a@b"), Token::Eof]);
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_line_comment() {
    assert_eq!(
        all_tokens("// hello\nfoo"),
        vec![Token::Newline, literal("foo"), Token::Eof]
    );
}

#[test]
fn test_block_comment() {
    assert_eq!(all_tokens("/* hello */foo"), vec![literal("foo"), Token::Eof]);
}

#[test]
fn test_block_comment_spans_lines() {
    assert_eq!(
        all_tokens("/* a\nb */foo"),
        vec![literal("foo"), Token::Eof]
    );
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(
        lexer("/* abc").next_token(),
        Err(LexError::UnterminatedBlockComment)
    );
}

#[test]
fn test_slash_inside_name() {
    assert_eq!(all_tokens("how/dy"), vec![literal("how/dy"), Token::Eof]);
}

#[test]
fn test_double_slash_inside_name_is_not_a_comment() {
    assert_eq!(all_tokens("a//b"), vec![literal("a//b"), Token::Eof]);
}

#[test]
fn test_lone_slash_starts_a_name() {
    assert_eq!(all_tokens("/foo"), vec![literal("/foo"), Token::Eof]);
}
