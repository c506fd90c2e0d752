use crate::source::CharSource;
use crate::token::Token;

/// Errors that can occur while tokenizing tree source.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A carriage return not followed by a line feed
    BareCarriageReturn,
    /// An indentation run that is not a multiple of three spaces
    RaggedIndent(usize),
    /// A string literal with no closing quote
    UnterminatedString,
    /// A block comment with no closing `*/`
    UnterminatedBlockComment,
    /// An escape sequence the quoted-string syntax does not define
    UnknownEscape(char),
    /// A `\x` escape whose four hex digits do not name a codepoint
    BadUnicodeEscape(String),
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::BareCarriageReturn => {
                write!(f, "Carriage return must be followed by a line feed")
            }
            LexError::RaggedIndent(n) => {
                write!(f, "Indentation of {} spaces is not a multiple of 3", n)
            }
            LexError::UnterminatedString => write!(f, "String literal is never closed"),
            LexError::UnterminatedBlockComment => write!(f, "Block comment is never closed"),
            LexError::UnknownEscape(c) => write!(f, "Unknown escape sequence: \\{}", c),
            LexError::BadUnicodeEscape(s) => write!(f, "Invalid unicode escape: \\x{}", s),
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer<S: CharSource> {
    source: S,
}

impl<S: CharSource> Lexer<S> {
    pub fn new(source: S) -> Self {
        Lexer { source }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let mut buffer = String::new();

        loop {
            let Some(ch) = self.source.peek() else {
                return Ok(if buffer.is_empty() {
                    Token::Eof
                } else {
                    Token::Literal(buffer)
                });
            };

            match ch {
                ':' => {
                    if !buffer.is_empty() {
                        return Ok(Token::Literal(buffer));
                    }
                    self.source.read();
                    return Ok(Token::Colon);
                }
                '@' if buffer.is_empty() => {
                    self.source.read();
                    if self.source.peek() == Some('"') {
                        self.source.read();
                        return Ok(Token::Literal(self.read_raw_string()?));
                    }
                    // Not a raw string opener: the @ and whatever follows it
                    // are ordinary text.
                    buffer.push('@');
                    if let Some(next) = self.source.read() {
                        buffer.push(next);
                    }
                }
                '"' | '\'' => {
                    self.source.read();
                    if buffer.is_empty() {
                        return Ok(Token::Literal(self.read_quoted_string(ch)?));
                    }
                    buffer.push(ch);
                }
                '\r' => {
                    if !buffer.is_empty() {
                        return Ok(Token::Literal(buffer));
                    }
                    self.source.read();
                    if self.source.read() != Some('\n') {
                        return Err(LexError::BareCarriageReturn);
                    }
                    return Ok(Token::Newline);
                }
                '\n' => {
                    if !buffer.is_empty() {
                        return Ok(Token::Literal(buffer));
                    }
                    self.source.read();
                    return Ok(Token::Newline);
                }
                '/' => {
                    self.source.read();
                    if buffer.is_empty() {
                        match self.source.peek() {
                            Some('/') => {
                                self.source.read();
                                self.skip_line_comment();
                            }
                            Some('*') => {
                                self.source.read();
                                self.skip_block_comment()?;
                            }
                            _ => buffer.push('/'),
                        }
                    } else {
                        buffer.push('/');
                    }
                }
                ' ' => {
                    self.source.read();
                    if !buffer.is_empty() {
                        buffer.push(' ');
                        continue;
                    }
                    let mut spaces = 1;
                    while self.source.peek() == Some(' ') {
                        self.source.read();
                        spaces += 1;
                    }
                    // A ragged run right before EOF is tolerated.
                    if spaces % 3 != 0 && self.source.peek().is_some() {
                        return Err(LexError::RaggedIndent(spaces));
                    }
                    return Ok(Token::Indent(spaces));
                }
                _ => {
                    self.source.read();
                    buffer.push(ch);
                }
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.source.peek() {
            if c == '\n' {
                break;
            }
            self.source.read();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        loop {
            match self.source.read() {
                None => return Err(LexError::UnterminatedBlockComment),
                Some('*') => {
                    if self.source.peek() == Some('/') {
                        self.source.read();
                        return Ok(());
                    }
                }
                Some(_) => {}
            }
        }
    }

    // Body of an @"..." literal: a doubled quote is a literal quote, CR and
    // LF pass through verbatim.
    fn read_raw_string(&mut self) -> Result<String, LexError> {
        let mut text = String::new();
        loop {
            match self.source.read() {
                None => return Err(LexError::UnterminatedString),
                Some('"') => {
                    if self.source.peek() == Some('"') {
                        self.source.read();
                        text.push('"');
                    } else {
                        return Ok(text);
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn read_quoted_string(&mut self, delimiter: char) -> Result<String, LexError> {
        let mut text = String::new();
        loop {
            match self.source.read() {
                None | Some('\n') | Some('\r') => return Err(LexError::UnterminatedString),
                Some(c) if c == delimiter => return Ok(text),
                Some('\\') => match self.source.read() {
                    Some('\\') => text.push('\\'),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some('x') => text.push(self.read_unicode_escape()?),
                    Some(c) if c == delimiter => text.push(c),
                    Some(c) => return Err(LexError::UnknownEscape(c)),
                    None => return Err(LexError::UnterminatedString),
                },
                Some(c) => text.push(c),
            }
        }
    }

    fn read_unicode_escape(&mut self) -> Result<char, LexError> {
        let mut hex = String::new();
        for _ in 0..4 {
            match self.source.read() {
                Some(c) if c.is_ascii_hexdigit() => hex.push(c),
                Some(c) => {
                    hex.push(c);
                    return Err(LexError::BadUnicodeEscape(hex));
                }
                None => return Err(LexError::UnterminatedString),
            }
        }
        let code =
            u32::from_str_radix(&hex, 16).map_err(|_| LexError::BadUnicodeEscape(hex.clone()))?;
        char::from_u32(code).ok_or(LexError::BadUnicodeEscape(hex))
    }
}

#[test]
fn test_plain_line() {
    use crate::source::StrSource;
    let mut lexer = Lexer::new(StrSource::new("foo:bar\n"));
    assert_eq!(lexer.next_token(), Ok(Token::Literal("foo".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Colon));
    assert_eq!(lexer.next_token(), Ok(Token::Literal("bar".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Newline));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_indent_run() {
    use crate::source::StrSource;
    let mut lexer = Lexer::new(StrSource::new("foo\n   bar"));
    assert_eq!(lexer.next_token(), Ok(Token::Literal("foo".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Newline));
    assert_eq!(lexer.next_token(), Ok(Token::Indent(3)));
    assert_eq!(lexer.next_token(), Ok(Token::Literal("bar".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}
