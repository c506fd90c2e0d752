use crate::lexer::{LexError, Lexer};
use crate::node::Node;
use crate::source::{CharSource, StrSource};
use crate::token::Token;
use crate::types::{self, TypeError};
use crate::value::Value;

/// Errors that can occur during parsing
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Tokenizer error
    Lex(LexError),
    /// Typed-value error
    Type(TypeError),
    /// A line indented more than one level past its predecessor
    DepthJump { name: String, depth: usize, max: usize },
    /// Unexpected token
    UnexpectedToken { expected: &'static str, got: Token },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::Type(e) => write!(f, "{}", e),
            ParseError::DepthJump { name, depth, max } => write!(
                f,
                "Node '{}' sits at depth {} but nothing is open deeper than {}",
                name, depth, max
            ),
            ParseError::UnexpectedToken { expected, got } => {
                write!(f, "Expected {}, got {:?}", expected, got)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

impl From<TypeError> for ParseError {
    fn from(e: TypeError) -> Self {
        ParseError::Type(e)
    }
}

/// Parse a complete document from a string.
pub fn parse_str(input: &str) -> Result<Node, ParseError> {
    Parser::new(Lexer::new(StrSource::new(input)))?.parse()
}

pub struct Parser<S: CharSource> {
    lexer: Lexer<S>,
    current: Token,
}

impl<S: CharSource> Parser<S> {
    pub fn new(mut lexer: Lexer<S>) -> Result<Self, ParseError> {
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Parse the whole token stream into a tree.
    ///
    /// The returned node is a synthetic, empty-named root; the document's
    /// top-level nodes are its children. The ancestry scope at each depth
    /// is the most recent node parsed at that depth, so a line may only
    /// deepen the tree by one level at a time.
    pub fn parse(&mut self) -> Result<Node, ParseError> {
        let root = Node::new("");
        let mut scopes = vec![root.clone()];

        loop {
            match &self.current {
                Token::Eof => break,
                Token::Newline => {
                    self.advance()?;
                    continue;
                }
                _ => {}
            }

            let mut depth = 1;
            if let Token::Indent(spaces) = self.current {
                depth = spaces / 3 + 1;
                self.advance()?;
                // Nothing after the indentation: a blank line.
                match self.current {
                    Token::Newline => {
                        self.advance()?;
                        continue;
                    }
                    Token::Eof => break,
                    _ => {}
                }
            }

            let node = self.parse_line()?;
            if depth > scopes.len() {
                return Err(ParseError::DepthJump {
                    name: node.name(),
                    depth,
                    max: scopes.len(),
                });
            }
            scopes[depth - 1].push(node.clone());
            scopes.truncate(depth);
            scopes.push(node);
        }

        Ok(root)
    }

    fn parse_line(&mut self) -> Result<Node, ParseError> {
        let node = match &self.current {
            Token::Literal(_) => {
                let Token::Literal(name) = std::mem::replace(&mut self.current, Token::Eof) else {
                    unreachable!()
                };
                self.advance()?;
                Node::new(name)
            }
            // A line starting with a colon names the empty string.
            Token::Colon => Node::new(""),
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "node name",
                    got: self.current.clone(),
                })
            }
        };

        if matches!(self.current, Token::Colon) {
            self.advance()?;
            node.set_value(Some(self.parse_value()?));
        }

        match &self.current {
            Token::Newline => self.advance()?,
            Token::Eof => {}
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "end of line",
                    got: self.current.clone(),
                })
            }
        }

        Ok(node)
    }

    // The value after a name's colon: a lexeme, or type:lexeme with the
    // type resolved through the registry.
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Literal(first) => {
                self.advance()?;
                if !matches!(self.current, Token::Colon) {
                    return Ok(Value::Str(first));
                }
                self.advance()?;
                match std::mem::replace(&mut self.current, Token::Eof) {
                    Token::Literal(lexeme) => {
                        self.advance()?;
                        Ok(types::parse_typed(&first, &lexeme)?)
                    }
                    got => Err(ParseError::UnexpectedToken {
                        expected: "typed value",
                        got,
                    }),
                }
            }
            // A trailing colon with nothing after it is the empty string.
            token @ (Token::Newline | Token::Eof) => {
                self.current = token;
                Ok(Value::Str(String::new()))
            }
            got => Err(ParseError::UnexpectedToken {
                expected: "node value",
                got,
            }),
        }
    }
}
