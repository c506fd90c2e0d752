#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Accumulated name or value text.
    ///
    /// A literal is either a bare run of characters or the decoded body of
    /// a quoted string. Quoted forms arrive as a single literal even when
    /// they contain separators.
    ///
    /// # Examples
    /// ```text
    /// howdy
    /// how/dy
    /// "item: one"
    /// @"multi
    /// line"
    /// ```
    Literal(String),

    /// Separator between a name and its value, or between a type name and
    /// the typed lexeme.
    ///
    /// # Examples
    /// ```text
    /// bar:xxx
    /// bar:int:5
    /// ```
    Colon,

    /// A run of leading spaces. The payload is the raw space count; each
    /// group of three spaces is one level of depth.
    Indent(usize),

    /// Line break, normalized from `\n` or `\r\n`.
    Newline,

    /// End of input.
    Eof,
}
