use minang_ast::span::Pos;

/// Lexing failures.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// No token rule matches this character
    UnexpectedChar { ch: char, pos: Pos },
    /// A radix prefix (`0x`, `0b`, `0o`) with no digits after it
    MalformedNumber { text: String, pos: Pos },
}

impl LexError {
    pub fn pos(&self) -> Pos {
        match self {
            LexError::UnexpectedChar { pos, .. } | LexError::MalformedNumber { pos, .. } => *pos,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedChar { ch, pos } => write!(
                f,
                "unexpected character '{}' at line {}, column {}",
                ch, pos.line, pos.column
            ),
            LexError::MalformedNumber { text, pos } => write!(
                f,
                "malformed number literal '{}' at line {}, column {}",
                text, pos.line, pos.column
            ),
        }
    }
}

impl std::error::Error for LexError {}

/// Parse failure at a specific token.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    /// Kind name of the offending token, e.g. `SEMICOLON`
    pub found: &'static str,
    pub pos: Pos,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, found {} at line {}, column {}",
            self.message, self.found, self.pos.line, self.pos.column
        )
    }
}

impl std::error::Error for SyntaxError {}
