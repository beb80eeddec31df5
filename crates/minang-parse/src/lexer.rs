use crate::error::LexError;
use crate::token::{keyword, one_char, two_char_op, Tok, TokKind};
use log::trace;
use minang_ast::span::Pos;

/// Tokenize a whole source buffer. The result always ends with `Eof`.
///
/// Template interpolations re-enter this function on the substring between
/// `${` and the matching `}`; the lexer keeps no state outside the call.
pub fn tokenize(src: &str) -> Result<Vec<Tok>, LexError> {
    let mut lex = Lexer::new(src);
    lex.run()?;
    trace!(target: "minang::parse", "lexed {} tokens", lex.toks.len());
    Ok(lex.toks)
}

struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    toks: Vec<Tok>,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Self {
            src: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            toks: Vec::new(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.src.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn push(&mut self, kind: TokKind, pos: Pos) {
        self.toks.push(Tok { kind, pos });
    }

    fn run(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek() {
            let start = self.here();
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    self.push(TokKind::Newline, start);
                }
                '/' if self.peek2() == Some('/') => self.skip_line_comment(),
                '/' if self.peek2() == Some('*') => self.skip_block_comment(),
                '"' | '\'' => self.lex_string(c, start),
                '`' => self.lex_template(start)?,
                '0' if matches!(self.peek2(), Some('x' | 'X')) => self.lex_radix(16, start)?,
                '0' if matches!(self.peek2(), Some('b' | 'B')) => self.lex_radix(2, start)?,
                '0' if matches!(self.peek2(), Some('o' | 'O')) => self.lex_radix(8, start)?,
                c if c.is_ascii_digit() => self.lex_decimal(start),
                _ => self.lex_symbol_or_word(c, start)?,
            }
        }
        let end = self.here();
        self.push(TokKind::Eof, end);
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        self.bump();
        self.bump();
        while let Some(c) = self.bump() {
            if c == '*' && self.peek() == Some('/') {
                self.bump();
                return;
            }
        }
    }

    /// `"..."` or `'...'`; an unterminated literal runs to end of input.
    fn lex_string(&mut self, quote: char, start: Pos) {
        self.bump();
        let mut s = String::new();
        while let Some(c) = self.bump() {
            if c == quote {
                break;
            }
            if c == '\\' {
                let Some(esc) = self.bump() else {
                    break;
                };
                s.push(match esc {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            } else {
                s.push(c);
            }
        }
        self.push(TokKind::Str(s), start);
    }

    fn lex_template(&mut self, start: Pos) -> Result<(), LexError> {
        self.bump();
        let mut text = String::new();
        let mut text_start = start;

        loop {
            match self.peek() {
                None => break,
                Some('`') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    if let Some(esc) = self.bump() {
                        text.push(match esc {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                    }
                }
                Some('$') if self.peek2() == Some('{') => {
                    if !text.is_empty() {
                        let fragment = std::mem::take(&mut text);
                        self.push(TokKind::TemplateString(fragment), text_start);
                    }
                    let marker = self.here();
                    self.bump();
                    self.bump();
                    self.push(TokKind::TemplateExprStart, marker);
                    self.lex_interpolation()?;
                    text_start = self.here();
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }

        self.push(TokKind::TemplateString(text), text_start);
        Ok(())
    }

    /// Scan to the `}` closing the current `${`, tracking nested braces, and
    /// splice the recursively lexed tokens of the enclosed text.
    fn lex_interpolation(&mut self) -> Result<(), LexError> {
        let base = self.here();
        let mut depth = 1u32;
        let mut inner = String::new();
        while let Some(c) = self.peek() {
            if c == '{' {
                depth += 1;
            } else if c == '}' {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            inner.push(c);
            self.bump();
        }
        let end = self.here();
        self.bump();

        if !inner.trim().is_empty() {
            let toks = tokenize(&inner).map_err(|e| shift_error(e, base))?;
            for tok in toks {
                if tok.kind == TokKind::Eof {
                    continue;
                }
                self.toks.push(Tok {
                    kind: tok.kind,
                    pos: shift(tok.pos, base),
                });
            }
        }
        self.push(TokKind::TemplateExprEnd, end);
        Ok(())
    }

    fn lex_radix(&mut self, radix: u32, start: Pos) -> Result<(), LexError> {
        let zero = self.bump();
        let prefix = self.bump();
        let mut value = 0f64;
        let mut digits = 0usize;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(radix)) {
            value = value * radix as f64 + d as f64;
            digits += 1;
            self.bump();
        }
        if digits == 0 {
            let text = [zero, prefix].iter().flatten().collect();
            return Err(LexError::MalformedNumber { text, pos: start });
        }
        self.push(TokKind::Number(value), start);
        Ok(())
    }

    /// Decimal or scientific literal: one `.` (before any exponent) and one
    /// exponent marker with an optional sign.
    fn lex_decimal(&mut self, start: Pos) {
        let mut text = String::new();
        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else if c == '.' && !seen_dot && !seen_exp {
                seen_dot = true;
                text.push(c);
                self.bump();
            } else if (c == 'e' || c == 'E') && !seen_exp {
                seen_exp = true;
                text.push(c);
                self.bump();
                if let Some(sign @ ('+' | '-')) = self.peek() {
                    text.push(sign);
                    self.bump();
                }
            } else {
                break;
            }
        }
        self.push(TokKind::Number(parse_float_prefix(&text)), start);
    }

    fn lex_symbol_or_word(&mut self, c: char, start: Pos) -> Result<(), LexError> {
        if let Some(kind) = self.peek2().and_then(|n| two_char_op(c, n)) {
            self.bump();
            self.bump();
            self.push(kind, start);
            return Ok(());
        }

        if c == '/' && self.regex_allowed() {
            self.lex_regex(start);
            return Ok(());
        }

        if let Some(kind) = one_char(c) {
            self.bump();
            self.push(kind, start);
            return Ok(());
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut word = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    word.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = keyword(&word).unwrap_or(TokKind::Ident(word));
            self.push(kind, start);
            return Ok(());
        }

        Err(LexError::UnexpectedChar { ch: c, pos: start })
    }

    /// The only context-sensitive rule: `/` opens a regex after an
    /// assignment, `(`, `,`, `[`, `jadi`, `:`, `==`, `!=` or at stream start.
    fn regex_allowed(&self) -> bool {
        self.toks.last().map_or(true, |t| t.kind.permits_regex())
    }

    fn lex_regex(&mut self, start: Pos) {
        self.bump();
        let mut pattern = String::new();
        while let Some(c) = self.bump() {
            if c == '/' {
                break;
            }
            pattern.push(c);
            if c == '\\' {
                if let Some(escaped) = self.bump() {
                    pattern.push(escaped);
                }
            }
        }
        let mut flags = String::new();
        while let Some(f @ ('g' | 'i' | 'm' | 'u' | 'y')) = self.peek() {
            flags.push(f);
            self.bump();
        }
        self.push(TokKind::Regex { pattern, flags }, start);
    }
}

/// `parseFloat` on the scanned text: a dangling exponent (`1e`, `2e+`) is
/// ignored rather than rejected.
fn parse_float_prefix(text: &str) -> f64 {
    if let Ok(v) = text.parse() {
        return v;
    }
    let mantissa = text.split(['e', 'E']).next().unwrap_or_default();
    mantissa.parse().unwrap_or(0.0)
}

/// Move a position reported by a nested lexer to the outer source.
fn shift(pos: Pos, base: Pos) -> Pos {
    if pos.line == 1 {
        Pos::new(base.line, base.column + pos.column - 1)
    } else {
        Pos::new(base.line + pos.line - 1, pos.column)
    }
}

fn shift_error(err: LexError, base: Pos) -> LexError {
    match err {
        LexError::UnexpectedChar { ch, pos } => LexError::UnexpectedChar {
            ch,
            pos: shift(pos, base),
        },
        LexError::MalformedNumber { text, pos } => LexError::MalformedNumber {
            text,
            pos: shift(pos, base),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn dangling_exponent_is_ignored() {
        assert_eq!(parse_float_prefix("1e"), 1.0);
        assert_eq!(parse_float_prefix("2.5e+"), 2.5);
        assert_eq!(parse_float_prefix("3."), 3.0);
    }

    #[test]
    fn positions_are_one_based() {
        let toks = tokenize("ambiak x\n  = 1").unwrap();
        assert_eq!(toks[0].pos, Pos::new(1, 1));
        assert_eq!(toks[1].pos, Pos::new(1, 8));
        assert_eq!(toks[2].kind, TokKind::Newline);
        assert_eq!(toks[3].pos, Pos::new(2, 3));
        assert_eq!(toks[4].pos, Pos::new(2, 5));
    }

    #[test]
    fn interpolation_positions_point_into_outer_source() {
        let toks = tokenize("cetak `a${b}`").unwrap();
        let ident = toks
            .iter()
            .find(|t| t.kind == TokKind::Ident("b".into()))
            .unwrap();
        assert_eq!(ident.pos, Pos::new(1, 11));
    }

    #[test]
    fn unterminated_block_comment_consumes_rest() {
        assert_eq!(kinds("1 /* abc"), vec![TokKind::Number(1.0), TokKind::Eof]);
    }
}
