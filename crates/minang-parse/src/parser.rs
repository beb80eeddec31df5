use crate::error::SyntaxError;
use crate::lexer::tokenize;
use crate::token::{Tok, TokKind};
use anyhow::Result;
use log::debug;
use minang_ast::ast::{BinOp, Block, DeclKind, Expr, Ident, Lit, Program, Property, Stmt, UnOp};
use minang_ast::num::format_number;

/// Statements and expressions may nest at most this deep.
pub const MAX_NESTING: u32 = 128;

pub fn parse_str(file: &str, src: &str) -> Result<Program> {
    let toks = tokenize(src)?;
    debug!(target: "minang::parse", "{}: {} tokens", file, toks.len());
    parse_tokens(toks)
}

/// Parse an already lexed stream. The stream must end with `Eof`.
pub fn parse_tokens(toks: Vec<Tok>) -> Result<Program> {
    let mut p = Parser::new(toks);
    p.parse_program()
}

struct Parser {
    toks: Vec<Tok>,
    idx: usize,
    depth: u32,
}

impl Parser {
    fn new(mut toks: Vec<Tok>) -> Self {
        if !matches!(toks.last(), Some(Tok { kind: TokKind::Eof, .. })) {
            let pos = toks.last().map(|t| t.pos).unwrap_or_default();
            toks.push(Tok {
                kind: TokKind::Eof,
                pos,
            });
        }
        Self {
            toks,
            idx: 0,
            depth: 0,
        }
    }

    fn cur(&self) -> &Tok {
        // `new` guarantees a trailing Eof and `bump` never moves past it
        &self.toks[self.idx]
    }

    fn bump(&mut self) {
        if self.idx + 1 < self.toks.len() {
            self.idx += 1;
        }
    }

    fn at(&self, k: &TokKind) -> bool {
        std::mem::discriminant(&self.cur().kind) == std::mem::discriminant(k)
    }

    fn expect(&mut self, k: TokKind) -> Result<Tok> {
        if self.at(&k) {
            let t = self.cur().clone();
            self.bump();
            Ok(t)
        } else {
            self.fail(format!("expected {}", k.name()))
        }
    }

    fn fail<T>(&self, message: impl Into<String>) -> Result<T> {
        let tok = self.cur();
        Err(SyntaxError {
            message: message.into(),
            found: tok.kind.name(),
            pos: tok.pos,
        }
        .into())
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return self.fail("nesting too deep");
        }
        self.depth += 1;
        Ok(())
    }

    fn skip_newlines(&mut self) {
        while self.at(&TokKind::Newline) {
            self.bump();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.cur().kind, TokKind::Newline | TokKind::Semicolon) {
            self.bump();
        }
    }

    // ======= program / statements =======

    fn parse_program(&mut self) -> Result<Program> {
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            if self.at(&TokKind::Eof) {
                break;
            }
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        self.enter()?;
        let stmt = self.parse_stmt_inner();
        self.depth -= 1;
        stmt
    }

    fn parse_stmt_inner(&mut self) -> Result<Stmt> {
        match self.cur().kind {
            TokKind::KwVar | TokKind::KwLet | TokKind::KwConst => self.parse_declaration(),
            TokKind::KwFunction => self.parse_function(),
            TokKind::KwIf => self.parse_if(),
            TokKind::KwWhile => self.parse_while(),
            TokKind::KwFor => self.parse_for(),
            TokKind::KwReturn => self.parse_return(),
            TokKind::KwBreak => {
                self.bump();
                Ok(Stmt::Break)
            }
            TokKind::KwContinue => {
                self.bump();
                Ok(Stmt::Continue)
            }
            TokKind::KwPrint => self.parse_print(),
            TokKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        match &self.cur().kind {
            TokKind::Ident(s) => {
                let id = Ident {
                    name: s.clone(),
                    pos: self.cur().pos,
                };
                self.bump();
                Ok(id)
            }
            _ => self.fail("expected identifier"),
        }
    }

    /// `buek|ambiak|tagak name [= expr]`
    fn parse_declaration(&mut self) -> Result<Stmt> {
        let kind = match self.cur().kind {
            TokKind::KwVar => DeclKind::Var,
            TokKind::KwLet => DeclKind::Let,
            _ => DeclKind::Const,
        };
        self.bump();
        let name = self.parse_ident()?;
        let init = if self.at(&TokKind::Assign) {
            self.bump();
            Some(self.parse_expr()?)
        } else if kind == DeclKind::Const {
            return self.fail("constant must be initialized");
        } else {
            None
        };
        Ok(Stmt::VariableDeclaration { kind, name, init })
    }

    /// `karojo name(a, b) { ... }`
    fn parse_function(&mut self) -> Result<Stmt> {
        self.expect(TokKind::KwFunction)?;
        let name = self.parse_ident()?;
        self.expect(TokKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(&TokKind::RParen) {
            params.push(self.parse_ident()?);
            while self.at(&TokKind::Comma) {
                self.bump();
                params.push(self.parse_ident()?);
            }
        }
        self.expect(TokKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDeclaration { name, params, body })
    }

    /// Parse a block: `{ stmt* }`
    fn parse_block(&mut self) -> Result<Block> {
        self.expect(TokKind::LBrace)?;
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            match self.cur().kind {
                TokKind::RBrace => break,
                TokKind::Eof => return self.fail("expected RBRACE"),
                _ => body.push(self.parse_stmt()?),
            }
        }
        self.expect(TokKind::RBrace)?;
        Ok(Block { body })
    }

    /// `kalau cond { } [lain (kalau ... | { })]`, entered on `kalau` or on
    /// `kalauLain` for the else-if chain.
    fn parse_if(&mut self) -> Result<Stmt> {
        self.bump();
        let cond = self.parse_expr()?;
        let then_ = self.parse_block()?;

        // an else clause may sit on the line after the closing brace
        let save = self.idx;
        self.skip_newlines();
        let else_ = match self.cur().kind {
            TokKind::KwElse => {
                self.bump();
                if self.at(&TokKind::KwIf) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    Some(Box::new(Stmt::Block(self.parse_block()?)))
                }
            }
            TokKind::KwElseIf => Some(Box::new(self.parse_else_if()?)),
            _ => {
                self.idx = save;
                None
            }
        };

        Ok(Stmt::If { cond, then_, else_ })
    }

    fn parse_else_if(&mut self) -> Result<Stmt> {
        self.enter()?;
        let stmt = self.parse_if();
        self.depth -= 1;
        stmt
    }

    /// `selamo cond { body }`
    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(TokKind::KwWhile)?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    /// `untuak (init; cond; update) { body }`, every clause optional.
    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(TokKind::KwFor)?;
        self.expect(TokKind::LParen)?;

        let init = if self.at(&TokKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_stmt()?))
        };
        self.expect(TokKind::Semicolon)?;

        let cond = if self.at(&TokKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokKind::Semicolon)?;

        let update = if self.at(&TokKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokKind::RParen)?;

        let body = self.parse_block()?;
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
        })
    }

    /// `jadi [expr]`
    fn parse_return(&mut self) -> Result<Stmt> {
        self.expect(TokKind::KwReturn)?;
        let value = match self.cur().kind {
            TokKind::Newline | TokKind::Semicolon | TokKind::RBrace | TokKind::Eof => None,
            _ => Some(self.parse_expr()?),
        };
        Ok(Stmt::Return { value })
    }

    /// `cetak expr` prints; `cetak.method expr` calls the builtin method.
    fn parse_print(&mut self) -> Result<Stmt> {
        let print = self.expect(TokKind::KwPrint)?;
        if !self.at(&TokKind::Dot) {
            let arg = self.parse_expr()?;
            return Ok(Stmt::Print { arg });
        }

        self.bump();
        let property = self.parse_property_name()?;
        let arg = self.parse_expr()?;
        let callee = Expr::Member {
            object: Box::new(Expr::Ident(Ident {
                name: "cetak".to_string(),
                pos: print.pos,
            })),
            property,
        };
        Ok(Stmt::Expr(Expr::Call {
            callee: Box::new(callee),
            args: vec![arg],
        }))
    }

    // ======= expressions (Pratt parser) =======
    //
    // Precedence (low -> high):
    //   assignment (right assoc, handled in parse_expr)
    //   1:  ||
    //   3:  &&
    //   5:  == !=
    //   7:  < <= > >=
    //   10: + -
    //   20: * / %
    // prefix (unary) binds tighter than all infix; we give it rbp = 100
    // call, member and postfix ++/-- bind tightest

    fn parse_expr(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.parse_assignment();
        self.depth -= 1;
        expr
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let lhs = self.parse_expr_bp(0)?;
        let op = match self.cur().kind {
            TokKind::Assign => None,
            TokKind::PlusAssign => Some(BinOp::Add),
            TokKind::MinusAssign => Some(BinOp::Sub),
            TokKind::StarAssign => Some(BinOp::Mul),
            TokKind::SlashAssign => Some(BinOp::Div),
            _ => return Ok(lhs),
        };
        let Expr::Ident(target) = lhs else {
            return self.fail("invalid assignment target");
        };
        self.bump();
        let rhs = self.parse_expr()?;
        let value = match op {
            None => rhs,
            Some(op) => Expr::Binary {
                lhs: Box::new(Expr::Ident(target.clone())),
                op,
                rhs: Box::new(rhs),
            },
        };
        Ok(Expr::Assign {
            target,
            value: Box::new(value),
        })
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, lbp, rbp) = match self.cur().kind {
                // logical
                TokKind::OrOr => (BinOp::Or, 1, 2),
                TokKind::AndAnd => (BinOp::And, 3, 4),
                // equality
                TokKind::EqEq => (BinOp::Eq, 5, 6),
                TokKind::BangEq => (BinOp::Ne, 5, 6),
                // relational
                TokKind::Lt => (BinOp::Lt, 7, 8),
                TokKind::Le => (BinOp::Le, 7, 8),
                TokKind::Gt => (BinOp::Gt, 7, 8),
                TokKind::Ge => (BinOp::Ge, 7, 8),
                // arithmetic
                TokKind::Plus => (BinOp::Add, 10, 11),
                TokKind::Minus => (BinOp::Sub, 10, 11),
                TokKind::Star => (BinOp::Mul, 20, 21),
                TokKind::Slash => (BinOp::Div, 20, 21),
                TokKind::Percent => (BinOp::Mod, 20, 21),
                _ => break,
            };

            if lbp < min_bp {
                break;
            }
            self.bump(); // consume operator
            let rhs = self.parse_expr_bp(rbp)?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        match self.cur().kind {
            TokKind::Bang | TokKind::Minus => {
                let op = if self.at(&TokKind::Bang) {
                    UnOp::Not
                } else {
                    UnOp::Neg
                };
                self.bump();
                self.enter()?;
                let inner = self.parse_expr_bp(100);
                self.depth -= 1;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(inner?),
                })
            }
            TokKind::PlusPlus | TokKind::MinusMinus => {
                let op = if self.at(&TokKind::PlusPlus) {
                    BinOp::Add
                } else {
                    BinOp::Sub
                };
                self.bump();
                let operand = self.parse_postfix()?;
                match operand {
                    Expr::Ident(target) => Ok(step(target, op)),
                    _ => self.fail("invalid assignment target"),
                }
            }
            _ => self.parse_postfix(),
        }
    }

    /// Primary followed by any number of calls and member accesses, then an
    /// optional postfix `++`/`--`.
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cur().kind {
                TokKind::LParen => {
                    let args = self.parse_call_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokKind::Dot => {
                    self.bump();
                    let property = self.parse_property_name()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                TokKind::PlusPlus | TokKind::MinusMinus => {
                    let op = if self.at(&TokKind::PlusPlus) {
                        BinOp::Add
                    } else {
                        BinOp::Sub
                    };
                    let Expr::Ident(target) = expr else {
                        return self.fail("invalid assignment target");
                    };
                    self.bump();
                    return Ok(step(target, op));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_property_name(&mut self) -> Result<Ident> {
        match &self.cur().kind {
            TokKind::Ident(_) => self.parse_ident(),
            _ => self.fail("expected property name"),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        // Snapshot current token to avoid borrow issues when bumping
        let tok = self.cur().clone();

        match tok.kind {
            TokKind::Number(v) => {
                self.bump();
                Ok(Expr::Lit(Lit::Number(v)))
            }
            TokKind::Str(s) => {
                self.bump();
                Ok(Expr::Lit(Lit::Str(s)))
            }
            TokKind::KwTrue => {
                self.bump();
                Ok(Expr::Lit(Lit::Bool(true)))
            }
            TokKind::KwFalse => {
                self.bump();
                Ok(Expr::Lit(Lit::Bool(false)))
            }
            TokKind::KwNull => {
                self.bump();
                Ok(Expr::Lit(Lit::Null))
            }
            TokKind::Regex { pattern, flags } => {
                self.bump();
                Ok(Expr::Lit(Lit::Regex { pattern, flags }))
            }
            TokKind::Ident(_) => Ok(Expr::Ident(self.parse_ident()?)),
            // `cetak` in expression position names the print builtin
            TokKind::KwPrint => {
                self.bump();
                Ok(Expr::Ident(Ident {
                    name: "cetak".to_string(),
                    pos: tok.pos,
                }))
            }
            TokKind::LParen => {
                self.bump(); // '('
                let inner = self.parse_expr()?;
                self.expect(TokKind::RParen)?;
                Ok(inner)
            }
            TokKind::TemplateString(_) | TokKind::TemplateExprStart => self.parse_template(),
            TokKind::LBracket => self.parse_array(),
            TokKind::LBrace => self.parse_object(),
            _ => self.fail("unexpected token in expression"),
        }
    }

    /// Template tokens fold into `"" + part + part ...` so both back ends see
    /// plain string concatenation.
    fn parse_template(&mut self) -> Result<Expr> {
        let mut parts = Vec::new();
        loop {
            match self.cur().kind.clone() {
                TokKind::TemplateString(s) => {
                    self.bump();
                    parts.push(Expr::Lit(Lit::Str(s)));
                    if !self.at(&TokKind::TemplateExprStart) {
                        break;
                    }
                }
                TokKind::TemplateExprStart => {
                    self.bump();
                    if self.at(&TokKind::TemplateExprEnd) {
                        self.bump();
                    } else {
                        parts.push(self.parse_expr()?);
                        self.expect(TokKind::TemplateExprEnd)?;
                    }
                    if !matches!(
                        self.cur().kind,
                        TokKind::TemplateString(_) | TokKind::TemplateExprStart
                    ) {
                        break;
                    }
                }
                _ => break,
            }
        }

        let mut parts = parts.into_iter().peekable();
        let mut acc = Expr::Lit(Lit::Str(String::new()));
        if let Some(Expr::Lit(Lit::Str(_))) = parts.peek() {
            if let Some(first) = parts.next() {
                acc = first;
            }
        }
        for part in parts {
            acc = Expr::Binary {
                lhs: Box::new(acc),
                op: BinOp::Add,
                rhs: Box::new(part),
            };
        }
        Ok(acc)
    }

    /// `[a, b, ...]`; newlines between elements are ignored.
    fn parse_array(&mut self) -> Result<Expr> {
        self.expect(TokKind::LBracket)?;
        let mut elems = Vec::new();
        self.skip_newlines();
        while !self.at(&TokKind::RBracket) {
            elems.push(self.parse_expr()?);
            self.skip_newlines();
            if !self.at(&TokKind::Comma) {
                break;
            }
            self.bump();
            self.skip_newlines();
        }
        self.expect(TokKind::RBracket)?;
        Ok(Expr::Array(elems))
    }

    /// `{ key: value, ... }` with identifier, string or number keys.
    fn parse_object(&mut self) -> Result<Expr> {
        self.expect(TokKind::LBrace)?;
        let mut props = Vec::new();
        self.skip_newlines();
        while !self.at(&TokKind::RBrace) {
            let key = match &self.cur().kind {
                TokKind::Ident(s) | TokKind::Str(s) => s.clone(),
                TokKind::Number(n) => format_number(*n),
                _ => return self.fail("expected property key"),
            };
            self.bump();
            self.expect(TokKind::Colon)?;
            let value = self.parse_expr()?;
            props.push(Property { key, value });
            self.skip_newlines();
            if !self.at(&TokKind::Comma) {
                break;
            }
            self.bump();
            self.skip_newlines();
        }
        self.expect(TokKind::RBrace)?;
        Ok(Expr::Object(props))
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokKind::LParen)?; // we are at '('
        let mut args = Vec::new();
        self.skip_newlines();
        if !self.at(&TokKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                self.skip_newlines();
                if self.at(&TokKind::Comma) {
                    self.bump();
                    self.skip_newlines();
                    continue;
                }
                break;
            }
        }
        self.expect(TokKind::RParen)?;
        Ok(args)
    }
}

/// `x++` / `--x` and friends become `x = x ± 1`.
fn step(target: Ident, op: BinOp) -> Expr {
    Expr::Assign {
        value: Box::new(Expr::Binary {
            lhs: Box::new(Expr::Ident(target.clone())),
            op,
            rhs: Box::new(Expr::Lit(Lit::Number(1.0))),
        }),
        target,
    }
}
