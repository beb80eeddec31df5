use crate::error::UnsupportedNodeError;
use minang_ast::ast::{BinOp, Block, DeclKind, Expr, Lit, Program, Stmt};
use minang_ast::num::format_number;

type Result<T> = std::result::Result<T, UnsupportedNodeError>;

const INDENT: &str = "  ";

/// Emit JavaScript for a whole program, one top-level statement per line.
pub fn generate(program: &Program) -> Result<String> {
    let mut out = Vec::with_capacity(program.body.len());
    for stmt in &program.body {
        out.push(emit_stmt(stmt)?);
    }
    Ok(out.join("\n"))
}

fn decl_keyword(kind: DeclKind) -> &'static str {
    match kind {
        DeclKind::Var => "var",
        DeclKind::Let => "let",
        DeclKind::Const => "const",
    }
}

/// JavaScript spelling of a binary operator; equality becomes strict.
fn js_op(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "===",
        BinOp::Ne => "!==",
        other => other.as_str(),
    }
}

fn emit_stmt(stmt: &Stmt) -> Result<String> {
    let s = match stmt {
        Stmt::VariableDeclaration { kind, name, init } => match init {
            Some(e) => format!("{} {} = {};", decl_keyword(*kind), name.name, emit_top(e)?),
            None => format!("{} {};", decl_keyword(*kind), name.name),
        },
        Stmt::FunctionDeclaration { name, params, body } => {
            let params: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            format!(
                "function {}({}) {}",
                name.name,
                params.join(", "),
                emit_block(body)?
            )
        }
        Stmt::If { cond, then_, else_ } => {
            let mut s = format!("if ({}) {}", emit_expr(cond)?, emit_block(then_)?);
            if let Some(alt) = else_ {
                s.push_str(" else ");
                s.push_str(&emit_stmt(alt)?);
            }
            s
        }
        Stmt::While { cond, body } => {
            format!("while ({}) {}", emit_expr(cond)?, emit_block(body)?)
        }
        Stmt::For {
            init,
            cond,
            update,
            body,
        } => {
            let init = match init.as_deref() {
                None => String::new(),
                Some(s) => emit_for_init(s)?,
            };
            let cond = cond.as_ref().map(emit_expr).transpose()?.unwrap_or_default();
            let update = update.as_ref().map(emit_top).transpose()?.unwrap_or_default();
            format!("for ({}; {}; {}) {}", init, cond, update, emit_block(body)?)
        }
        Stmt::Return { value } => match value {
            Some(e) => format!("return {};", emit_expr(e)?),
            None => "return;".to_string(),
        },
        Stmt::Break => "break;".to_string(),
        Stmt::Continue => "continue;".to_string(),
        Stmt::Print { arg } => format!("console.log({});", emit_expr(arg)?),
        Stmt::Block(block) => emit_block(block)?,
        Stmt::Expr(e @ Expr::Object(_)) => format!("({});", emit_expr(e)?),
        Stmt::Expr(e) => format!("{};", emit_top(e)?),
    };
    Ok(s)
}

/// `for` initializers are emitted without their trailing semicolon; only
/// statement kinds with a single-clause form are accepted.
fn emit_for_init(stmt: &Stmt) -> Result<String> {
    match stmt {
        Stmt::VariableDeclaration { .. } | Stmt::Expr(_) | Stmt::Print { .. } => {
            let s = emit_stmt(stmt)?;
            Ok(s.strip_suffix(';').unwrap_or(&s).to_string())
        }
        other => Err(UnsupportedNodeError::new(other.type_name(), "for initializer")),
    }
}

fn emit_block(block: &Block) -> Result<String> {
    let mut s = String::from("{\n");
    for stmt in &block.body {
        for line in emit_stmt(stmt)?.lines() {
            s.push_str(INDENT);
            s.push_str(line);
            s.push('\n');
        }
    }
    s.push('}');
    Ok(s)
}

/// Expression in statement position: an assignment at the top stays bare
/// and chains to the right.
fn emit_top(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Assign { target, value } => Ok(format!("{} = {}", target.name, emit_top(value)?)),
        other => emit_expr(other),
    }
}

fn emit_expr(expr: &Expr) -> Result<String> {
    let s = match expr {
        Expr::Assign { target, value } => format!("({} = {})", target.name, emit_top(value)?),
        Expr::Binary { lhs, op, rhs } => {
            format!("({} {} {})", emit_expr(lhs)?, js_op(*op), emit_expr(rhs)?)
        }
        Expr::Unary { op, expr } => format!("({}{})", op.as_str(), emit_expr(expr)?),
        Expr::Call { callee, args } => {
            let args = args.iter().map(emit_expr).collect::<Result<Vec<_>>>()?;
            format!("{}({})", emit_expr(callee)?, args.join(", "))
        }
        Expr::Member { object, property } => format!("{}.{}", emit_expr(object)?, property.name),
        Expr::Ident(id) => id.name.clone(),
        Expr::Lit(lit) => emit_lit(lit),
        Expr::Array(items) => {
            let items = items.iter().map(emit_expr).collect::<Result<Vec<_>>>()?;
            format!("[{}]", items.join(", "))
        }
        Expr::Object(props) => {
            let mut parts = Vec::with_capacity(props.len());
            for p in props {
                parts.push(format!("{}: {}", quote(&p.key), emit_expr(&p.value)?));
            }
            format!("{{{}}}", parts.join(", "))
        }
    };
    Ok(s)
}

fn emit_lit(lit: &Lit) -> String {
    match lit {
        Lit::Number(n) => format_number(*n),
        Lit::Str(s) => quote(s),
        Lit::Bool(b) => b.to_string(),
        Lit::Null => "null".to_string(),
        Lit::Regex { pattern, flags } => format!("/{}/{}", pattern, flags),
    }
}

/// Double-quoted JavaScript string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
