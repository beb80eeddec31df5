//! Evaluator for MinangScript programs
//!
//! A tree-walking interpreter over the parsed AST. Variables live in a
//! global map plus a stack of call frames; functions live in a separate
//! table keyed by name (dotted names for builtin methods such as
//! `cetak.rusak`).

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};
use minang_ast::ast::{BinOp, Block, Expr, Ident, Lit, Program, Stmt, UnOp};
use minang_ast::num::format_number;
use minang_ast::span::Pos;
use serde::{Deserialize, Serialize};

use crate::host::{self, Builtin, Channel, PrintSink, StdioSink};

/// Default limit on nested function calls
pub const DEFAULT_MAX_CALL_DEPTH: u32 = 1000;

// Remaining native stack below which evaluation moves to a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Runtime values
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Arrays and objects are shared; equality is identity
    Array(Rc<Vec<Value>>),
    Object(Rc<Vec<(String, Value)>>),
    Regex(Rc<RegexValue>),
    /// Reference to an entry in the function table
    Function(FunctionRef),
}

/// A named function table entry captured as a value. `params` is `None`
/// for builtins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub name: String,
    pub params: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexValue {
    pub pattern: String,
    pub flags: String,
}

/// Stringification follows JavaScript's `String(x)`.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    // null and undefined elements join as empty strings
                    if !matches!(item, Value::Null) {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Regex(re) => write!(f, "/{}/{}", re.pattern, re.flags),
            Value::Function(FunctionRef { name, params: None }) => {
                write!(f, "function {}() {{ [native code] }}", name)
            }
            Value::Function(FunctionRef {
                name,
                params: Some(params),
            }) => write!(f, "function {}({}) {{ ... }}", name, params.join(", ")),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Regex(_) => "regex",
            Value::Function(_) => "function",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Numeric coercion; `None` when the value has no numeric reading.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => parse_float(s),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null => Some(0.0),
            _ => None,
        }
    }

    /// Equal only when both sides have the same runtime type and value;
    /// compound values compare by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Regex(a), Value::Regex(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.name == b.name,
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Str(s) => format!("'{}'", s),
            other => other.type_name().to_string(),
        }
    }
}

/// `parseFloat`: leading whitespace skipped, longest numeric prefix taken.
pub fn parse_float(s: &str) -> Option<f64> {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if t[end..].starts_with("Infinity") {
        let inf = f64::INFINITY;
        return Some(if t.starts_with('-') { -inf } else { inf });
    }

    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    t[..end].parse().ok()
}

/// Control flow for evaluation
///
/// Used to propagate returns, breaks and continues through statement
/// sequences.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    /// Normal value result
    Value(Value),
    /// Return statement - bubbles up to function boundary
    Return(Value),
    /// Break statement - consumed by the innermost loop
    Break,
    /// Continue statement - consumed by the innermost loop
    Continue,
}

impl ControlFlow {
    /// Extract the value, treating Return as a normal value
    pub fn into_value(self) -> Value {
        match self {
            ControlFlow::Value(v) | ControlFlow::Return(v) => v,
            ControlFlow::Break | ControlFlow::Continue => Value::Null,
        }
    }

    /// Check if this is a Return
    pub fn is_return(&self) -> bool {
        matches!(self, ControlFlow::Return(_))
    }

    fn is_value(&self) -> bool {
        matches!(self, ControlFlow::Value(_))
    }
}

/// Errors raised while executing a program.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndefinedVariable { name: String, pos: Pos },
    UndefinedFunction { name: String },
    UndefinedProperty { object: String, property: String },
    /// Callee is neither an identifier nor a member expression
    NotCallable { kind: &'static str },
    Arity { name: String, expected: usize, found: usize },
    NotNumeric { value: String },
    DivisionByZero,
    CallDepth { limit: u32 },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::UndefinedVariable { name, pos } => write!(
                f,
                "undefined variable '{}' at line {}, column {}",
                name, pos.line, pos.column
            ),
            RuntimeError::UndefinedFunction { name } => {
                write!(f, "function '{}' is not defined", name)
            }
            RuntimeError::UndefinedProperty { object, property } => {
                write!(f, "property '{}' not found on '{}'", property, object)
            }
            RuntimeError::NotCallable { kind } => write!(
                f,
                "only identifiers and member expressions can be called, found {}",
                kind
            ),
            RuntimeError::Arity {
                name,
                expected,
                found,
            } => write!(
                f,
                "function '{}' expects {} argument(s), got {}",
                name, expected, found
            ),
            RuntimeError::NotNumeric { value } => {
                write!(f, "cannot convert {} to a number", value)
            }
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::CallDepth { limit } => {
                write!(f, "maximum call depth exceeded (limit: {} calls)", limit)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

type Result<T> = std::result::Result<T, RuntimeError>;

/// How names resolve inside a function body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoping {
    /// Walk every active frame, innermost first, then globals
    #[default]
    Dynamic,
    /// Innermost frame, then globals
    Lexical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    pub scoping: Scoping,
    pub max_call_depth: u32,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            scoping: Scoping::Dynamic,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Variable storage: globals plus one frame per active call.
#[derive(Debug, Default, Clone)]
pub struct Env {
    globals: HashMap<String, Value>,
    frames: Vec<HashMap<String, Value>>,
    scoping: Scoping,
}

impl Env {
    pub fn new(scoping: Scoping) -> Self {
        Self {
            scoping,
            ..Self::default()
        }
    }

    /// Look up a variable according to the scoping mode
    pub fn get(&self, name: &str) -> Option<&Value> {
        let local = match self.scoping {
            Scoping::Dynamic => self.frames.iter().rev().find_map(|f| f.get(name)),
            Scoping::Lexical => self.frames.last().and_then(|f| f.get(name)),
        };
        local.or_else(|| self.globals.get(name))
    }

    /// Write to the nearest visible frame that binds `name`, otherwise to
    /// globals.
    pub fn set(&mut self, name: &str, value: Value) {
        let slot = match self.scoping {
            Scoping::Dynamic => self
                .frames
                .iter_mut()
                .rev()
                .find_map(|f| f.get_mut(name)),
            Scoping::Lexical => self.frames.last_mut().and_then(|f| f.get_mut(name)),
        };
        match slot {
            Some(slot) => *slot = value,
            None => {
                self.globals.insert(name.to_string(), value);
            }
        }
    }

    pub fn push_frame(&mut self, frame: HashMap<String, Value>) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Number of active call frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Function table entry
#[derive(Debug, Clone)]
pub enum Function {
    Builtin(Builtin),
    User { params: Vec<String>, body: Rc<Block> },
}

/// Executes programs against one persistent environment and function
/// table. Output goes to the sink `S`.
pub struct Evaluator<S: PrintSink = StdioSink> {
    env: Env,
    functions: HashMap<String, Function>,
    sink: S,
    options: EvalOptions,
    depth: u32,
}

impl Evaluator<StdioSink> {
    pub fn new() -> Self {
        Self::with_sink(StdioSink, EvalOptions::default())
    }
}

impl Default for Evaluator<StdioSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: PrintSink> Evaluator<S> {
    pub fn with_sink(sink: S, options: EvalOptions) -> Self {
        let mut env = Env::new(options.scoping);
        for (name, value) in host::constants() {
            env.set(name, value);
        }
        let functions = host::builtins()
            .into_iter()
            .map(|(name, b)| (name.to_string(), Function::Builtin(b)))
            .collect();
        Self {
            env,
            functions,
            sink,
            options,
            depth: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Run every statement of `program` in order. The result is the value
    /// of a top-level `jadi`, else the value of the last statement.
    pub fn execute(&mut self, program: &Program) -> Result<Value> {
        debug!(
            target: "minang::eval",
            "executing {} statements ({:?} scoping)",
            program.body.len(),
            self.options.scoping
        );
        let mut result = Value::Null;
        for stmt in &program.body {
            match self.eval_stmt(stmt)? {
                ControlFlow::Return(v) => return Ok(v),
                ControlFlow::Value(v) => result = v,
                // a stray break/continue at top level ends nothing
                ControlFlow::Break | ControlFlow::Continue => {}
            }
        }
        Ok(result)
    }

    fn eval_block(&mut self, block: &Block) -> Result<ControlFlow> {
        let mut last = ControlFlow::Value(Value::Null);
        for stmt in &block.body {
            let cf = self.eval_stmt(stmt)?;
            if !cf.is_value() {
                return Ok(cf);
            }
            last = cf;
        }
        Ok(last)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<ControlFlow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_stmt_inner(stmt))
    }

    fn eval_stmt_inner(&mut self, stmt: &Stmt) -> Result<ControlFlow> {
        match stmt {
            Stmt::VariableDeclaration { name, init, .. } => {
                let v = match init {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                self.env.set(&name.name, v.clone());
                Ok(ControlFlow::Value(v))
            }

            Stmt::FunctionDeclaration { name, params, body } => {
                let func = Function::User {
                    params: params.iter().map(|p| p.name.clone()).collect(),
                    body: Rc::new(body.clone()),
                };
                // later declarations silently replace earlier ones
                self.functions.insert(name.name.clone(), func);
                Ok(ControlFlow::Value(Value::Null))
            }

            Stmt::If { cond, then_, else_ } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_block(then_)
                } else if let Some(alt) = else_ {
                    self.eval_stmt(alt)
                } else {
                    Ok(ControlFlow::Value(Value::Null))
                }
            }

            Stmt::While { cond, body } => self.eval_while(cond, body),

            Stmt::For {
                init,
                cond,
                update,
                body,
            } => self.eval_for(init.as_deref(), cond.as_ref(), update.as_ref(), body),

            Stmt::Return { value } => {
                let v = match value {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(v))
            }

            Stmt::Break => Ok(ControlFlow::Break),
            Stmt::Continue => Ok(ControlFlow::Continue),

            Stmt::Print { arg } => {
                let v = self.eval_expr(arg)?;
                self.sink.emit(Channel::Log, &v.to_string());
                Ok(ControlFlow::Value(v))
            }

            Stmt::Block(block) => self.eval_block(block),

            Stmt::Expr(e) => Ok(ControlFlow::Value(self.eval_expr(e)?)),
        }
    }

    fn eval_while(&mut self, cond: &Expr, body: &Block) -> Result<ControlFlow> {
        let mut last = Value::Null;
        while self.eval_expr(cond)?.is_truthy() {
            match self.eval_block(body)? {
                ControlFlow::Break => break,
                ControlFlow::Continue => continue,
                ControlFlow::Return(v) => return Ok(ControlFlow::Return(v)),
                ControlFlow::Value(v) => last = v,
            }
        }
        Ok(ControlFlow::Value(last))
    }

    fn eval_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        update: Option<&Expr>,
        body: &Block,
    ) -> Result<ControlFlow> {
        if let Some(init) = init {
            let cf = self.eval_stmt(init)?;
            if cf.is_return() {
                return Ok(cf);
            }
        }

        let mut last = Value::Null;
        loop {
            if let Some(cond) = cond {
                if !self.eval_expr(cond)?.is_truthy() {
                    break;
                }
            }
            match self.eval_block(body)? {
                ControlFlow::Break => break,
                ControlFlow::Return(v) => return Ok(ControlFlow::Return(v)),
                // continue still runs the update clause
                ControlFlow::Continue => {}
                ControlFlow::Value(v) => last = v,
            }
            if let Some(update) = update {
                self.eval_expr(update)?;
            }
        }
        Ok(ControlFlow::Value(last))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Lit(lit) => Ok(match lit {
                Lit::Number(n) => Value::Number(*n),
                Lit::Str(s) => Value::Str(s.clone()),
                Lit::Bool(b) => Value::Bool(*b),
                Lit::Null => Value::Null,
                Lit::Regex { pattern, flags } => Value::Regex(Rc::new(RegexValue {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                })),
            }),

            Expr::Ident(id) => self.lookup(id),

            Expr::Assign { target, value } => {
                let v = self.eval_expr(value)?;
                self.env.set(&target.name, v.clone());
                Ok(v)
            }

            Expr::Binary { lhs, op, rhs } => {
                // both operands are always evaluated, `&&`/`||` included
                let l = self.eval_expr(lhs)?;
                let r = self.eval_expr(rhs)?;
                eval_binary(*op, &l, &r)
            }

            Expr::Unary { op, expr } => {
                let v = self.eval_expr(expr)?;
                match op {
                    UnOp::Neg => Ok(Value::Number(-to_number(&v)?)),
                    UnOp::Not => Ok(Value::Bool(!v.is_truthy())),
                }
            }

            Expr::Call { callee, args } => self.eval_call(callee, args),

            Expr::Member { object, property } => self.resolve_member(object, property),

            Expr::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_expr(item)?);
                }
                Ok(Value::Array(Rc::new(out)))
            }

            Expr::Object(props) => {
                let mut out: Vec<(String, Value)> = Vec::with_capacity(props.len());
                for prop in props {
                    let v = self.eval_expr(&prop.value)?;
                    match out.iter_mut().find(|(k, _)| *k == prop.key) {
                        Some(slot) => slot.1 = v,
                        None => out.push((prop.key.clone(), v)),
                    }
                }
                Ok(Value::Object(Rc::new(out)))
            }
        }
    }

    /// Variables first; a bare function name evaluates to a reference to it.
    fn lookup(&self, id: &Ident) -> Result<Value> {
        if let Some(v) = self.env.get(&id.name) {
            return Ok(v.clone());
        }
        if let Some(func) = self.function_ref(&id.name) {
            return Ok(Value::Function(func));
        }
        Err(RuntimeError::UndefinedVariable {
            name: id.name.clone(),
            pos: id.pos,
        })
    }

    /// `object.property` resolves only against the function table.
    fn resolve_member(&self, object: &Expr, property: &Ident) -> Result<Value> {
        if let Expr::Ident(obj) = object {
            let dotted = format!("{}.{}", obj.name, property.name);
            if let Some(func) = self.function_ref(&dotted) {
                return Ok(Value::Function(func));
            }
            // unknown methods of a known builtin fail when called
            if self.functions.contains_key(&obj.name) {
                return Ok(Value::Function(FunctionRef {
                    name: dotted,
                    params: None,
                }));
            }
            return Err(RuntimeError::UndefinedProperty {
                object: obj.name.clone(),
                property: property.name.clone(),
            });
        }
        Err(RuntimeError::UndefinedProperty {
            object: object.type_name().to_string(),
            property: property.name.clone(),
        })
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }

        let name = match callee {
            Expr::Ident(id) if self.functions.contains_key(&id.name) => id.name.clone(),
            Expr::Ident(id) => match self.env.get(&id.name) {
                Some(Value::Function(target)) => target.name.clone(),
                _ => {
                    return Err(RuntimeError::UndefinedFunction {
                        name: id.name.clone(),
                    })
                }
            },
            Expr::Member { object, property } => match self.resolve_member(object, property)? {
                Value::Function(target) => target.name,
                other => {
                    return Err(RuntimeError::NotCallable {
                        kind: other.type_name(),
                    })
                }
            },
            other => {
                return Err(RuntimeError::NotCallable {
                    kind: other.type_name(),
                })
            }
        };

        self.call_function(&name, values)
    }

    fn function_ref(&self, name: &str) -> Option<FunctionRef> {
        let params = match self.functions.get(name)? {
            Function::Builtin(_) => None,
            Function::User { params, .. } => Some(params.clone()),
        };
        Some(FunctionRef {
            name: name.to_string(),
            params,
        })
    }

    /// Invoke a function table entry with depth tracking.
    pub fn call_function(&mut self, name: &str, args: Vec<Value>) -> Result<Value> {
        let func = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
            })?;

        if self.depth >= self.options.max_call_depth {
            return Err(RuntimeError::CallDepth {
                limit: self.options.max_call_depth,
            });
        }

        self.depth += 1;
        let result = self.invoke(name, func, args);
        self.depth -= 1;
        result
    }

    fn invoke(&mut self, name: &str, func: Function, args: Vec<Value>) -> Result<Value> {
        match func {
            Function::Builtin(b) => {
                check_arity(name, b.arity, args.len())?;
                Ok((b.call)(&args, &mut self.sink))
            }
            Function::User { params, body } => {
                check_arity(name, params.len(), args.len())?;
                trace!(target: "minang::eval", "call {} (depth {})", name, self.depth);

                let frame = params.into_iter().zip(args).collect();
                self.env.push_frame(frame);
                let result = self.eval_block(&body);
                // frame is popped on error too
                self.env.pop_frame();

                Ok(match result? {
                    ControlFlow::Return(v) => v,
                    _ => Value::Null,
                })
            }
        }
    }
}

fn check_arity(name: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(RuntimeError::Arity {
            name: name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn to_number(v: &Value) -> Result<f64> {
    v.to_number().ok_or_else(|| RuntimeError::NotNumeric {
        value: v.describe(),
    })
}

fn eval_binary(op: BinOp, l: &Value, r: &Value) -> Result<Value> {
    use BinOp::*;
    let v = match op {
        Add => match (l, r) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            _ => Value::Str(format!("{}{}", l, r)),
        },
        Sub => Value::Number(to_number(l)? - to_number(r)?),
        Mul => Value::Number(to_number(l)? * to_number(r)?),
        Div => {
            let d = to_number(r)?;
            if d == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Value::Number(to_number(l)? / d)
        }
        Mod => Value::Number(to_number(l)? % to_number(r)?),
        Eq => Value::Bool(l.strict_eq(r)),
        Ne => Value::Bool(!l.strict_eq(r)),
        Lt => Value::Bool(to_number(l)? < to_number(r)?),
        Gt => Value::Bool(to_number(l)? > to_number(r)?),
        Le => Value::Bool(to_number(l)? <= to_number(r)?),
        Ge => Value::Bool(to_number(l)? >= to_number(r)?),
        And => Value::Bool(l.is_truthy() && r.is_truthy()),
        Or => Value::Bool(l.is_truthy() || r.is_truthy()),
    };
    Ok(v)
}
