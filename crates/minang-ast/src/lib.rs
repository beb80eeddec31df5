pub mod span {
    use serde::Serialize;

    /// 1-based source position.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct Pos {
        pub line: u32,
        pub column: u32,
    }

    impl Pos {
        pub fn new(line: u32, column: u32) -> Self {
            Self { line, column }
        }
    }

    impl std::fmt::Display for Pos {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

pub mod num {
    /// Render a number the way JavaScript's `String(n)` does.
    ///
    /// Both back ends rely on this: the evaluator when stringifying values and
    /// the code generator when emitting numeric literals.
    pub fn format_number(n: f64) -> String {
        if n.is_nan() {
            return "NaN".to_string();
        }
        if n.is_infinite() {
            return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
        }
        if n == 0.0 {
            // covers -0 as well
            return "0".to_string();
        }
        let abs = n.abs();
        if (1e-6..1e21).contains(&abs) {
            return format!("{}", n);
        }
        let s = format!("{:e}", n);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    }

}

pub mod ast {
    use super::span::Pos;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    pub struct Program {
        pub body: Vec<Stmt>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Block {
        pub body: Vec<Stmt>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Ident {
        pub name: String,
        pub pos: Pos,
    }

    /// `buek` / `ambiak` / `tagak`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum DeclKind {
        Var,
        Let,
        Const,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Stmt {
        VariableDeclaration {
            kind: DeclKind,
            name: Ident,
            init: Option<Expr>,
        },
        FunctionDeclaration {
            name: Ident,
            params: Vec<Ident>,
            body: Block,
        },
        If {
            cond: Expr,
            then_: Block,
            // either another `Stmt::If` or a `Stmt::Block`
            else_: Option<Box<Stmt>>,
        },
        While {
            cond: Expr,
            body: Block,
        },
        For {
            init: Option<Box<Stmt>>,
            cond: Option<Expr>,
            update: Option<Expr>,
            body: Block,
        },
        Return {
            value: Option<Expr>,
        },
        Break,
        Continue,
        Print {
            arg: Expr,
        },
        Block(Block),
        Expr(Expr),
    }

    impl Stmt {
        pub fn type_name(&self) -> &'static str {
            match self {
                Stmt::VariableDeclaration { .. } => "VariableDeclaration",
                Stmt::FunctionDeclaration { .. } => "FunctionDeclaration",
                Stmt::If { .. } => "IfStatement",
                Stmt::While { .. } => "WhileStatement",
                Stmt::For { .. } => "ForStatement",
                Stmt::Return { .. } => "ReturnStatement",
                Stmt::Break => "BreakStatement",
                Stmt::Continue => "ContinueStatement",
                Stmt::Print { .. } => "PrintStatement",
                Stmt::Block(_) => "BlockStatement",
                Stmt::Expr(_) => "ExpressionStatement",
            }
        }
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Expr {
        Assign {
            target: Ident,
            value: Box<Expr>,
        },
        Binary {
            lhs: Box<Expr>,
            op: BinOp,
            rhs: Box<Expr>,
        },
        Unary {
            op: UnOp,
            expr: Box<Expr>,
        },
        Call {
            callee: Box<Expr>,
            args: Vec<Expr>,
        },
        Member {
            object: Box<Expr>,
            property: Ident,
        },
        Ident(Ident),
        Lit(Lit),
        Array(Vec<Expr>),
        Object(Vec<Property>),
    }

    impl Expr {
        pub fn type_name(&self) -> &'static str {
            match self {
                Expr::Assign { .. } => "AssignmentExpression",
                Expr::Binary { .. } => "BinaryExpression",
                Expr::Unary { .. } => "UnaryExpression",
                Expr::Call { .. } => "CallExpression",
                Expr::Member { .. } => "MemberExpression",
                Expr::Ident(_) => "Identifier",
                Expr::Lit(_) => "Literal",
                Expr::Array(_) => "ArrayExpression",
                Expr::Object(_) => "ObjectExpression",
            }
        }
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Property {
        pub key: String,
        pub value: Expr,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum UnOp {
        Not,
        Neg,
    }

    impl UnOp {
        pub fn as_str(self) -> &'static str {
            match self {
                UnOp::Not => "!",
                UnOp::Neg => "-",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub enum Lit {
        Number(f64),
        Str(String),
        Bool(bool),
        Null,
        Regex { pattern: String, flags: String },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum BinOp {
        // logical
        Or,
        And,
        // equality
        Eq,
        Ne,
        // relational
        Lt,
        Le,
        Gt,
        Ge,
        // arithmetic
        Add,
        Sub,
        Mul,
        Div,
        Mod,
    }

    impl BinOp {
        /// Source spelling of the operator.
        pub fn as_str(self) -> &'static str {
            match self {
                BinOp::Or => "||",
                BinOp::And => "&&",
                BinOp::Eq => "==",
                BinOp::Ne => "!=",
                BinOp::Lt => "<",
                BinOp::Le => "<=",
                BinOp::Gt => ">",
                BinOp::Ge => ">=",
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
                BinOp::Mod => "%",
            }
        }
    }
}
