use minang_ast::ast::{BinOp, Expr, Lit, Stmt, UnOp};
use minang_parse::parse_str;

fn val(m: &str) -> Expr {
    let program = parse_str("<mem>", &format!("ambiak v = {m}")).unwrap();
    let Stmt::VariableDeclaration { init: Some(e), .. } = &program.body[0] else {
        panic!("expected declaration with initializer");
    };
    e.clone()
}

#[test]
fn arithmetic_relational_equality_logical_layers() {
    // 1 + 2*3 == 7 && 4 < 5 || 0 == 1
    let e = val("1 + 2*3 == 7 && 4 < 5 || 0 == 1");
    if let Expr::Binary {
        op: BinOp::Or,
        lhs,
        rhs,
    } = e
    {
        assert!(matches!(*lhs, Expr::Binary { op: BinOp::And, .. }));
        assert!(matches!(*rhs, Expr::Binary { op: BinOp::Eq, .. }));
    } else {
        panic!("top should be Or");
    }
}

#[test]
fn binary_levels_are_left_associative() {
    let e = val("10 - 4 - 3");
    let Expr::Binary {
        op: BinOp::Sub,
        lhs,
        rhs,
    } = e
    else {
        panic!("top should be Sub");
    };
    assert!(matches!(*lhs, Expr::Binary { op: BinOp::Sub, .. }));
    assert!(matches!(*rhs, Expr::Lit(Lit::Number(n)) if n == 3.0));
}

#[test]
fn modulo_binds_like_multiplication() {
    let e = val("1 + 7 % 4");
    let Expr::Binary { op: BinOp::Add, rhs, .. } = e else {
        panic!("top should be Add");
    };
    assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mod, .. }));
}

#[test]
fn unary_binds_tighter_than_binary() {
    let e = val("-a * !b");
    let Expr::Binary {
        op: BinOp::Mul,
        lhs,
        rhs,
    } = e
    else {
        panic!("top should be Mul");
    };
    assert!(matches!(*lhs, Expr::Unary { op: UnOp::Neg, .. }));
    assert!(matches!(*rhs, Expr::Unary { op: UnOp::Not, .. }));
}

#[test]
fn parentheses_regroup() {
    let e = val("(1 + 2) * 3");
    let Expr::Binary { op: BinOp::Mul, lhs, .. } = e else {
        panic!("top should be Mul");
    };
    assert!(matches!(*lhs, Expr::Binary { op: BinOp::Add, .. }));
}

#[test]
fn assignment_is_right_associative() {
    let e = val("a = b = 3");
    let Expr::Assign { target, value } = e else {
        panic!("expected assignment");
    };
    assert_eq!(target.name, "a");
    assert!(matches!(*value, Expr::Assign { ref target, .. } if target.name == "b"));
}

#[test]
fn compound_assignment_desugars() {
    let e = val("x += 2");
    let Expr::Assign { target, value } = e else {
        panic!("expected assignment");
    };
    assert_eq!(target.name, "x");
    let Expr::Binary { lhs, op, rhs } = *value else {
        panic!("expected binary value");
    };
    assert_eq!(op, BinOp::Add);
    assert!(matches!(*lhs, Expr::Ident(ref id) if id.name == "x"));
    assert!(matches!(*rhs, Expr::Lit(Lit::Number(n)) if n == 2.0));
}

#[test]
fn increments_desugar_to_step_assignment() {
    for src in ["i++", "++i"] {
        let Expr::Assign { target, value } = val(src) else {
            panic!("{src}: expected assignment");
        };
        assert_eq!(target.name, "i");
        assert!(matches!(*value, Expr::Binary { op: BinOp::Add, .. }));
    }
    let Expr::Assign { value, .. } = val("i--") else {
        panic!("expected assignment");
    };
    assert!(matches!(*value, Expr::Binary { op: BinOp::Sub, .. }));
}

#[test]
fn calls_and_members_chain() {
    let e = val("a.b(1, 2)(3)");
    let Expr::Call { callee, args } = e else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    let Expr::Call { callee, args } = *callee else {
        panic!("expected inner call");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(*callee, Expr::Member { ref property, .. } if property.name == "b"));
}

#[test]
fn print_keyword_in_expression_position_is_identifier() {
    let e = val("cetak");
    assert!(matches!(e, Expr::Ident(ref id) if id.name == "cetak"));
}

#[test]
fn template_literal_becomes_concatenation() {
    let e = val("`Hello ${name}!`");
    // ("Hello " + name) + "!"
    let Expr::Binary {
        op: BinOp::Add,
        lhs,
        rhs,
    } = e
    else {
        panic!("expected concatenation");
    };
    assert!(matches!(*rhs, Expr::Lit(Lit::Str(ref s)) if s == "!"));
    let Expr::Binary { lhs, rhs, .. } = *lhs else {
        panic!("expected inner concatenation");
    };
    assert!(matches!(*lhs, Expr::Lit(Lit::Str(ref s)) if s == "Hello "));
    assert!(matches!(*rhs, Expr::Ident(ref id) if id.name == "name"));
}

#[test]
fn template_starting_with_interpolation_gets_empty_prefix() {
    let e = val("`${n}`");
    let Expr::Binary { lhs, .. } = e else {
        panic!("expected concatenation");
    };
    let Expr::Binary { lhs, rhs, .. } = *lhs else {
        panic!("expected inner concatenation");
    };
    assert!(matches!(*lhs, Expr::Lit(Lit::Str(ref s)) if s.is_empty()));
    assert!(matches!(*rhs, Expr::Ident(_)));
}

#[test]
fn array_and_object_literals() {
    let e = val("[1, \"dua\",\n bana]");
    let Expr::Array(items) = e else {
        panic!("expected array");
    };
    assert_eq!(items.len(), 3);

    let e = val("{ namo: \"Budi\", \"umua\": 30,\n 1: kosong }");
    let Expr::Object(props) = e else {
        panic!("expected object");
    };
    let keys: Vec<_> = props.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, ["namo", "umua", "1"]);
    assert!(matches!(props[2].value, Expr::Lit(Lit::Null)));
}

#[test]
fn regex_literal_value() {
    let e = val("/a+b/gi");
    assert_eq!(
        e.type_name(),
        "Literal",
    );
    assert!(matches!(e, Expr::Lit(Lit::Regex { ref pattern, ref flags }) if pattern == "a+b" && flags == "gi"));
}
