use minang_ast::ast::{DeclKind, Expr, Stmt};
use minang_parse::parse_str;

fn parse(src: &str) -> Vec<Stmt> {
    parse_str("<mem>", src).unwrap().body
}

#[test]
fn semicolons_and_newlines_both_separate() {
    let body = parse("ambiak x = 10; ambiak y = 3; cetak x % y;");
    assert_eq!(body.len(), 3);
    let body = parse("\n\nbuek a = 1\n\ntagak b = 2\n");
    assert_eq!(body.len(), 2);
    assert!(matches!(
        body[1],
        Stmt::VariableDeclaration {
            kind: DeclKind::Const,
            ..
        }
    ));
}

#[test]
fn declaration_without_initializer() {
    let body = parse("ambiak x");
    assert!(matches!(
        &body[0],
        Stmt::VariableDeclaration { kind: DeclKind::Let, name, init: None } if name.name == "x"
    ));
}

#[test]
fn function_declaration_params_and_body() {
    let body = parse("karojo tambahkan(a, b) {\n  jadi a + b\n}");
    let Stmt::FunctionDeclaration { name, params, body } = &body[0] else {
        panic!("expected function");
    };
    assert_eq!(name.name, "tambahkan");
    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert!(matches!(body.body[0], Stmt::Return { value: Some(_) }));
}

#[test]
fn bare_return_before_newline_or_brace() {
    let body = parse("karojo f() { jadi }\nkarojo g() {\n jadi\n 5\n}");
    let Stmt::FunctionDeclaration { body: f, .. } = &body[0] else {
        panic!("expected function");
    };
    assert!(matches!(f.body[0], Stmt::Return { value: None }));
    let Stmt::FunctionDeclaration { body: g, .. } = &body[1] else {
        panic!("expected function");
    };
    assert_eq!(g.body.len(), 2);
    assert!(matches!(g.body[0], Stmt::Return { value: None }));
}

#[test]
fn else_if_chains() {
    let src = "kalau x > 5 {\n cetak 1\n}\nlain kalau x > 2 {\n cetak 2\n} kalauLain x > 0 {\n cetak 3\n} lain {\n cetak 4\n}";
    let body = parse(src);
    assert_eq!(body.len(), 1);
    let Stmt::If { else_: Some(e1), .. } = &body[0] else {
        panic!("expected if with else");
    };
    let Stmt::If { else_: Some(e2), .. } = e1.as_ref() else {
        panic!("expected else-if");
    };
    let Stmt::If { else_: Some(e3), .. } = e2.as_ref() else {
        panic!("expected kalauLain");
    };
    assert!(matches!(e3.as_ref(), Stmt::Block(_)));
}

#[test]
fn if_without_else_leaves_following_statement_alone() {
    let body = parse("kalau bana { }\ncetak 1");
    assert_eq!(body.len(), 2);
    assert!(matches!(body[0], Stmt::If { else_: None, .. }));
    assert!(matches!(body[1], Stmt::Print { .. }));
}

#[test]
fn for_loop_clauses() {
    let body = parse("untuak (ambiak i = 0; i < 3; i++) { cetak i }");
    let Stmt::For {
        init,
        cond,
        update,
        body,
    } = &body[0]
    else {
        panic!("expected for");
    };
    assert!(matches!(init.as_deref(), Some(Stmt::VariableDeclaration { .. })));
    assert!(cond.is_some());
    assert!(matches!(update, Some(Expr::Assign { .. })));
    assert_eq!(body.body.len(), 1);

    let body = parse("untuak (;;) { baronti }");
    assert!(matches!(
        &body[0],
        Stmt::For { init: None, cond: None, update: None, .. }
    ));
}

#[test]
fn while_with_break_and_continue() {
    let body = parse("selamo bana {\n lanjuik\n baronti\n}");
    let Stmt::While { body, .. } = &body[0] else {
        panic!("expected while");
    };
    assert!(matches!(body.body[..], [Stmt::Continue, Stmt::Break]));
}

#[test]
fn print_method_becomes_builtin_call() {
    let body = parse("cetak.rusak \"gagal\"");
    let Stmt::Expr(Expr::Call { callee, args }) = &body[0] else {
        panic!("expected call statement");
    };
    assert_eq!(args.len(), 1);
    let Expr::Member { object, property } = callee.as_ref() else {
        panic!("expected member callee");
    };
    assert!(matches!(object.as_ref(), Expr::Ident(id) if id.name == "cetak"));
    assert_eq!(property.name, "rusak");
}

#[test]
fn plain_print_statement() {
    let body = parse("cetak \"Halo\" + 1");
    assert!(matches!(&body[0], Stmt::Print { arg: Expr::Binary { .. } }));
    assert_eq!(body[0].type_name(), "PrintStatement");
}

#[test]
fn nested_block_statement() {
    let body = parse("{ ambiak a = 1 { cetak a } }");
    let Stmt::Block(outer) = &body[0] else {
        panic!("expected block");
    };
    assert_eq!(outer.body.len(), 2);
    assert!(matches!(outer.body[1], Stmt::Block(_)));
}

#[test]
fn identifiers_carry_positions() {
    let body = parse("\n  ambiak nilai2 = 1");
    let Stmt::VariableDeclaration { name, .. } = &body[0] else {
        panic!("expected declaration");
    };
    assert_eq!((name.pos.line, name.pos.column), (2, 10));
}
