use minang_parse::{parse_str, LexError, SyntaxError};

fn syntax_err(src: &str) -> SyntaxError {
    let err = parse_str("<mem>", src).unwrap_err();
    err.downcast_ref::<SyntaxError>()
        .cloned()
        .unwrap_or_else(|| panic!("expected SyntaxError, got {err}"))
}

#[test]
fn missing_closing_paren_names_found_token() {
    let err = syntax_err("cetak (1 + 2;");
    assert_eq!(err.message, "expected RPAREN");
    assert_eq!(err.found, "SEMICOLON");
    assert_eq!((err.pos.line, err.pos.column), (1, 13));
}

#[test]
fn invalid_assignment_target() {
    let err = syntax_err("1 = 2");
    assert!(err.to_string().contains("invalid assignment target"));
    let err = syntax_err("f() += 1");
    assert!(err.message.contains("invalid assignment target"));
    let err = syntax_err("ambiak a = 3++");
    assert!(err.message.contains("invalid assignment target"));
}

#[test]
fn constant_requires_initializer() {
    let err = syntax_err("tagak x\n");
    assert_eq!(err.message, "constant must be initialized");
    assert_eq!(err.found, "NEWLINE");
}

#[test]
fn reserved_word_is_not_an_identifier() {
    let err = syntax_err("ambiak nilai = 1");
    assert_eq!(err.message, "expected identifier");
    assert_eq!(err.found, "VALUE");
}

#[test]
fn unclosed_block_reports_eof() {
    let err = syntax_err("karojo f() {\n cetak 1\n");
    assert_eq!(err.found, "EOF");
}

#[test]
fn unexpected_token_in_expression() {
    let err = syntax_err("ambiak x = )");
    assert!(err
        .to_string()
        .starts_with("unexpected token in expression, found RPAREN at line 1, column 12"));
}

#[test]
fn lex_errors_pass_through_parse() {
    let err = parse_str("<mem>", "ambiak x = 1 $ 2").unwrap_err();
    let lex = err.downcast_ref::<LexError>().expect("LexError");
    assert!(matches!(lex, LexError::UnexpectedChar { ch: '$', .. }));
}
