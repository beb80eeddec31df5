//! End-to-end evaluation of MinangScript programs through the library
//! facade, with output captured in memory.

use minang_cli::{
    execute, parse, run_source, CaptureSink, Channel, EvalOptions, RuntimeError, Scoping, Value,
};

fn output_of(src: &str) -> String {
    let mut sink = CaptureSink::new();
    run_source(src, &mut sink, EvalOptions::default()).unwrap();
    sink.text()
}

fn error_of(src: &str) -> RuntimeError {
    let program = parse(src).unwrap();
    execute(&program, CaptureSink::new(), EvalOptions::default()).unwrap_err()
}

#[test]
fn modulo_program_prints_one() {
    assert_eq!(output_of("ambiak x = 10; ambiak y = 3; cetak x % y;"), "1\n");
}

#[test]
fn program_value_is_last_statement() {
    let v = run_source("1 + 2", CaptureSink::new(), EvalOptions::default()).unwrap();
    assert!(matches!(v, Value::Number(n) if n == 3.0));
    let v = run_source("\"a\" + 1", CaptureSink::new(), EvalOptions::default()).unwrap();
    assert!(matches!(v, Value::Str(ref s) if s == "a1"));
}

#[test]
fn recursive_fibonacci() {
    let src = r#"
karojo fib(n) {
    kalau n < 2 {
        jadi n
    }
    jadi fib(n - 1) + fib(n - 2)
}
untuak (ambiak i = 0; i < 8; i++) {
    tampilkan(fib(i))
}
"#;
    assert_eq!(output_of(src), "0\n1\n1\n2\n3\n5\n8\n13\n");
}

#[test]
fn arity_mismatch_names_counts() {
    let err = error_of("karojo jumlah(a, b) { jadi a + b }\njumlah(1)");
    assert_eq!(
        err,
        RuntimeError::Arity {
            name: "jumlah".into(),
            expected: 2,
            found: 1
        }
    );
    assert_eq!(
        err.to_string(),
        "function 'jumlah' expects 2 argument(s), got 1"
    );
    assert!(matches!(
        error_of("tampilkan(1, 2)"),
        RuntimeError::Arity { expected: 1, found: 2, .. }
    ));
}

#[test]
fn division_by_zero_through_coercion() {
    assert_eq!(error_of("cetak 5 / \"0\""), RuntimeError::DivisionByZero);
    assert_eq!(error_of("cetak 5 / salah"), RuntimeError::DivisionByZero);
}

#[test]
fn loops_with_break_and_continue() {
    let src = r#"
ambiak total = 0
untuak (ambiak i = 0; i < 10; i++) {
    kalau i % 2 == 1 { lanjuik }
    kalau i > 6 { baronti }
    total += i
}
cetak total
ambiak n = 0
selamo bana {
    n++
    kalau n == 3 { baronti }
}
cetak n
"#;
    // 0 + 2 + 4 + 6
    assert_eq!(output_of(src), "12\n3\n");
}

#[test]
fn return_inside_loop_leaves_function() {
    let src = r#"
karojo akar(batas) {
    ambiak i = 0
    selamo bana {
        kalau i * i > batas { jadi i }
        i++
    }
}
cetak akar(50)
"#;
    assert_eq!(output_of(src), "8\n");
}

#[test]
fn else_if_chain_picks_first_match() {
    let src = r#"
karojo mutu(x) {
    kalau x >= 80 { jadi "A" } kalauLain x >= 60 { jadi "B" } lain { jadi "C" }
}
cetak mutu(90) + mutu(70) + mutu(10)
"#;
    assert_eq!(output_of(src), "ABC\n");
}

#[test]
fn stringification_follows_javascript() {
    let src = r#"
cetak 0.1 + 0.2
cetak [1, kosong, "a", [2, 3]]
cetak { a: 1 }
cetak 1 / 3 * 3 == 1
cetak "n=" + 1e21
cetak `x=${2 * 3}!`
"#;
    assert_eq!(
        output_of(src),
        "0.30000000000000004\n1,,a,2,3\n[object Object]\ntrue\nn=1e+21\nx=6!\n"
    );
}

#[test]
fn equality_is_strict() {
    let src = r#"
cetak 1 == "1"
cetak kosong == kosong
ambiak a = [1]
ambiak b = a
cetak a == b
cetak a == [1]
cetak "x" != "y"
"#;
    assert_eq!(output_of(src), "false\ntrue\ntrue\nfalse\ntrue\n");
}

#[test]
fn logical_operators_yield_booleans() {
    assert_eq!(output_of("cetak 1 && \"a\"\ncetak 0 || \"\"\ncetak !0"), "true\nfalse\ntrue\n");
}

#[test]
fn print_methods_use_their_channels() {
    let mut sink = CaptureSink::new();
    run_source(
        r#"
cetak.rusak "gagal"
cetak.ingek "ingek"
cetak.urai 42
cetak.pesan "info"
cetak.peringatan "awas"
"#,
        &mut sink,
        EvalOptions::default(),
    )
    .unwrap();
    assert_eq!(sink.channel(Channel::Error), vec!["❌ RUSAK: gagal"]);
    assert_eq!(
        sink.channel(Channel::Warn),
        vec!["⚠️ INGEK: ingek", "⚠️ PERINGATAN: awas"]
    );
    assert_eq!(sink.channel(Channel::Debug), vec!["🔍 URAI: 42"]);
    assert_eq!(sink.channel(Channel::Info), vec!["📝 PESAN: info"]);
}

#[test]
fn json_builtins_round_trip_objects() {
    let src = r#"
ambiak teks = jsonKe({ namo: "Budi", umua: 30, hobi: ["baca", "lari"] })
cetak teks
ambiak data = jsonDari("[1, 2.5, null]")
cetak data
"#;
    assert_eq!(
        output_of(src),
        "{\"hobi\":[\"baca\",\"lari\"],\"namo\":\"Budi\",\"umua\":30}\n1,2.5,\n"
    );
}

#[test]
fn headless_builtins_warn() {
    let mut sink = CaptureSink::new();
    let v = run_source("simpan(\"k\", 1)", &mut sink, EvalOptions::default()).unwrap();
    assert!(matches!(v, Value::Bool(false)));
    run_source("ambil(\"k\")\ntungguDetik(1, 2)", &mut sink, EvalOptions::default()).unwrap();
    assert_eq!(
        sink.channel(Channel::Warn),
        vec![
            "⚠️ LocalStorage not available",
            "⚠️ LocalStorage not available",
            "⚠️ Timer functions not available"
        ]
    );
}

#[test]
fn table_builtin_renders_box() {
    let mut sink = CaptureSink::new();
    run_source(
        "cetak.tabel([{ namo: \"Budi\" }])",
        &mut sink,
        EvalOptions::default(),
    )
    .unwrap();
    let tables = sink.channel(Channel::Table);
    assert_eq!(tables.len(), 1);
    assert!(tables[0].starts_with('┌'));
    assert!(tables[0].contains("'Budi'"));
}

#[test]
fn constants_are_defined() {
    assert_eq!(output_of("cetak PI > 3.14 && PI < 3.15\ncetak EULER > 2.7"), "true\ntrue\n");
}

#[test]
fn later_function_declaration_wins() {
    let src = "karojo f() { jadi 1 }\nkarojo f() { jadi 2 }\ncetak f()";
    assert_eq!(output_of(src), "2\n");
}

#[test]
fn declarations_inside_functions_stay_global() {
    let src = "karojo set() { ambiak g = 5 }\nset()\ncetak g";
    assert_eq!(output_of(src), "5\n");
}

#[test]
fn scoping_modes_differ_for_caller_params() {
    let src = "karojo baco() { jadi p }\nkarojo panggia(p) { jadi baco() }\ncetak panggia(\"ado\")";
    assert_eq!(output_of(src), "ado\n");

    let lexical = EvalOptions {
        scoping: Scoping::Lexical,
        ..EvalOptions::default()
    };
    let program = parse(src).unwrap();
    let err = execute(&program, CaptureSink::new(), lexical).unwrap_err();
    assert!(matches!(err, RuntimeError::UndefinedVariable { ref name, .. } if name == "p"));
}

#[test]
fn recursion_shares_parameter_names_safely() {
    let src = r#"
karojo genap(n) { kalau n == 0 { jadi bana } jadi ganjil(n - 1) }
karojo ganjil(n) { kalau n == 0 { jadi salah } jadi genap(n - 1) }
cetak genap(10)
cetak ganjil(7)
"#;
    assert_eq!(output_of(src), "true\ntrue\n");
}

#[test]
fn call_depth_is_limited() {
    let options = EvalOptions {
        max_call_depth: 50,
        ..EvalOptions::default()
    };
    let program = parse("karojo f(n) { jadi f(n + 1) }\nf(0)").unwrap();
    let err = execute(&program, CaptureSink::new(), options).unwrap_err();
    assert_eq!(err, RuntimeError::CallDepth { limit: 50 });
    assert_eq!(
        err.to_string(),
        "maximum call depth exceeded (limit: 50 calls)"
    );
}

#[test]
fn undefined_function_and_syntax_errors() {
    assert_eq!(
        error_of("tidakAdo(1)"),
        RuntimeError::UndefinedFunction {
            name: "tidakAdo".into()
        }
    );
    let err = run_source("cetak (1", CaptureSink::new(), EvalOptions::default()).unwrap_err();
    assert!(err.downcast_ref::<minang_parse::SyntaxError>().is_some());
}

#[test]
fn deep_recursion_runs_on_a_default_thread() {
    let src = "karojo turun(n) { kalau n == 0 { jadi 0 } jadi 1 + turun(n - 1) }\ncetak turun(900)";
    assert_eq!(output_of(src), "900\n");
}

#[test]
fn default_depth_limit_reports_instead_of_overflowing() {
    let err = error_of("karojo turun(n) { jadi 1 + turun(n + 1) }\nturun(0)");
    assert_eq!(err, RuntimeError::CallDepth { limit: 1000 });
}

// Booleans and null print as `true`/`false`/`null`, not as the
// `bana`/`salah`/`kosong` keywords they are written with.
#[test]
fn literals_print_in_javascript_form() {
    assert_eq!(
        output_of("cetak bana\ncetak salah\ncetak kosong\ncetak [bana, kosong]"),
        "true\nfalse\nnull\ntrue,\n"
    );
}
