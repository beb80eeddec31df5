//! Interactive read-eval-print loop.
//!
//! Every line runs against the same [`Evaluator`], so variables and
//! functions persist between lines. Errors are reported and the session
//! continues.

use std::io::{self, BufRead, Write};

use log::debug;

use crate::eval::Evaluator;
use crate::host::PrintSink;

pub const PROMPT: &str = "minang> ";

const HELP: &str = "\
Commands:
  .help            show this help
  .exit            leave the REPL
  .examples        show example code
  .analyze <code>  tokenize and parse <code> without running it

Example:
  buek namo = \"Minang\"
  cetak \"Halo \" + namo
  karojo jumlah(a, b) { jadi a + b }
";

const EXAMPLES: &str = "\
Declarations:
  buek namo = \"Siti\"       // var
  ambiak umua = 25         // let
  tagak batas = 18         // const

Functions:
  karojo salam(namo) { jadi \"Salamat datang \" + namo }

Conditions:
  kalau umua >= batas { cetak \"Dewasa\" } lain { cetak \"Mudo\" }

Loops:
  untuak (ambiak i = 0; i < 3; i++) { cetak i }
";

/// Outcome of one REPL line
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Exit,
}

/// Run the loop until `.exit` or end of input. Prompts and diagnostics go
/// to `out`; program output goes to the evaluator's sink.
pub fn run<R, W, S>(input: R, out: &mut W, evaluator: &mut Evaluator<S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    S: PrintSink,
{
    writeln!(out, "MinangScript REPL {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "Type .help for help, .exit to quit\n")?;

    let mut lines = input.lines();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            break;
        };
        if eval_line(line.trim(), out, evaluator)? == Step::Exit {
            break;
        }
    }
    writeln!(out, "Salamat tinggal!")?;
    Ok(())
}

fn eval_line<W, S>(line: &str, out: &mut W, evaluator: &mut Evaluator<S>) -> io::Result<Step>
where
    W: Write,
    S: PrintSink,
{
    match line {
        "" => {}
        ".exit" => return Ok(Step::Exit),
        ".help" => write!(out, "{}", HELP)?,
        ".examples" => write!(out, "{}", EXAMPLES)?,
        _ => {
            if let Some(code) = line.strip_prefix(".analyze ") {
                analyze(code, out)?;
            } else if line.starts_with('.') {
                writeln!(out, "unknown command {}, try .help", line)?;
            } else {
                debug!(target: "minang::cli", "repl line: {}", line);
                if let Err(e) = crate::run_with(line, evaluator) {
                    writeln!(out, "error: {}", e)?;
                }
            }
        }
    }
    Ok(Step::Continue)
}

fn analyze<W: Write>(code: &str, out: &mut W) -> io::Result<()> {
    let tokens = match minang_parse::tokenize(code) {
        Ok(tokens) => tokens,
        Err(e) => return writeln!(out, "error: {}", e),
    };
    // the trailing EOF token is not counted
    writeln!(out, "tokens: {}", tokens.len().saturating_sub(1))?;
    match minang_parse::parse_tokens(tokens) {
        Ok(program) => {
            let kinds: Vec<_> = program.body.iter().map(|s| s.type_name()).collect();
            writeln!(out, "statements: {} [{}]", kinds.len(), kinds.join(", "))
        }
        Err(e) => writeln!(out, "error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvalOptions;
    use crate::host::CaptureSink;

    fn session(input: &str) -> (String, CaptureSink) {
        let mut ev = Evaluator::with_sink(CaptureSink::new(), EvalOptions::default());
        let mut out = Vec::new();
        run(input.as_bytes(), &mut out, &mut ev).unwrap();
        (String::from_utf8(out).unwrap(), ev.into_sink())
    }

    #[test]
    fn state_persists_between_lines() {
        let (_, sink) = session("ambiak x = 2\nkarojo dua(n) { jadi n * x }\ncetak dua(21)\n");
        assert_eq!(sink.text(), "42\n");
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let (out, sink) = session("cetak y\ncetak 1 / 0\ncetak 5\n");
        assert!(out.contains("error: undefined variable 'y'"));
        assert!(out.contains("error: division by zero"));
        assert_eq!(sink.text(), "5\n");
    }

    #[test]
    fn exit_stops_reading() {
        let (out, sink) = session("cetak 1\n.exit\ncetak 2\n");
        assert_eq!(sink.text(), "1\n");
        assert!(out.ends_with("Salamat tinggal!\n"));
    }

    #[test]
    fn analyze_reports_tokens_and_statements() {
        let (out, sink) = session(".analyze ambiak a = 1; cetak a\n");
        assert!(out.contains("tokens: 7"));
        assert!(out.contains("statements: 2 [VariableDeclaration, PrintStatement]"));
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn unknown_command_is_reported() {
        let (out, _) = session(".nope\n");
        assert!(out.contains("unknown command .nope"));
    }
}
