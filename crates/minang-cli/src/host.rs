//! Print sinks and the builtin function library.
//!
//! Program output never goes straight to stdout: every builtin writes
//! through a [`PrintSink`], so the evaluator can be embedded or tested
//! without touching the process streams.

use std::rc::Rc;

use log::debug;

use crate::eval::Value;

/// Output channel of a print, mirroring the console methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Log,
    Info,
    Debug,
    Warn,
    Error,
    Table,
}

/// Destination for program output.
pub trait PrintSink {
    fn emit(&mut self, channel: Channel, text: &str);
}

impl<T: PrintSink + ?Sized> PrintSink for &mut T {
    fn emit(&mut self, channel: Channel, text: &str) {
        (**self).emit(channel, text)
    }
}

/// Writes warnings and errors to stderr, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl PrintSink for StdioSink {
    fn emit(&mut self, channel: Channel, text: &str) {
        match channel {
            Channel::Warn | Channel::Error => eprintln!("{}", text),
            Channel::Log | Channel::Info | Channel::Debug | Channel::Table => println!("{}", text),
        }
    }
}

/// Keeps every emitted line in memory.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    pub lines: Vec<(Channel, String)>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured output, one emitted line per line.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (_, line) in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Lines written to a single channel.
    pub fn channel(&self, channel: Channel) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, l)| l.as_str())
            .collect()
    }
}

impl PrintSink for CaptureSink {
    fn emit(&mut self, channel: Channel, text: &str) {
        self.lines.push((channel, text.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Builtins
// ---------------------------------------------------------------------------

/// Signature of a native function. Arity is checked by the caller.
pub type BuiltinFn = fn(&[Value], &mut dyn PrintSink) -> Value;

#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub arity: usize,
    pub call: BuiltinFn,
}

/// Every builtin function, keyed by the name used to call it. Dotted names
/// are reached through member calls (`cetak.rusak "..."`).
pub fn builtins() -> Vec<(&'static str, Builtin)> {
    fn b(arity: usize, call: BuiltinFn) -> Builtin {
        Builtin { arity, call }
    }
    vec![
        ("cetak", b(1, print_log)),
        ("tampilkan", b(1, print_log)),
        ("cetak.rusak", b(1, print_error)),
        ("cetak.ingek", b(1, print_remind)),
        ("cetak.urai", b(1, print_debug)),
        ("cetak.pesan", b(1, print_info)),
        ("cetak.peringatan", b(1, print_warning)),
        ("cetak.tabel", b(1, print_table)),
        ("jsonKe", b(1, json_stringify)),
        ("jsonDari", b(1, json_parse)),
        ("kirimPost", b(2, fetch_unavailable)),
        ("simpan", b(2, storage_set_unavailable)),
        ("ambil", b(1, storage_get_unavailable)),
        ("tungguDetik", b(2, timer_unavailable)),
        ("ulangi", b(2, timer_unavailable)),
    ]
}

/// Global constants defined before a program runs.
pub fn constants() -> [(&'static str, Value); 2] {
    [
        ("PI", Value::Number(std::f64::consts::PI)),
        ("EULER", Value::Number(std::f64::consts::E)),
    ]
}

fn joined(args: &[Value]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn prefixed(prefix: &str, args: &[Value]) -> String {
    format!("{} {}", prefix, joined(args))
}

fn print_log(args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Log, &joined(args));
    Value::Null
}

fn print_error(args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Error, &prefixed("❌ RUSAK:", args));
    Value::Null
}

fn print_remind(args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Warn, &prefixed("⚠️ INGEK:", args));
    Value::Null
}

fn print_debug(args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Debug, &prefixed("🔍 URAI:", args));
    Value::Null
}

fn print_info(args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Info, &prefixed("📝 PESAN:", args));
    Value::Null
}

fn print_warning(args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Warn, &prefixed("⚠️ PERINGATAN:", args));
    Value::Null
}

fn print_table(args: &[Value], out: &mut dyn PrintSink) -> Value {
    match args.first() {
        Some(v @ (Value::Array(_) | Value::Object(_))) => {
            out.emit(Channel::Table, &render_table(v));
        }
        _ => out.emit(Channel::Log, &joined(args)),
    }
    Value::Null
}

fn json_stringify(args: &[Value], _out: &mut dyn PrintSink) -> Value {
    match args.first().and_then(to_json) {
        Some(json) => Value::Str(json.to_string()),
        None => Value::Null,
    }
}

fn json_parse(args: &[Value], out: &mut dyn PrintSink) -> Value {
    let text = args.first().map(|a| a.to_string()).unwrap_or_default();
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => from_json(json),
        Err(e) => {
            out.emit(Channel::Error, &format!("❌ JSON parse error: {}", e));
            Value::Null
        }
    }
}

fn fetch_unavailable(_args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Warn, "⚠️ Fetch API not available");
    Value::Null
}

fn storage_set_unavailable(_args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Warn, "⚠️ LocalStorage not available");
    Value::Bool(false)
}

fn storage_get_unavailable(_args: &[Value], out: &mut dyn PrintSink) -> Value {
    out.emit(Channel::Warn, "⚠️ LocalStorage not available");
    Value::Null
}

fn timer_unavailable(_args: &[Value], out: &mut dyn PrintSink) -> Value {
    debug!(target: "minang::eval", "timer builtin called without an event loop");
    out.emit(Channel::Warn, "⚠️ Timer functions not available");
    Value::Null
}

// ---------------------------------------------------------------------------
// JSON conversion
// ---------------------------------------------------------------------------

/// `JSON.stringify` view of a value. `None` where JavaScript yields
/// `undefined` (functions).
fn to_json(v: &Value) -> Option<serde_json::Value> {
    use serde_json::Value as J;
    let json = match v {
        Value::Null => J::Null,
        Value::Bool(b) => J::Bool(*b),
        Value::Number(n) => number_to_json(*n),
        Value::Str(s) => J::String(s.clone()),
        Value::Array(items) => J::Array(
            items
                .iter()
                .map(|i| to_json(i).unwrap_or(J::Null))
                .collect(),
        ),
        Value::Object(props) => J::Object(
            props
                .iter()
                .filter_map(|(k, v)| to_json(v).map(|j| (k.clone(), j)))
                .collect(),
        ),
        Value::Regex(_) => J::Object(serde_json::Map::new()),
        Value::Function(_) => return None,
    };
    Some(json)
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    // integral values print without a fraction, as in JavaScript
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn from_json(json: serde_json::Value) -> Value {
    use serde_json::Value as J;
    match json {
        J::Null => Value::Null,
        J::Bool(b) => Value::Bool(b),
        J::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        J::String(s) => Value::Str(s),
        J::Array(items) => Value::Array(Rc::new(items.into_iter().map(from_json).collect())),
        J::Object(map) => Value::Object(Rc::new(
            map.into_iter().map(|(k, v)| (k, from_json(v))).collect(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

enum Row<'a> {
    Scalar(&'a Value),
    Fields(&'a [(String, Value)]),
}

/// Box-drawn table in the layout of `console.table`: an `(index)` column,
/// one column per property seen in any row, and a `Values` column for
/// rows that are not objects.
pub fn render_table(data: &Value) -> String {
    let rows: Vec<(String, Row)> = match data {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), row_of(v)))
            .collect(),
        Value::Object(props) => props.iter().map(|(k, v)| (k.clone(), row_of(v))).collect(),
        other => vec![(String::from("0"), Row::Scalar(other))],
    };

    let mut columns: Vec<&str> = Vec::new();
    let mut has_values = false;
    for (_, row) in &rows {
        match row {
            Row::Fields(fields) => {
                for (k, _) in fields.iter() {
                    if !columns.contains(&k.as_str()) {
                        columns.push(k);
                    }
                }
            }
            Row::Scalar(_) => has_values = true,
        }
    }

    let mut header = vec![String::from("(index)")];
    header.extend(columns.iter().map(|c| c.to_string()));
    if has_values {
        header.push(String::from("Values"));
    }

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|(index, row)| {
            let mut cells = vec![index.clone()];
            for col in &columns {
                let cell = match row {
                    Row::Fields(fields) => fields
                        .iter()
                        .find(|(k, _)| k == col)
                        .map(|(_, v)| table_cell(v))
                        .unwrap_or_default(),
                    Row::Scalar(_) => String::new(),
                };
                cells.push(cell);
            }
            if has_values {
                cells.push(match row {
                    Row::Scalar(v) => table_cell(v),
                    Row::Fields(_) => String::new(),
                });
            }
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            std::iter::once(&header)
                .chain(body.iter())
                .map(|r| r[i].chars().count())
                .max()
                .unwrap_or(0)
                + 2
        })
        .collect();

    let mut out = String::new();
    out.push_str(&rule('┌', '┬', '┐', &widths));
    out.push_str(&line(&header, &widths));
    out.push_str(&rule('├', '┼', '┤', &widths));
    for cells in &body {
        out.push_str(&line(cells, &widths));
    }
    out.push_str(rule('└', '┴', '┘', &widths).trim_end());
    out
}

fn row_of(v: &Value) -> Row<'_> {
    match v {
        Value::Object(fields) => Row::Fields(fields),
        other => Row::Scalar(other),
    }
}

fn table_cell(v: &Value) -> String {
    match v {
        Value::Str(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}

fn rule(left: char, mid: char, right: char, widths: &[usize]) -> String {
    let parts: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    format!("{}{}{}\n", left, parts.join(&mid.to_string()), right)
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::from("│");
    for (cell, w) in cells.iter().zip(widths) {
        let len = cell.chars().count();
        let left = (w - len) / 2;
        let right = w - len - left;
        out.push_str(&" ".repeat(left));
        out.push_str(cell);
        out.push_str(&" ".repeat(right));
        out.push('│');
    }
    out.push('\n');
    out
}
