use crate::emit::generate;
use crate::error::UnsupportedNodeError;
use minang_ast::ast::Program;

pub const DEFAULT_MODULE_NAME: &str = "MinangModule";

/// JavaScript definitions for the builtins the evaluator provides, so that
/// generated code runs standalone under Node or in a browser.
pub const RUNTIME_PRELUDE: &str = r#"// MinangScript Runtime Helpers
const cetak = function (...args) { console.log(...args); };
cetak.rusak = function (...args) { console.error('❌ RUSAK:', ...args); };
cetak.ingek = function (...args) { console.warn('⚠️ INGEK:', ...args); };
cetak.urai = function (...args) { console.debug('🔍 URAI:', ...args); };
cetak.pesan = function (...args) { console.info('📝 PESAN:', ...args); };
cetak.peringatan = function (...args) { console.warn('⚠️ PERINGATAN:', ...args); };
cetak.tabel = function (data) { console.table(data); };
const tampilkan = function (...args) { console.log(...args); };

const PI = Math.PI;
const EULER = Math.E;

const jsonKe = function (value) {
    try {
        return JSON.stringify(value);
    } catch (error) {
        console.error('❌ JSON stringify error:', error.message);
        return null;
    }
};
const jsonDari = function (text) {
    try {
        return JSON.parse(String(text));
    } catch (error) {
        console.error('❌ JSON parse error:', error.message);
        return null;
    }
};

const kirimPost = async function (url, data) {
    if (typeof fetch === 'undefined') {
        console.warn('⚠️ Fetch API not available');
        return null;
    }
    try {
        const response = await fetch(String(url), {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify(data)
        });
        return await response.json();
    } catch (error) {
        console.error('❌ POST error:', error.message);
        return null;
    }
};
const simpan = function (key, value) {
    if (typeof localStorage === 'undefined') {
        console.warn('⚠️ LocalStorage not available');
        return false;
    }
    localStorage.setItem(String(key), String(value));
    return true;
};
const ambil = function (key) {
    if (typeof localStorage === 'undefined') {
        console.warn('⚠️ LocalStorage not available');
        return null;
    }
    return localStorage.getItem(String(key));
};
const tungguDetik = function (callback, delay) {
    if (typeof setTimeout === 'undefined') {
        console.warn('⚠️ Timer functions not available');
        return null;
    }
    return setTimeout(callback, delay * 1000);
};
const ulangi = function (callback, interval) {
    if (typeof setInterval === 'undefined') {
        console.warn('⚠️ Timer functions not available');
        return null;
    }
    return setInterval(callback, interval * 1000);
};

const MinangRuntime = {
    // collaborative processing
    gotongRoyong: function (tasks, callback) {
        return Promise.all(tasks.map(task =>
            typeof task === 'function' ? task() : task
        )).then(callback);
    },

    // majority vote across voters
    musyawarah: function (options, voters) {
        const votes = voters.map(voter => voter(options));
        const consensus = votes.reduce((acc, vote) => {
            acc[vote] = (acc[vote] || 0) + 1;
            return acc;
        }, {});
        return Object.keys(consensus).reduce((a, b) =>
            consensus[a] > consensus[b] ? a : b
        );
    },

    // filter by predicate or substring
    alamTakambang: function (data, pattern) {
        return data.filter(item =>
            typeof pattern === 'function' ? pattern(item) : item.includes(pattern)
        );
    }
};
"#;

/// Wrap generated code in a strict-mode IIFE with a provenance header.
pub fn generate_module(program: &Program, name: &str) -> Result<String, UnsupportedNodeError> {
    let code = generate(program)?;
    let mut out = format!(
        "// Generated from MinangScript\n// Module: {}\n\n(function() {{\n    'use strict';\n\n",
        name
    );
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str("    ");
            out.push_str(line);
        }
        out.push('\n');
    }
    out.push_str("\n})();\n");
    Ok(out)
}

/// Prepend the runtime helper library to the generated code.
pub fn generate_with_runtime(program: &Program) -> Result<String, UnsupportedNodeError> {
    let code = generate(program)?;
    Ok(format!(
        "{}\n// Generated MinangScript Code\n{}\n",
        RUNTIME_PRELUDE, code
    ))
}
