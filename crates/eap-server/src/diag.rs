//! Rendering of peer-supplied bytes for logs.

use std::fmt::Write;

/// Escape `data` into printable ASCII.
///
/// Printable characters pass through, quote and backslash are backslash
/// escaped, common control characters use their C escapes and everything
/// else becomes `\xNN`.
pub fn escape(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &byte in data {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x1b => out.push_str("\\e"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{byte:02x}");
            },
        }
    }
    out
}
