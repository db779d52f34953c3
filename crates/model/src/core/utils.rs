use std::fmt::Write;

/// Renders a Unicode string literal, doubling every embedded single quote.
pub fn quote_nstring(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 3);
    out.push_str("N'");
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\''); // double the quote
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Hex form accepted for binary columns, e.g. `0x00ff`.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + 2 * bytes.len());
    out.push_str("0x");
    for b in bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
