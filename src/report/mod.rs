//! Error vocabulary, error logs and report helpers.

pub mod codes;
mod log;

pub use codes::ErrorCode;
pub use log::{index_label, ErrorLog, FaceRecord, ShellPairRecord};

/// Escapes text for inclusion in XML element content.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
