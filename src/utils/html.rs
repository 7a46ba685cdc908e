/// Escapes text for interpolation into an HTML mail body.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes and keeps line breaks of free-text comments.
pub fn escape_multiline(input: &str) -> String {
    escape(input).replace('\n', "<br>")
}
