// Small HTML helpers shared by the built-in themes.

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns an escaped href, or `#` for schemes a profile should not inject
/// (`javascript:`, `data:`, `vbscript:`).
pub fn safe_href(url: &str) -> String {
    // browsers drop tabs and newlines anywhere in a URL, and control
    // characters around it, before looking at the scheme
    let cleaned: String = url
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let trimmed = cleaned.trim_matches(|c: char| c.is_whitespace() || c.is_control());
    let scheme = trimmed
        .split_once(':')
        .map(|(scheme, _)| scheme)
        .filter(|scheme| {
            scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
        .map(str::to_ascii_lowercase);

    match scheme.as_deref() {
        Some("http" | "https" | "mailto" | "tel") | None => escape_html(trimmed),
        Some(_) => "#".to_string(),
    }
}

/// `<tag class="class">inner</tag>`; empty when `inner` is empty.
pub fn element(tag: &str, class: &str, inner: &str) -> String {
    if inner.is_empty() {
        return String::new();
    }
    if class.is_empty() {
        format!("<{tag}>{inner}</{tag}>")
    } else {
        format!("<{tag} class=\"{class}\">{inner}</{tag}>")
    }
}

/// Like [`element`] but escapes `text` first.
pub fn text_element(tag: &str, class: &str, text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => element(tag, class, &escape_html(t)),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b class="x">Tom & Jerry's</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn test_safe_href_blocks_script_schemes() {
        assert_eq!(safe_href("https://example.com/?a=1&b=2"), "https://example.com/?a=1&amp;b=2");
        assert_eq!(safe_href("mailto:ada@example.com"), "mailto:ada@example.com");
        assert_eq!(safe_href("/relative/path"), "/relative/path");
        assert_eq!(safe_href("  JavaScript:alert(1)"), "#");
        assert_eq!(safe_href("data:text/html,hi"), "#");
        assert_eq!(safe_href("java\nscript:alert(1)"), "#");
        assert_eq!(safe_href("\tjava\tscript:alert(1)"), "#");
        assert_eq!(safe_href("\u{1}javascript:alert(1)"), "#");
        assert_eq!(safe_href("https://exa\nmple.com"), "https://example.com");
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        assert_eq!(text_element("p", "summary", None), "");
        assert_eq!(text_element("p", "summary", Some("   ")), "");
        assert_eq!(text_element("p", "", Some("hi")), "<p>hi</p>");
    }
}
