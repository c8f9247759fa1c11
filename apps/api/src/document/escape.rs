/// Escapes LaTeX special characters in user text.
/// Strings without special characters come back unchanged.
pub fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaping for the URL argument of `\href`, where hyperref reads the
/// text verbatim except for these characters.
pub fn escape_latex_url(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '#' | '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Scheme of `url` in lowercase, ignoring the whitespace and control
/// characters browsers drop while parsing. `None` for relative URLs.
fn url_scheme(url: &str) -> Option<String> {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let end = cleaned.find([':', '/', '?', '#'])?;
    cleaned[end..]
        .starts_with(':')
        .then(|| cleaned[..end].to_ascii_lowercase())
}

/// Link target safe to place in `href`: http, https, mailto or relative.
pub fn safe_link_url(url: &str) -> Option<&str> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match url_scheme(url).as_deref() {
        None | Some("http" | "https" | "mailto") => Some(url),
        Some(_) => None,
    }
}

/// Image source safe to place in `src`: http, https, relative or an inline
/// `data:image/` payload.
pub fn safe_image_url(url: &str) -> Option<&str> {
    let url = url.trim();
    match url_scheme(url).as_deref() {
        Some("data") if url.to_ascii_lowercase().starts_with("data:image/") => Some(url),
        Some("mailto" | "data") => None,
        _ => safe_link_url(url),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_link_url_schemes() {
        assert_eq!(safe_link_url(" https://github.com/asha "), Some("https://github.com/asha"));
        assert_eq!(safe_link_url("mailto:asha@example.com"), Some("mailto:asha@example.com"));
        assert_eq!(safe_link_url("github.com/asha"), Some("github.com/asha"));
        assert_eq!(safe_link_url("/p/abc?x=1:2"), Some("/p/abc?x=1:2"));
        assert_eq!(safe_link_url("javascript:alert(1)"), None);
        assert_eq!(safe_link_url("JaVaScRiPt:alert(1)"), None);
        assert_eq!(safe_link_url("java\tscript:alert(1)"), None);
        assert_eq!(safe_link_url(" \u{1}javascript:alert(1)"), None);
        assert_eq!(safe_link_url("vbscript:x"), None);
        assert_eq!(safe_link_url("data:text/html,<script>"), None);
        assert_eq!(safe_link_url("   "), None);
    }

    #[test]
    fn test_safe_image_url_allows_inline_images() {
        assert!(safe_image_url("data:image/png;base64,AAAA").is_some());
        assert!(safe_image_url("https://cdn.example.com/me.jpg").is_some());
        assert_eq!(safe_image_url("data:text/html;base64,AAAA"), None);
        assert_eq!(safe_image_url("javascript:alert(1)"), None);
        assert_eq!(safe_image_url("mailto:a@b.c"), None);
    }

    #[test]
    fn test_escape_latex_specials() {
        assert_eq!(escape_latex("A&B"), "A\\&B");
        assert_eq!(escape_latex("50% of $10 #1 a_b"), "50\\% of \\$10 \\#1 a\\_b");
        assert_eq!(escape_latex("{x}"), "\\{x\\}");
        assert_eq!(
            escape_latex("~^\\"),
            "\\textasciitilde{}\\textasciicircum{}\\textbackslash{}"
        );
    }

    #[test]
    fn test_escape_latex_safe_strings_unchanged() {
        let safe = "Asha Rao, B.Tech (2019-2023): C++ & more".replace('&', "and");
        assert_eq!(escape_latex(&safe), safe);
        assert_eq!(escape_latex(&escape_latex("plain text")), "plain text");
    }

    #[test]
    fn test_escape_latex_url_keeps_slashes() {
        assert_eq!(
            escape_latex_url("https://x.dev/a_b?q=1%20#top"),
            "https://x.dev/a_b?q=1\\%20\\#top"
        );
    }

    #[test]
    fn test_escape_html_covers_all_five() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }
}
