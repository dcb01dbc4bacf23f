use std::sync::OnceLock;

use regex::Regex;

fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<a(\s[^>]*)?>(.*?)</a\s*>").expect("anchor pattern is valid")
    })
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\shref\s*=").expect("href pattern is valid"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"))
}

/// Visible text of every `<a href=...>` element, in document order.
pub fn link_texts(html: &str) -> Vec<String> {
    anchor_pattern()
        .captures_iter(html)
        .filter(|captures| {
            captures
                .get(1)
                .is_some_and(|attrs| href_pattern().is_match(attrs.as_str()))
        })
        .filter_map(|captures| captures.get(2))
        .map(|inner| text_content(inner.as_str()))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Text content of the first element carrying `id="<id>"`.
pub fn element_text_by_id(html: &str, id: &str) -> Option<String> {
    let opening = Regex::new(&format!(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\sid\s*=\s*["']?{}["'\s>/]"#,
        regex::escape(id)
    ))
    .ok()?;
    let found = opening.captures(html)?;
    let tag = found.get(1)?.as_str().to_ascii_lowercase();
    let start = found.get(0)?.start();
    let open_end = start + html[start..].find('>')? + 1;

    let rest = &html[open_end..];
    let close = rest.to_ascii_lowercase().find(&format!("</{tag}"))?;
    Some(text_content(&rest[..close]))
}

fn text_content(fragment: &str) -> String {
    decode_entities(&tag_pattern().replace_all(fragment, ""))
        .trim()
        .to_string()
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
