//! HTML text helpers.

/// Escapes the characters that are significant in HTML text and attributes.
///
/// # Examples
///
/// ```
/// use atocha_rs_core::utils::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
/// ```
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Uppercases the first character of a string, leaving the rest as is.
///
/// ```
/// use atocha_rs_core::utils::capfirst;
///
/// assert_eq!(capfirst("email"), "Email");
/// assert_eq!(capfirst(""), "");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
