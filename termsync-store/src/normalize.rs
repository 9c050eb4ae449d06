/// Canonicalizes a taxonomy name the way term stores persist it.
///
/// Leading/trailing whitespace is dropped, any run of whitespace (tabs
/// included) becomes a single space, and the ASCII `&` and `"` characters
/// are replaced by their full-width forms.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    for word in name.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.extend(word.chars().map(|c| match c {
            '&' => '\u{FF06}',
            '"' => '\u{FF02}',
            other => other,
        }));
    }
    normalized
}
