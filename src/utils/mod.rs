//! Small shared helpers.

/// Pluralize a relation name into its collection/table alias, the way
/// relational naming conventions do: `author` -> `authors`, `category` ->
/// `categories`, `box` -> `boxes`. Names already ending in `s` are taken
/// as collection names and returned unchanged, which keeps the mapping
/// idempotent for has-many style associations (`reviews` -> `reviews`).
pub fn pluralize(name: &str) -> String {
    if name.is_empty() || name.ends_with('s') {
        return name.to_string();
    }
    if name.ends_with('x') || name.ends_with('z') || name.ends_with("ch") || name.ends_with("sh") {
        return format!("{}es", name);
    }
    if let Some(stem) = name.strip_suffix('y') {
        let penultimate = stem.chars().last();
        let vowel = matches!(penultimate, Some('a' | 'e' | 'i' | 'o' | 'u'));
        if !vowel && !stem.is_empty() {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", name)
}
