use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::Context;


// Braces and line breaks are not allowed inside a token, so `{{{name}}}`
// matches the inner `{{name}}`.
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([^{}\r\n]*)\}\}").expect("placeholder pattern is valid")
});


/// Replaces every `{{ key }}` token whose trimmed key is present in the context.
///
/// Unknown tokens are left exactly as written. The body is scanned once, so a
/// substituted value is never expanded again. Values are inserted without any
/// HTML escaping; callers sanitize user-controlled data themselves.
pub fn substitute(body: &str, context: &Context) -> String {
    PLACEHOLDER_REGEX
        .replace_all(body, |caps: &Captures| {
            let key = caps[1].trim();
            match context.get(key) {
                Some(value) if !key.is_empty() => value.to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Lists the distinct placeholder keys used in a body, in order of first use.
pub fn placeholders(body: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(body) {
        let key = caps[1].trim();
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}
