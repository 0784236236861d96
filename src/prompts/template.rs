//! Minimal prompt templating: named `{placeholder}` substitution with
//! doubled-brace escapes, so JSON embedded in a template survives rendering.

/// Double every brace so embedded JSON is not mistaken for a placeholder.
pub fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Serialize a value for embedding into a template.
pub fn escape_json(value: &serde_json::Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    escape_braces(&pretty)
}

/// Collapse `{{` / `}}` escapes back to literal braces.
pub fn render_literal(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Substitute `{key}` with `value` (braces in the value escaped first), then
/// resolve all escapes. The value is inserted verbatim, never re-scanned for
/// placeholders.
pub fn render(template: &str, key: &str, value: &str) -> String {
    let placeholder = format!("{{{}}}", key);
    let filled = template.replace(&placeholder, &escape_braces(value));
    render_literal(&filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_placeholder() {
        let out = render("Atomic Blocks:\n{atomic_blocks}", "atomic_blocks", "AB-1");
        assert_eq!(out, "Atomic Blocks:\nAB-1");
    }

    #[test]
    fn braces_in_value_stay_literal() {
        let out = render("Input:\n{data}", "data", r#"{"fr_id": "FR-1"}"#);
        assert_eq!(out, "Input:\n{\"fr_id\": \"FR-1\"}");
    }

    #[test]
    fn placeholder_text_inside_value_is_not_expanded() {
        let out = render("Input:\n{data}", "data", "{data}");
        assert_eq!(out, "Input:\n{data}");
    }

    #[test]
    fn escaped_braces_collapse() {
        assert_eq!(render_literal("{{\"a\": 1}}"), "{\"a\": 1}");
    }

    #[test]
    fn escape_json_round_trips_through_render() {
        let value = json!({"fr_id": "FR-1", "values": ["a", "b"]});
        let escaped = escape_json(&value);
        let rendered = render_literal(&escaped);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, value);
    }
}
