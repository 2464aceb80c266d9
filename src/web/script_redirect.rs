//! Client-side redirect page.

use askama::Template;
use askama_web::WebTemplate;

/// Page served with `200 OK` for script redirect rules.
///
/// Renders `templates/script_redirect.html`, which sends the browser to the
/// target through both a `<meta http-equiv="refresh">` tag and
/// `window.location.href`, and shows the target as a link.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "script_redirect.html")]
pub struct ScriptRedirectPage {
    /// HTML-escaped by the template.
    pub target: String,
    /// JSON string literal, safe to embed in a `<script>` element.
    pub target_js: String,
}

impl ScriptRedirectPage {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            target_js: js_string_literal(target),
        }
    }
}

/// Encodes `value` as a JavaScript string literal that cannot close the
/// surrounding `<script>` element.
fn js_string_literal(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_references_target() {
        let html = ScriptRedirectPage::new("https://c.com/landing").render().unwrap();

        assert!(html.contains("0;url=https:"));
        assert!(html.contains(r#"window.location.href = "https://c.com/landing";"#));
    }

    #[test]
    fn test_target_is_escaped() {
        let html = ScriptRedirectPage::new("https://c.com/\"</script><b>")
            .render()
            .unwrap();

        assert!(!html.contains("<b>"));
        assert!(html.contains(r#""https://c.com/\"\u003c/script\u003e\u003cb\u003e""#));
    }

    #[test]
    fn test_js_string_literal() {
        assert_eq!(js_string_literal("a&b"), r#""a\u0026b""#);
        assert_eq!(js_string_literal("line\nbreak"), r#""line\nbreak""#);
    }
}
