//! Server-rendered UI components
//!
//! Every component is a pure function from options to an HTML string using
//! the Tailwind classes of the Shastho design system. Plain-text arguments are
//! escaped; arguments documented as markup (card bodies, icons, page bodies)
//! are inserted as given.
//!
//! ```rust
//! use shastho::components::button::{self, ButtonOptions};
//!
//! let html = button::primary("Save <draft>", &ButtonOptions::default());
//! assert!(html.contains("Save &lt;draft&gt;"));
//! ```

pub mod button;
pub mod card;
pub mod form;
pub mod layout;
pub mod navigation;
pub mod table;

/// Escapes text for use in element content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Joins class fragments, skipping empty ones
pub(crate) fn classes<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_classes_skip_blanks() {
        assert_eq!(classes(["a b", "", "  ", "c"]), "a b c");
    }
}
