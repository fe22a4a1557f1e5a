//! Cards

use super::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Default,
    Borderless,
    Interactive,
}

impl Variant {
    /// Unknown variants fall back to `Default`
    pub fn parse(variant: &str) -> Self {
        match variant {
            "borderless" => Variant::Borderless,
            "interactive" => Variant::Interactive,
            _ => Variant::Default,
        }
    }

    fn classes(self) -> &'static str {
        match self {
            Variant::Default => "bg-white border border-gray-200 rounded-xl shadow-sm",
            Variant::Borderless => "bg-white rounded-xl shadow-sm",
            Variant::Interactive => "bg-white border border-gray-200 rounded-xl shadow-sm hover:shadow-md transition-shadow cursor-pointer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

const TREND_UP_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" class="h-4 w-4" fill="none" viewBox="0 0 24 24" stroke="currentColor"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M5 15l7-7 7 7" /></svg>"#;
const TREND_DOWN_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" class="h-4 w-4" fill="none" viewBox="0 0 24 24" stroke="currentColor"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M19 9l-7 7-7-7" /></svg>"#;

/// Card around `content` markup; `title` is text, `footer` is markup
pub fn basic(content: &str, title: Option<&str>, footer: Option<&str>, variant: Variant) -> String {
    let mut html = format!(r#"<div class="{}">"#, variant.classes());
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        html.push_str(&format!(
            r#"<div class="px-6 py-4 border-b border-gray-100"><h3 class="text-lg font-semibold text-gray-900">{}</h3></div>"#,
            escape(title)
        ));
    }
    html.push_str(&format!(r#"<div class="p-6">{content}</div>"#));
    if let Some(footer) = footer.filter(|f| !f.is_empty()) {
        html.push_str(&format!(
            r#"<div class="px-6 py-4 bg-gray-50 rounded-b-xl border-t border-gray-100">{footer}</div>"#
        ));
    }
    html.push_str("</div>");
    html
}

pub fn action_card(
    title: &str,
    description: &str,
    action_text: &str,
    action_url: &str,
    icon: Option<&str>,
) -> String {
    let icon = icon
        .map(|i| format!(r#"<div class="text-primary mb-4">{i}</div>"#))
        .unwrap_or_default();
    let content = format!(
        concat!(
            "{}",
            r#"<h3 class="text-xl font-semibold text-gray-900 mb-2">{}</h3>"#,
            r#"<p class="text-gray-600 mb-4">{}</p>"#,
            r#"<a href="{}" class="inline-block bg-primary hover:bg-primary-hover text-white px-4 py-2 rounded-lg font-medium transition-colors">{}</a>"#
        ),
        icon,
        escape(title),
        escape(description),
        escape(action_url),
        escape(action_text)
    );
    basic(&content, None, None, Variant::Interactive)
}

pub fn stat_card(value: &str, label: &str, trend: Option<(&str, Trend)>) -> String {
    let trend_html = match trend {
        None => String::new(),
        Some((text, Trend::Up)) => format!(
            r#"<span class="text-success flex items-center ml-2">{TREND_UP_ICON} {}</span>"#,
            escape(text)
        ),
        Some((text, Trend::Down)) => format!(
            r#"<span class="text-error flex items-center ml-2">{TREND_DOWN_ICON} {}</span>"#,
            escape(text)
        ),
        Some((text, Trend::Flat)) => {
            format!(r#"<span class="text-gray-500 ml-2">{}</span>"#, escape(text))
        }
    };
    let content = format!(
        r#"<div><p class="text-gray-500 text-sm mb-1">{}</p><div class="flex items-center"><span class="text-2xl font-bold text-gray-900">{}</span>{trend_html}</div></div>"#,
        escape(label),
        escape(value)
    );
    basic(&content, None, None, Variant::Borderless)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_card_without_title_or_footer() {
        assert_eq!(
            basic("<p>Hi</p>", None, None, Variant::Default),
            r#"<div class="bg-white border border-gray-200 rounded-xl shadow-sm"><div class="p-6"><p>Hi</p></div></div>"#
        );
    }

    #[test]
    fn test_basic_card_title_is_escaped() {
        let html = basic("", Some("Vitals & Notes"), Some("<a>more</a>"), Variant::Default);
        assert!(html.contains(">Vitals &amp; Notes</h3>"));
        assert!(html.contains("border-t border-gray-100\"><a>more</a></div>"));
    }

    #[test]
    fn test_unknown_variant_is_default() {
        assert_eq!(Variant::parse("glass"), Variant::Default);
        assert_eq!(Variant::parse("interactive"), Variant::Interactive);
    }

    #[test]
    fn test_action_card_is_interactive() {
        let html = action_card("Book", "See a doctor", "Start", "/patient/book", None);
        assert!(html.contains("hover:shadow-md transition-shadow cursor-pointer"));
        assert!(html.contains(r#"href="/patient/book""#));
    }

    #[test]
    fn test_stat_card_trends() {
        let up = stat_card("42", "Patients", Some(("+12%", Trend::Up)));
        assert!(up.contains("text-success"));
        assert!(up.contains("M5 15l7-7 7 7"));
        let down = stat_card("3", "No-shows", Some(("-2", Trend::Down)));
        assert!(down.contains("text-error"));
        let flat = stat_card("7", "Visits", Some(("0%", Trend::Flat)));
        assert!(flat.contains(r#"<span class="text-gray-500 ml-2">0%</span>"#));
        assert!(!stat_card("7", "Visits", None).contains("ml-2"));
    }
}
