//! Buttons and button-styled links

use super::{classes, escape};

const PRIMARY: &str =
    "bg-primary hover:bg-primary-hover text-white rounded-lg font-medium transition-colors";
const SECONDARY: &str = "bg-white border border-gray-300 text-gray-700 hover:bg-gray-50 rounded-lg font-medium transition-colors";
const LINK: &str = "text-primary hover:text-primary-hover font-medium transition-colors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Size {
    Sm,
    #[default]
    Md,
    Lg,
}

impl Size {
    /// Unknown sizes fall back to `Md`
    pub fn parse(size: &str) -> Self {
        match size {
            "sm" => Size::Sm,
            "lg" => Size::Lg,
            _ => Size::Md,
        }
    }

    fn button_classes(self) -> &'static str {
        match self {
            Size::Sm => "px-3 py-1.5 text-sm",
            Size::Md => "px-4 py-2.5",
            Size::Lg => "px-6 py-3 text-lg",
        }
    }

    fn link_classes(self) -> &'static str {
        match self {
            Size::Sm => "text-sm",
            Size::Md => "",
            Size::Lg => "text-lg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonType {
    #[default]
    Button,
    Submit,
    Reset,
}

impl ButtonType {
    fn as_str(self) -> &'static str {
        match self {
            ButtonType::Button => "button",
            ButtonType::Submit => "submit",
            ButtonType::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ButtonOptions {
    pub button_type: ButtonType,
    pub size: Size,
    pub full_width: bool,
    /// Icon markup placed before the text
    pub icon: Option<String>,
    pub extra_classes: String,
}

impl ButtonOptions {
    pub fn submit() -> Self {
        Self {
            button_type: ButtonType::Submit,
            ..Self::default()
        }
    }
}

fn icon_prefix(icon: Option<&str>) -> String {
    icon.map(|i| format!("{i} ")).unwrap_or_default()
}

fn render(base: &str, text: &str, options: &ButtonOptions) -> String {
    let class = classes([
        base,
        options.size.button_classes(),
        if options.full_width { "w-full" } else { "" },
        options.extra_classes.as_str(),
    ]);
    format!(
        r#"<button type="{}" class="{}">{}{}</button>"#,
        options.button_type.as_str(),
        escape(&class),
        icon_prefix(options.icon.as_deref()),
        escape(text)
    )
}

pub fn primary(text: &str, options: &ButtonOptions) -> String {
    render(PRIMARY, text, options)
}

pub fn secondary(text: &str, options: &ButtonOptions) -> String {
    render(SECONDARY, text, options)
}

/// Anchor styled as a text button
pub fn link(text: &str, href: &str, size: Size, icon: Option<&str>, extra_classes: &str) -> String {
    let class = classes([LINK, size.link_classes(), extra_classes]);
    format!(
        r#"<a href="{}" class="{}">{}{}</a>"#,
        escape(href),
        escape(&class),
        icon_prefix(icon),
        escape(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_primary_defaults() {
        assert_eq!(
            primary("Save", &ButtonOptions::default()),
            r#"<button type="button" class="bg-primary hover:bg-primary-hover text-white rounded-lg font-medium transition-colors px-4 py-2.5">Save</button>"#
        );
    }

    #[test]
    fn test_secondary_full_width_submit_with_icon() {
        let options = ButtonOptions {
            full_width: true,
            icon: Some("<svg></svg>".into()),
            extra_classes: "mt-4".into(),
            ..ButtonOptions::submit()
        };
        let html = secondary("Book", &options);
        assert!(html.starts_with(r#"<button type="submit""#));
        assert!(html.contains("px-4 py-2.5 w-full mt-4"));
        assert!(html.contains("><svg></svg> Book</button>"));
    }

    #[test_case("sm", "px-3 py-1.5 text-sm" ; "small")]
    #[test_case("lg", "px-6 py-3 text-lg" ; "large")]
    #[test_case("huge", "px-4 py-2.5" ; "unknown falls back to medium")]
    fn test_sizes(size: &str, expected: &str) {
        let options = ButtonOptions {
            size: Size::parse(size),
            ..ButtonOptions::default()
        };
        assert!(primary("x", &options).contains(expected));
    }

    #[test]
    fn test_link_medium_has_no_size_class() {
        assert_eq!(
            link("Sign up", "/register?role=patient&x=1", Size::Md, None, ""),
            r#"<a href="/register?role=patient&amp;x=1" class="text-primary hover:text-primary-hover font-medium transition-colors">Sign up</a>"#
        );
    }
}
