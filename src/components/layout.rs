//! Full-page shell

use super::escape;

/// Tailwind theme extension carrying the Shastho colour tokens
const TAILWIND_CONFIG: &str = r##"tailwind.config = {
  theme: {
    extend: {
      colors: {
        primary: { DEFAULT: "#0F766E", hover: "#115E59" },
        success: "#16A34A",
        warning: "#D97706",
        error: "#DC2626"
      }
    }
  }
};"##;

#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Markup of the navigation bar
    pub nav: Option<String>,
    /// Markup of the side menu
    pub sidebar: Option<String>,
    /// Flash message shown above the body
    pub notice: Option<String>,
}

/// Complete HTML document; `body`, `nav` and `sidebar` are markup
pub fn page(title: &str, app_name: &str, body: &str, options: &PageOptions) -> String {
    let nav = options.nav.as_deref().unwrap_or_default();
    let notice = options
        .notice
        .as_deref()
        .map(|n| {
            format!(
                r#"<div class="mb-6 rounded-lg border border-primary/30 bg-primary/10 px-4 py-3 text-primary">{}</div>"#,
                escape(n)
            )
        })
        .unwrap_or_default();
    let main = format!(r#"<main class="flex-1 p-8">{notice}{body}</main>"#);
    let content = match options.sidebar.as_deref() {
        Some(sidebar) => format!(r#"<div class="flex">{sidebar}{main}</div>"#),
        None => format!(r#"<div class="max-w-7xl mx-auto">{main}</div>"#),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{} | {}</title>
<script src="https://cdn.tailwindcss.com"></script>
<script>{TAILWIND_CONFIG}</script>
</head>
<body class="bg-gray-50 text-gray-900 min-h-screen">
{nav}
{content}
</body>
</html>
"#,
        escape(title),
        escape(app_name)
    )
}
