//! Top navigation bar and side menu

use super::escape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Signed-in user shown at the right of the navbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavUser {
    pub name: String,
    pub role: String,
}

const ACTIVE: &str = "bg-primary/10 text-primary font-semibold";
const INACTIVE: &str = "text-gray-700 hover:bg-gray-100";

fn labelled(links: &[NavLink]) -> impl Iterator<Item = &NavLink> {
    links.iter().filter(|l| !l.label.trim().is_empty())
}

pub fn navbar(brand: &str, links: &[NavLink], user: Option<&NavUser>) -> String {
    let mut html = format!(
        r#"<nav class="bg-white border-b border-gray-200"><div class="max-w-7xl mx-auto px-4 h-16 flex items-center justify-between"><a href="/" class="text-xl font-bold text-primary">{}</a><div class="flex items-center space-x-6">"#,
        escape(brand)
    );
    for link in labelled(links) {
        html.push_str(&format!(
            r#"<a href="{}" class="text-gray-600 hover:text-primary font-medium transition-colors">{}</a>"#,
            escape(&link.href),
            escape(&link.label)
        ));
    }
    match user {
        Some(user) => html.push_str(&format!(
            r#"<span class="text-sm text-gray-500">{} <span class="text-xs uppercase tracking-wide text-gray-400">{}</span></span><form action="/logout" method="post"><button type="submit" class="text-sm text-gray-600 hover:text-error">Sign out</button></form>"#,
            escape(&user.name),
            escape(&user.role)
        )),
        None => html.push_str(
            r#"<a href="/login" class="bg-primary hover:bg-primary-hover text-white rounded-lg font-medium transition-colors px-3 py-1.5 text-sm">Sign in</a>"#,
        ),
    }
    html.push_str("</div></div></nav>");
    html
}

/// Side menu; the link whose href equals `active` is highlighted
pub fn sidebar(items: &[NavLink], active: &str) -> String {
    let mut html = String::from(
        r#"<aside class="w-64 bg-white border-r border-gray-200 min-h-screen p-4"><ul class="space-y-1">"#,
    );
    for item in labelled(items) {
        let state = if item.href == active { ACTIVE } else { INACTIVE };
        html.push_str(&format!(
            r#"<li><a href="{}" class="block px-3 py-2 rounded-lg {state}">{}</a></li>"#,
            escape(&item.href),
            escape(&item.label)
        ));
    }
    html.push_str("</ul></aside>");
    html
}
