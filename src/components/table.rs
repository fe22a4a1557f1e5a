//! Data tables

use super::escape;

/// One table cell: text is escaped, markup is inserted as given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Html(String),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(text) => escape(text),
            Cell::Html(html) => html.clone(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

/// Striped table; columns whose header is blank are dropped from every row
pub fn table(headers: &[&str], rows: &[Vec<Cell>], empty_message: &str) -> String {
    let visible: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    let mut html = String::from(
        r#"<div class="overflow-x-auto bg-white border border-gray-200 rounded-xl shadow-sm"><table class="min-w-full divide-y divide-gray-200"><thead class="bg-gray-50"><tr>"#,
    );
    for &i in &visible {
        html.push_str(&format!(
            r#"<th scope="col" class="px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">{}</th>"#,
            escape(headers[i])
        ));
    }
    html.push_str(r#"</tr></thead><tbody class="divide-y divide-gray-100">"#);

    if rows.is_empty() {
        html.push_str(&format!(
            r#"<tr><td colspan="{}" class="px-6 py-8 text-center text-gray-500">{}</td></tr>"#,
            visible.len().max(1),
            escape(empty_message)
        ));
    }
    for (n, row) in rows.iter().enumerate() {
        let stripe = if n % 2 == 1 { "bg-gray-50" } else { "bg-white" };
        html.push_str(&format!(r#"<tr class="{stripe}">"#));
        for &i in &visible {
            let cell = row.get(i).map(Cell::render).unwrap_or_default();
            html.push_str(&format!(
                r#"<td class="px-6 py-4 whitespace-nowrap text-sm text-gray-700">{cell}</td>"#
            ));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_shows_message() {
        let html = table(&["Name", "Date"], &[], "No appointments yet");
        assert!(html.contains(r#"<td colspan="2" class="px-6 py-8 text-center text-gray-500">No appointments yet</td>"#));
    }

    #[test]
    fn test_blank_header_columns_are_dropped() {
        let rows = vec![vec![
            Cell::from("Nadia"),
            Cell::from("hidden"),
            Cell::Html(r#"<a href="/p/1">View</a>"#.into()),
        ]];
        let html = table(&["Name", "", "Actions"], &rows, "none");
        assert!(!html.contains("hidden"));
        assert_eq!(html.matches("<th ").count(), 2);
        assert!(html.contains(r#"<a href="/p/1">View</a>"#));
    }

    #[test]
    fn test_rows_are_striped_and_escaped() {
        let rows = vec![vec![Cell::from("A & B")], vec![Cell::from("C")]];
        let html = table(&["Name"], &rows, "none");
        assert!(html.contains(r#"<tr class="bg-white"><td class="px-6 py-4 whitespace-nowrap text-sm text-gray-700">A &amp; B</td></tr>"#));
        assert!(html.contains(r#"<tr class="bg-gray-50">"#));
    }
}
