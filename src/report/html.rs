//! Static HTML rendering for addition and removal reports.
//!
//! Each report is a heading, a count line, then one block per title with
//! its poster (an empty image source when no poster was found).

use super::ReportItem;

pub fn render_additions(items: &[ReportItem]) -> String {
    let mut output = String::from("<h2>There are new movies available. Below are the new movies available.</h2>\n");
    output.push_str(&format!("There are {} new movies!!!\n", items.len()));
    push_items(&mut output, items);
    output
}

pub fn render_removals(items: &[ReportItem]) -> String {
    let mut output = String::from("<h2>Movies have been removed. Below are the movies removed.</h2>\n");
    output.push_str(&format!("There were {} movies removed!!!\n", items.len()));
    push_items(&mut output, items);
    output
}

fn push_items(output: &mut String, items: &[ReportItem]) {
    for item in items {
        let name = escape(&item.name);
        let src = escape(item.image.as_deref().unwrap_or(""));
        output.push_str(&format!(
            "<p>{name}</p><p><img src=\"{src}\" alt=\"{name}\" style=\"width:304px;height:400px;\"></p>\n"
        ));
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
