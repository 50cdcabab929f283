//! Text normalization for scraped markup.

use scraper::{ElementRef, Node};

/// Elements that start a new line in rendered text.
const LINE_BREAKING: &[&str] = &[
    "br", "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Collect the visible text of `element`.
///
/// Inline markup is joined without breaks (`<b>KRIS</b>TINE` reads as
/// `KRISTINE`), runs of whitespace collapse to one space, and block-level
/// elements and `<br>` separate lines. Lines are trimmed and blank lines
/// dropped.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.extend(text.chars().map(|c| if c == '\n' { ' ' } else { c })),
            Node::Element(el) if LINE_BREAKING.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }

    normalize_whitespace(&raw)
}

/// Collapse whitespace within each line and drop blank lines.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
