//! Markdown-to-HTML conversion for posts written in markdown.

use pulldown_cmark::{html, Options, Parser};

const MARKDOWN_EXTENSIONS: [&str; 4] = [".md", ".markdown", ".mkd", ".mkdn"];

/// Reports whether a source extension (with its leading dot) denotes markdown.
pub fn is_markdown(extension: &str) -> bool {
    MARKDOWN_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Converts markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}
