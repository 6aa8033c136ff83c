//! HTML to Markdown conversion for release-note pages.
//!
//! Inline content (links, emphasis, code spans) is handled by
//! [`inline_markdown`]. Block structure is handled one level up by
//! [`render_blocks`], which walks a content root according to a
//! [`SiteProfile`] and joins the emitted fragments.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

use crate::site::{BlockLayout, SiteProfile};

const LEGACY_BLOCK_SELECTOR: &str = "h1, h2, h3, p, ul";
const WIKI_HEADING_NOISE: &[&str] = &["Contents", "Navigation menu"];

/// Render a node and its descendants as inline Markdown.
///
/// Text nodes are returned verbatim. For elements, each child is converted
/// and the results concatenated without separator.
pub fn inline_markdown(node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => String::from(&**text),
        Node::Element(_) => {
            let mut out = String::new();
            for child in node.children() {
                push_inline(child, &mut out);
            }
            out
        }
        _ => String::new(),
    }
}

fn push_inline(node: NodeRef<'_, Node>, out: &mut String) {
    let element = match node.value() {
        Node::Text(text) => {
            out.push_str(text);
            return;
        }
        Node::Element(_) => match ElementRef::wrap(node) {
            Some(element) => element,
            None => return,
        },
        _ => return,
    };

    match element.value().name() {
        "a" => {
            let href = element.value().attr("href").unwrap_or_default();
            let text = flattened_text(element);
            if !href.is_empty() && !text.is_empty() {
                out.push_str(&format!("[{text}]({href})"));
            } else {
                out.push_str(&text);
            }
        }
        "strong" | "b" => {
            out.push_str("**");
            out.push_str(&inline_markdown(node));
            out.push_str("**");
        }
        "em" | "i" => {
            out.push('*');
            out.push_str(&inline_markdown(node));
            out.push('*');
        }
        "code" => {
            out.push('`');
            out.push_str(&flattened_text(element));
            out.push('`');
        }
        _ => out.push_str(&inline_markdown(node)),
    }
}

/// Visible text of an element: every descendant text node stripped, empty
/// pieces dropped, the rest concatenated.
pub fn flattened_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Walk the block-level structure under `root` and produce the final Markdown.
pub fn render_blocks(root: ElementRef<'_>, profile: &SiteProfile) -> String {
    let mut writer = BlockWriter::new(profile);
    match profile.layout {
        BlockLayout::DirectChildren => {
            for child in root.children().filter_map(ElementRef::wrap) {
                writer.block(child, true);
            }
        }
        BlockLayout::Descendants => {
            if let Ok(selector) = Selector::parse(LEGACY_BLOCK_SELECTOR) {
                for element in root.select(&selector) {
                    writer.block(element, false);
                }
            }
        }
    }
    writer.finish()
}

struct BlockWriter<'p> {
    profile: &'p SiteProfile,
    lines: Vec<String>,
    last_was_list: bool,
}

impl<'p> BlockWriter<'p> {
    fn new(profile: &'p SiteProfile) -> Self {
        Self {
            profile,
            lines: Vec::new(),
            last_was_list: false,
        }
    }

    fn block(&mut self, element: ElementRef<'_>, tight_h1: bool) {
        match element.value().name() {
            "h1" => self.heading(element, 1, tight_h1),
            "h2" => self.heading(element, 2, false),
            "h3" => self.heading(element, 3, false),
            "ul" => self.list(element),
            "p" => self.paragraph(element),
            "pre" => self.preformatted(element),
            _ => {}
        }
    }

    fn heading(&mut self, element: ElementRef<'_>, level: usize, tight: bool) {
        let text = flattened_text(element);
        if text.is_empty() || (self.profile.filter_wiki_headings && is_wiki_artifact(&text)) {
            return;
        }
        let lead = if tight { "" } else { "\n" };
        self.lines
            .push(format!("{lead}{} {text}\n", "#".repeat(level)));
        self.last_was_list = false;
    }

    fn list(&mut self, element: ElementRef<'_>) {
        let items = element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li");
        for item in items {
            let markdown = inline_markdown(*item);
            let markdown = markdown.trim();
            if markdown.is_empty() || (self.profile.skip_url_items && markdown.starts_with("http")) {
                continue;
            }
            self.lines.push(format!("* {markdown}"));
        }
        self.lines.push(String::new());
        self.last_was_list = true;
    }

    fn paragraph(&mut self, element: ElementRef<'_>) {
        let markdown = inline_markdown(*element);
        let markdown = markdown.trim();
        if markdown.chars().count() <= self.profile.min_paragraph_chars {
            return;
        }
        if self.profile.separate_lists && self.last_was_list {
            self.lines.push(String::new());
        }
        self.lines.push(markdown.to_string());
        self.lines.push(String::new());
        self.last_was_list = false;
    }

    fn preformatted(&mut self, element: ElementRef<'_>) {
        let code = flattened_text(element);
        if code.is_empty() {
            return;
        }
        self.lines.push(format!("```\n{code}\n```"));
        self.lines.push(String::new());
        self.last_was_list = false;
    }

    fn finish(self) -> String {
        collapse_blank_lines(&self.lines.join("\n"))
    }
}

fn is_wiki_artifact(text: &str) -> bool {
    text.contains("[edit]") || WIKI_HEADING_NOISE.contains(&text)
}

/// Collapse every run of three or more newlines to exactly two, then trim.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut collapsed = text.to_string();
    while collapsed.contains("\n\n\n") {
        collapsed = collapsed.replace("\n\n\n", "\n\n");
    }
    collapsed.trim().to_string()
}
