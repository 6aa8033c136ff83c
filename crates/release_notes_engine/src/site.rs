use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::convert::render_blocks;
use crate::NotesError;

/// How the block walk visits the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    /// Only direct element children of the root.
    DirectChildren,
    /// Every heading, paragraph and list below the root, in document order.
    Descendants,
}

/// Per-site parameters for locating, pruning and rendering a content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub name: &'static str,
    /// Tried in order; the first match is the content root.
    pub root_selectors: &'static [&'static str],
    /// Removed from the content root before rendering.
    pub prune_selectors: &'static [&'static str],
    /// Paragraphs with this many characters or fewer are dropped.
    pub min_paragraph_chars: usize,
    pub layout: BlockLayout,
    pub skip_url_items: bool,
    pub filter_wiki_headings: bool,
    pub separate_lists: bool,
}

impl SiteProfile {
    pub const WIKI: SiteProfile = SiteProfile {
        name: "wiki",
        root_selectors: &["div.mw-parser-output", "div#mw-content-text"],
        prune_selectors: &[
            "nav",
            "footer",
            "div.toc",
            "table.toc",
            "div.navbox",
            "table.navbox",
            "div.metadata",
            "table.metadata",
            "div.ambox",
            "table.ambox",
            "div.infobox",
            "table.infobox",
        ],
        min_paragraph_chars: 10,
        layout: BlockLayout::DirectChildren,
        skip_url_items: true,
        filter_wiki_headings: true,
        separate_lists: true,
    };

    pub const DOCS: SiteProfile = SiteProfile {
        name: "docs",
        root_selectors: &["article", "div.md-content"],
        prune_selectors: &["nav", "footer"],
        min_paragraph_chars: 5,
        layout: BlockLayout::DirectChildren,
        skip_url_items: false,
        filter_wiki_headings: false,
        separate_lists: false,
    };

    pub const LEGACY_DOCS: SiteProfile = SiteProfile {
        name: "legacy-docs",
        root_selectors: &["div#content", "main"],
        prune_selectors: &["nav", "footer"],
        min_paragraph_chars: 5,
        layout: BlockLayout::Descendants,
        skip_url_items: false,
        filter_wiki_headings: false,
        separate_lists: false,
    };
}

/// Locate the content root of `html`, prune it and render it as Markdown.
pub fn extract_notes(html: &str, profile: &SiteProfile) -> Result<String, NotesError> {
    let mut doc = Html::parse_document(html);
    let root_id = find_content_root(&doc, profile).ok_or(NotesError::ContentRootMissing)?;
    prune(&mut doc, root_id, profile);

    let root = doc
        .tree
        .get(root_id)
        .and_then(ElementRef::wrap)
        .ok_or(NotesError::ContentRootMissing)?;
    Ok(render_blocks(root, profile))
}

fn find_content_root(doc: &Html, profile: &SiteProfile) -> Option<NodeId> {
    profile
        .root_selectors
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| doc.select(&selector).next().map(|element| element.id()))
}

fn prune(doc: &mut Html, root_id: NodeId, profile: &SiteProfile) {
    let doomed: Vec<NodeId> = match doc.tree.get(root_id).and_then(ElementRef::wrap) {
        Some(root) => profile
            .prune_selectors
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .flat_map(|selector| {
                root.select(&selector)
                    .map(|element| element.id())
                    .collect::<Vec<_>>()
            })
            .filter(|id| *id != root_id)
            .collect(),
        None => return,
    };

    for id in doomed {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}
