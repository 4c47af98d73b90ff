//! Body markup cleanup.
//!
//! The post body is parsed with `html5ever` into an owned tree. Each pass consumes
//! the tree and builds the next one, so nodes can be unwrapped or replaced
//! without touching a tree that is being walked.
//!
//! Pass order:
//! 1. [`Fragment::unwrap_wrappers`] - `table/tbody/tr/td/div` become their text
//! 2. [`Fragment::strip_presentation_attrs`] - drop styling attributes
//! 3. [`Fragment::inline_images`] - `<img>` becomes `![alt](src)`
//! 4. [`Fragment::text`] - flatten to plain text
//!
//! Tokenizing follows the HTML standard: a `<` that does not open a tag
//! stays text, and every character reference is decoded.

use html5ever::{ParseOpts, parse_document, tendril::TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Layout elements whose markup is obsolete, only their text is kept.
pub const WRAPPER_TAGS: [&str; 5] = ["table", "tbody", "tr", "td", "div"];

/// Any of these on an element clears all of its attributes.
pub const PRESENTATION_ATTRS: [&str; 7] = [
    "style",
    "class",
    "border",
    "cellpadding",
    "cellspacing",
    "width",
    "align",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name
    pub tag: String,
    /// Attributes in source order, boolean attributes have an empty value
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    fn has_presentation_attrs(&self) -> bool {
        self.attrs
            .iter()
            .any(|(key, _)| PRESENTATION_ATTRS.contains(&key.as_str()))
    }
}

/// A parsed body: the top-level nodes of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Parse HTML-flavored text, never failing.
    ///
    /// Malformed markup is repaired the way browsers repair it. The implied
    /// `html`, `head` and `body` elements are not part of the fragment.
    pub fn parse(source: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);

        let mut nodes = Vec::new();
        collect_document(&dom.document, &mut nodes);
        Self { nodes }
    }

    /// Replace every wrapper element with its trimmed text plus a newline.
    ///
    /// Runs post-order so nested wrappers are each unwrapped. Wrappers
    /// without text disappear.
    pub fn unwrap_wrappers(self) -> Self {
        Self {
            nodes: unwrap_nodes(self.nodes),
        }
    }

    /// Clear all attributes of elements that carry presentation attributes.
    pub fn strip_presentation_attrs(mut self) -> Self {
        strip_attrs(&mut self.nodes);
        self
    }

    /// Replace every `<img>` with a Markdown image reference.
    pub fn inline_images(self) -> Self {
        Self {
            nodes: inline_image_nodes(self.nodes),
        }
    }

    /// Flattened text content of the whole fragment.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }
}

/// Run every cleanup pass and return the trimmed body text.
pub fn clean_body(source: &str) -> String {
    Fragment::parse(source)
        .unwrap_wrappers()
        .strip_presentation_attrs()
        .inline_images()
        .text()
        .trim()
        .to_string()
}

/// Lift the content of the document skeleton into `out`.
fn collect_document(handle: &Handle, out: &mut Vec<Node>) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Element { name, .. } if matches!(&*name.local, "html" | "head" | "body") => {
                collect_document(child, out)
            }
            _ => out.extend(convert(child)),
        }
    }
}

/// Convert a DOM node into an owned node. Comments and doctypes are dropped.
fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();

            let children = handle.children.borrow().iter().filter_map(convert).collect();

            Some(Node::Element(Element {
                tag: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        _ => None,
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
        }
    }
}

fn unwrap_nodes(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(mut element) => {
                element.children = unwrap_nodes(element.children);
                if !WRAPPER_TAGS.contains(&element.tag.as_str()) {
                    return Some(Node::Element(element));
                }
                let text = element.text();
                let text = text.trim();
                (!text.is_empty()).then(|| Node::Text(format!("{text}\n")))
            }
            text => Some(text),
        })
        .collect()
}

fn strip_attrs(nodes: &mut [Node]) {
    for node in nodes {
        if let Node::Element(element) = node {
            if element.has_presentation_attrs() {
                element.attrs.clear();
            }
            strip_attrs(&mut element.children);
        }
    }
}

fn inline_image_nodes(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(element) if element.tag == "img" => {
                let alt = element.attr("alt").unwrap_or_default();
                let src = element.attr("src").unwrap_or_default();
                Node::Text(format!("![{alt}]({src})"))
            }
            Node::Element(mut element) => {
                element.children = inline_image_nodes(element.children);
                Node::Element(element)
            }
            text => text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(fragment: &'a Fragment, tag: &str) -> Option<&'a Element> {
        fn find<'a>(nodes: &'a [Node], tag: &str) -> Option<&'a Element> {
            nodes.iter().find_map(|node| match node {
                Node::Element(e) if e.tag == tag => Some(e),
                Node::Element(e) => find(&e.children, tag),
                Node::Text(_) => None,
            })
        }
        find(&fragment.nodes, tag)
    }

    #[test]
    fn test_parse_keeps_text_and_drops_comments() {
        let fragment = Fragment::parse("before <!-- note --> <b>bold</b> after");
        assert_eq!(fragment.text(), "before  bold after");
    }

    #[test]
    fn test_parse_lowercases_tags() {
        let fragment = Fragment::parse("<DIV>x</DIV>");
        assert!(element(&fragment, "div").is_some());
    }

    #[test]
    fn test_parse_unclosed_tags_do_not_fail() {
        let fragment = Fragment::parse("<p>open <b>bold <i>both");
        assert_eq!(fragment.text().trim(), "open bold both");
    }

    #[test]
    fn test_table_unwrapped() {
        let body = clean_body("<table><tr><td>Hello</td></tr></table>");
        assert_eq!(body, "Hello");
    }

    #[test]
    fn test_each_cell_on_its_own_line() {
        let body = clean_body("<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>");
        assert_eq!(body, "a\nb");
    }

    #[test]
    fn test_empty_cells_leave_no_lines() {
        let body = clean_body("<table><tr><td></td><td>  </td><td>x</td></tr></table>");
        assert_eq!(body, "x");
    }

    #[test]
    fn test_empty_wrapper_removed() {
        let fragment = Fragment::parse("a<div>  </div>b").unwrap_wrappers();
        assert_eq!(fragment.nodes.len(), 2);
        assert_eq!(fragment.text(), "ab");
    }

    #[test]
    fn test_no_wrapper_survives_unwrap() {
        let fragment =
            Fragment::parse("<div><div><table><tr><td>deep</td></tr></table></div></div>")
                .unwrap_wrappers();
        for tag in WRAPPER_TAGS {
            assert!(element(&fragment, tag).is_none(), "{tag} survived");
        }
        assert_eq!(fragment.text(), "deep\n");
    }

    #[test]
    fn test_wrapper_text_is_trimmed_then_newline() {
        let fragment = Fragment::parse("<div>\n  para one  \n</div>next").unwrap_wrappers();
        assert_eq!(fragment.text(), "para one\nnext");
    }

    #[test]
    fn test_other_elements_kept_until_flatten() {
        let fragment = Fragment::parse("<p>Hi <a href=\"/x\">link</a></p>").unwrap_wrappers();
        let link = element(&fragment, "a").unwrap();
        assert_eq!(link.attr("href"), Some("/x"));
        assert_eq!(fragment.text(), "Hi link");
    }

    #[test]
    fn test_presentation_attrs_clear_all_attrs() {
        let fragment = Fragment::parse("<span style=\"color:red\" id=\"keep\">x</span>")
            .strip_presentation_attrs();
        assert!(element(&fragment, "span").unwrap().attrs.is_empty());
    }

    #[test]
    fn test_plain_attrs_untouched() {
        let fragment =
            Fragment::parse("<a href=\"/post\" title=\"t\">x</a>").strip_presentation_attrs();
        let link = element(&fragment, "a").unwrap();
        assert_eq!(link.attr("href"), Some("/post"));
        assert_eq!(link.attr("title"), Some("t"));
    }

    #[test]
    fn test_nested_presentation_attrs() {
        let fragment = Fragment::parse("<p><span width=\"3\" lang=\"en\">x</span></p>")
            .strip_presentation_attrs();
        assert!(element(&fragment, "span").unwrap().attrs.is_empty());
    }

    #[test]
    fn test_image_inlined() {
        assert_eq!(clean_body("<img src=\"x.png\" alt=\"cat\">"), "![cat](x.png)");
    }

    #[test]
    fn test_image_without_alt() {
        assert_eq!(clean_body("<img src=\"x.png\">"), "![](x.png)");
    }

    #[test]
    fn test_image_inside_inline_element() {
        assert_eq!(
            clean_body("<p>see <a href=\"/big.png\"><img src=\"small.png\" alt=\"a\"></a></p>"),
            "see ![a](small.png)"
        );
    }

    #[test]
    fn test_styled_image_loses_its_source() {
        // attribute stripping runs before images are inlined
        assert_eq!(clean_body("<img class=\"wp-image-1\" src=\"x.png\" alt=\"cat\">"), "![]()");
    }

    #[test]
    fn test_markdown_text_passes_through() {
        let body = clean_body("# Heading\n\nSome *markdown* text.\n\n- item\n");
        assert_eq!(body, "# Heading\n\nSome *markdown* text.\n\n- item");
    }

    #[test]
    fn test_less_than_in_prose_is_text() {
        let body = clean_body("Prices: x < 3 and y <= 5.\n\nNext paragraph stays.\n");
        assert_eq!(body, "Prices: x < 3 and y <= 5.\n\nNext paragraph stays.");
        assert_eq!(clean_body("if a < b and c > d"), "if a < b and c > d");
    }

    #[test]
    fn test_named_references_decoded() {
        assert_eq!(
            clean_body("Wait&hellip; it&rsquo;s &mdash; done &copy; &#169; &#xA9;"),
            "Wait\u{2026} it\u{2019}s \u{2014} done \u{A9} \u{A9} \u{A9}"
        );
    }

    #[test]
    fn test_references_in_attributes_decoded() {
        assert_eq!(
            clean_body("<img src=\"a.png?w=1&amp;h=2\" alt=\"Tom &amp; Jerry\">"),
            "![Tom & Jerry](a.png?w=1&h=2)"
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(clean_body(""), "");
        assert_eq!(clean_body("  \n\n"), "");
    }
}
